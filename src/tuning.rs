//! Gameplay and editor tuning
//!
//! Every rule radius, delay and threshold in one serializable struct.
//! Persisted separately from progression.

use serde::{Deserialize, Serialize};

use crate::persistence::{Storage, StorageError, load_json, save_json};

/// Rule and editor constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Gameplay rules ===
    /// Star pickup radius
    pub star_radius: f32,
    /// Added to half a booster's length to get its zone radius
    pub booster_margin: f32,
    /// Max vertical offset for a booster to act
    pub booster_vertical_reach: f32,
    /// Velocity added per tick while inside a booster zone
    pub boost_amount: f32,
    /// Portal trigger radius
    pub portal_radius: f32,
    /// Cooldown placed on the destination portal (ms)
    pub portal_cooldown_ms: f64,
    /// Spike trigger radius
    pub spike_radius: f32,
    /// Bowl capture radius
    pub bowl_radius: f32,
    /// Ball must be below bowl.y + this to count as inside
    pub bowl_height_gate: f32,
    /// Delay between reaching the bowl and the win event (ms)
    pub win_delay_ms: f64,
    /// Falling below this height resets the ball
    pub out_of_bounds_y: f32,
    /// Stuck detection: height below which the ball counts as grounded
    pub stuck_height: f32,
    /// Stuck detection: vertical speed below which the ball counts as resting
    pub stuck_speed: f32,
    /// Stuck detection: time resting before a reset (ms)
    pub stuck_delay_ms: f64,

    // === Editor ===
    /// Max press duration for a click (ms)
    pub click_max_ms: f64,
    /// Pointer travel that turns a press into a drag
    pub drag_threshold: f32,
    /// Shortest wall/booster that will be committed
    pub min_segment_length: f32,
    /// Shortest drag preview that is shown
    pub min_preview_length: f32,
    /// Pick radius for select/delete
    pub pick_threshold: f32,

    // === Feedback ===
    /// Minimum contact speed that produces an impact event
    pub impact_min_speed: f32,
    /// Minimum spacing between impact events (ms)
    pub impact_cooldown_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            star_radius: 1.0,
            booster_margin: 0.5,
            booster_vertical_reach: 1.0,
            boost_amount: 0.5,
            portal_radius: 0.8,
            portal_cooldown_ms: 500.0,
            spike_radius: 0.8,
            bowl_radius: 2.0,
            bowl_height_gate: 1.0,
            win_delay_ms: 500.0,
            out_of_bounds_y: -15.0,
            stuck_height: -10.5,
            stuck_speed: 0.5,
            stuck_delay_ms: 3000.0,

            click_max_ms: 300.0,
            drag_threshold: 0.3,
            min_segment_length: 0.5,
            min_preview_length: 0.3,
            pick_threshold: 1.5,

            impact_min_speed: 2.0,
            impact_cooldown_ms: 50.0,
        }
    }
}

impl Tuning {
    /// Storage key
    const STORAGE_KEY: &'static str = "star_drop_tuning";

    /// Parse tuning from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load tuning from storage, falling back to defaults
    pub fn load(storage: &dyn Storage) -> Self {
        match load_json::<Tuning>(storage, Self::STORAGE_KEY) {
            Ok(Some(tuning)) => {
                log::info!("Loaded tuning from storage");
                tuning
            }
            Ok(None) => {
                log::info!("Using default tuning");
                Self::default()
            }
            Err(e) => {
                log::warn!("Stored tuning unreadable ({}), using defaults", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, storage: &mut dyn Storage) -> Result<(), StorageError> {
        save_json(storage, Self::STORAGE_KEY, self)?;
        log::info!("Tuning saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_partial_json_fills_defaults() {
        let t = Tuning::from_json(r#"{"boost_amount": 0.75}"#).unwrap();
        assert_eq!(t.boost_amount, 0.75);
        assert_eq!(t.star_radius, 1.0);
        assert_eq!(t.stuck_delay_ms, 3000.0);
    }

    #[test]
    fn test_load_save_and_corrupt_fallback() {
        let mut storage = MemoryStorage::new();
        assert_eq!(Tuning::load(&storage), Tuning::default());

        let mut t = Tuning::default();
        t.win_delay_ms = 250.0;
        t.save(&mut storage).unwrap();
        assert_eq!(Tuning::load(&storage).win_delay_ms, 250.0);

        storage.set(Tuning::STORAGE_KEY, "garbage").unwrap();
        assert_eq!(Tuning::load(&storage), Tuning::default());
    }
}
