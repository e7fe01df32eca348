//! Contact feedback
//!
//! Filters raw physics contacts down to impacts worth a sound: hard enough
//! and not too close to the previous one.

use crate::tuning::Tuning;

use super::state::GameEvent;

/// Rate limiter for impact events
#[derive(Debug, Clone, Default)]
pub struct ImpactGate {
    last_ms: Option<f64>,
}

impl ImpactGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an impact event if this contact passes the speed and spacing checks
    pub fn accept(&mut self, impact_speed: f32, now_ms: f64, tuning: &Tuning) -> Option<GameEvent> {
        if self
            .last_ms
            .is_some_and(|last| now_ms - last < tuning.impact_cooldown_ms)
        {
            return None;
        }
        let speed = impact_speed.abs();
        if speed < tuning.impact_min_speed {
            return None;
        }
        self.last_ms = Some(now_ms);
        Some(GameEvent::Impact {
            strength: (speed / 15.0).clamp(0.2, 0.8),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_contacts_ignored() {
        let mut gate = ImpactGate::new();
        assert!(gate.accept(1.5, 0.0, &Tuning::default()).is_none());
        // A rejected soft contact does not start the cooldown
        assert!(gate.accept(3.0, 10.0, &Tuning::default()).is_some());
    }

    #[test]
    fn test_cooldown_and_strength_clamp() {
        let tuning = Tuning::default();
        let mut gate = ImpactGate::new();
        assert_eq!(
            gate.accept(30.0, 0.0, &tuning),
            Some(GameEvent::Impact { strength: 0.8 })
        );
        assert!(gate.accept(30.0, 40.0, &tuning).is_none());
        assert_eq!(
            gate.accept(2.0, 60.0, &tuning),
            Some(GameEvent::Impact { strength: 0.2 })
        );
    }
}
