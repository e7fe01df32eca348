//! Gameplay state and event types
//!
//! Everything the rule engine mutates between ticks lives here, apart from
//! the per-entity flags stored on the level document itself
//! (`Star::collected`, `Portal::cooldown_until`).

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Why the ball was sent back to its start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardCause {
    Spike,
    OutOfBounds,
    /// Resting on the floor for too long
    Stuck,
    /// Player pressed reset
    Manual,
}

/// Events produced by a tick, consumed synchronously by the driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    StarCollected { id: u32, position: Vec3 },
    /// Emitted every tick the ball overlaps a booster zone
    Boosted { id: u32 },
    Teleported { from: u32, to: u32 },
    Hazard { cause: HazardCause },
    /// Ball entered the bowl; the win follows after the presentation delay
    GoalReached,
    Won { level: u32 },
    /// Ball contact worth a sound (strength 0.2..=0.8)
    Impact { strength: f32 },
}

/// Ball body state, mirrored from and written back to the physics adapter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallKinematics {
    pub position: Vec3,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    /// False while the ball is frozen at its start
    pub dynamic: bool,
}

impl BallKinematics {
    /// A frozen ball at `position`
    pub fn at_rest(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            dynamic: false,
        }
    }
}

/// Per-session gameplay bookkeeping
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameplayState {
    /// Rules only run while this is set
    pub is_playing: bool,
    /// Session clock (ms), advanced every tick
    pub clock_ms: f64,
    /// Time the ball has spent low and slow (ms)
    pub stuck_ms: f64,
    pub stars_collected: u32,
    /// Clock time at which the pending win fires
    pub pending_win_at: Option<f64>,
}

impl GameplayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything from the previous attempt, keeping the clock
    pub fn reset(&mut self) {
        self.is_playing = false;
        self.stuck_ms = 0.0;
        self.stars_collected = 0;
        self.pending_win_at = None;
    }
}
