//! Star Drop - an editable ball-drop physics puzzle
//!
//! Core modules:
//! - `level`: Entity/level data model, level-code text format, level lists
//! - `editor`: Pointer-driven authoring tools (place, drag, select, delete)
//! - `sim`: Per-tick gameplay rules and the session context
//! - `adapter`: Physics/renderer boundaries plus headless implementations
//! - `persistence`: Key-value storage (LocalStorage on web, files natively)
//! - `platform`: Logger/storage setup and the browser editor handle
//! - `progression`: Completed levels and the unlock frontier
//! - `tuning`: Data-driven rule constants
//! - `game`: Frame driver tying everything together

pub mod adapter;
pub mod editor;
pub mod game;
pub mod level;
pub mod persistence;
pub mod platform;
pub mod progression;
pub mod sim;
pub mod tuning;

pub use game::Game;
pub use level::{EntityKind, EntityRef, LevelDocument};
pub use progression::ProgressionTracker;
pub use tuning::Tuning;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    use glam::Vec3;

    /// Fixed simulation timestep used by the headless driver (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Largest frame delta accepted by the driver (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Playable area the editor clamps pointer positions to
    pub const ARENA_HALF_WIDTH: f32 = 15.0;
    pub const ARENA_HALF_HEIGHT: f32 = 11.0;

    /// Default ball start (top of the arena)
    pub const DEFAULT_BALL_START: Vec3 = Vec3::new(0.0, 12.0, 0.0);
    /// Default bowl position (resting on the floor)
    pub const DEFAULT_BOWL: Vec3 = Vec3::new(0.0, -11.1, 0.0);

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 0.5;
    pub const GRAVITY: f32 = -15.0;
    pub const BALL_LINEAR_DAMPING: f32 = 0.1;
    pub const BALL_ANGULAR_DAMPING: f32 = 0.3;
    /// Bounce off static colliders
    pub const RESTITUTION: f32 = 0.4;

    /// Top surface of the arena floor
    pub const GROUND_Y: f32 = -12.0;
    pub const GROUND_HALF_EXTENT: f32 = 22.0;

    /// Maximum substeps per physics advance
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Booster length used when a legacy level code omits it
    pub const LEGACY_BOOSTER_LENGTH: f32 = 2.0;
}

/// Squared distance on the XY plane (the arena plane)
#[inline]
pub fn planar_distance_squared(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Distance from `point` to the segment `start..end`
#[inline]
pub fn distance_to_segment(point: Vec3, start: Vec3, end: Vec3) -> f32 {
    let seg = end - start;
    let len_sq = seg.length_squared();
    if len_sq <= f32::EPSILON {
        return point.distance(start);
    }
    let t = ((point - start).dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance(start + seg * t)
}

/// Clamp a pointer world position into the playable area (flattened to z = 0)
#[inline]
pub fn clamp_to_arena(pos: Vec3) -> Vec3 {
    Vec3::new(
        pos.x.clamp(-consts::ARENA_HALF_WIDTH, consts::ARENA_HALF_WIDTH),
        pos.y.clamp(-consts::ARENA_HALF_HEIGHT, consts::ARENA_HALF_HEIGHT),
        0.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_segment_interior_and_ends() {
        let a = Vec3::ZERO;
        let b = Vec3::new(4.0, 0.0, 0.0);
        assert!((distance_to_segment(Vec3::new(2.0, 1.0, 0.0), a, b) - 1.0).abs() < 1e-5);
        assert!((distance_to_segment(Vec3::new(-3.0, 0.0, 0.0), a, b) - 3.0).abs() < 1e-5);
        // Degenerate segment falls back to point distance
        assert!((distance_to_segment(Vec3::new(0.0, 2.0, 0.0), a, a) - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_clamp_to_arena() {
        let p = clamp_to_arena(Vec3::new(40.0, -30.0, 2.0));
        assert_eq!(p, Vec3::new(15.0, -11.0, 0.0));
    }
}
