//! Gameplay simulation module
//!
//! The rule engine and the session context. This module must stay pure:
//! - Ball kinematics come in from the physics adapter, corrections go back out
//! - Fixed evaluation order inside a tick
//! - Timing measured on the session clock only
//! - No rendering or platform dependencies

pub mod impact;
pub mod session;
pub mod state;
pub mod tick;

pub use impact::ImpactGate;
pub use session::{Session, SessionMode};
pub use state::{BallKinematics, GameEvent, GameplayState, HazardCause};
pub use tick::{hazard_reset, tick};
