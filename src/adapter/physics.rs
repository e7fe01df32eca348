//! Physics adapter boundary
//!
//! Rigid-body integration is delegated to whatever implements
//! [`PhysicsAdapter`]. Contacts are polled once per frame instead of being
//! pushed through callbacks.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Opaque body id issued by the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Immovable collider
    Static,
    /// Simulated body (the ball)
    Dynamic,
    /// Overlap-only; never pushes the ball
    Trigger,
}

/// Whether a dynamic body is currently simulated or frozen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KinematicMode {
    Static,
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeSpec {
    Sphere {
        radius: f32,
    },
    /// Box rotated about Z
    Box {
        half_extents: Vec3,
        rotation_z: f32,
    },
    /// Upright cylinder
    Cylinder {
        radius: f32,
        half_height: f32,
    },
    /// Open cup, wider at the top
    Bowl {
        top_radius: f32,
        bottom_radius: f32,
        height: f32,
    },
}

/// A resolved collision between two bodies during the last advance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub body: BodyHandle,
    pub other: BodyHandle,
    /// Approach speed along the contact normal
    pub impact_speed: f32,
}

/// Rigid-body world the game drives
pub trait PhysicsAdapter {
    /// Add a body; a `Dynamic` body starts simulated
    fn create_body(&mut self, shape: ShapeSpec, position: Vec3, kind: BodyKind) -> BodyHandle;
    /// Remove a body; unknown handles are ignored
    fn remove_body(&mut self, handle: BodyHandle);

    /// Body position, `None` for an unknown handle
    fn position(&self, handle: BodyHandle) -> Option<Vec3>;
    /// Body linear velocity
    fn velocity(&self, handle: BodyHandle) -> Option<Vec3>;
    /// Body angular velocity
    fn angular_velocity(&self, handle: BodyHandle) -> Option<Vec3>;

    /// Teleport a body
    fn set_position(&mut self, handle: BodyHandle, position: Vec3);
    /// Overwrite the linear velocity
    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec3);
    /// Overwrite the angular velocity
    fn set_angular_velocity(&mut self, handle: BodyHandle, angular_velocity: Vec3);
    /// Freeze (`Static`) or release (`Dynamic`) a body
    fn set_kinematic_mode(&mut self, handle: BodyHandle, mode: KinematicMode);

    /// Contacts recorded since the previous call
    fn take_contacts(&mut self) -> Vec<Contact>;

    /// Step the world by `dt` seconds
    fn advance(&mut self, dt: f32);
}
