//! Renderer adapter boundary

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::level::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisualHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualKind {
    Ball,
    Ground,
    /// A document entity, including the bowl
    Entity(EntityKind),
    /// Unlinked first portal during two-step placement
    PendingPortal,
    /// Translucent wall/booster drag preview
    Preview(EntityKind),
}

/// Construction parameters for a visual
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualParams {
    pub position: Vec3,
    pub orientation: Quat,
    /// Segment length for walls, boosters, ramps and previews; unused otherwise
    pub length: f32,
    pub translucent: bool,
}

impl VisualParams {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
            length: 0.0,
            translucent: false,
        }
    }

    /// Segment centred at `center`, rotated `angle` radians about Z
    pub fn segment(center: Vec3, angle: f32, length: f32) -> Self {
        Self {
            position: center,
            orientation: Quat::from_rotation_z(angle),
            length,
            translucent: false,
        }
    }

    /// Draw see-through (previews, the pending portal)
    pub fn translucent(mut self) -> Self {
        self.translucent = true;
        self
    }
}

/// Scene graph the game draws into
pub trait RendererAdapter {
    /// Create a visible object
    fn create_visual(&mut self, kind: VisualKind, params: VisualParams) -> VisualHandle;
    /// Move and rotate an existing visual
    fn update_transform(&mut self, handle: VisualHandle, position: Vec3, orientation: Quat);
    /// Destroy a visual; unknown handles are ignored
    fn remove_visual(&mut self, handle: VisualHandle);
    /// Toggle the selection highlight
    fn set_highlight(&mut self, handle: VisualHandle, on: bool);
    /// Hide collected stars without destroying them
    fn set_visible(&mut self, handle: VisualHandle, visible: bool);
}
