//! Non-committing editor output
//!
//! The controller never talks to the physics or renderer adapters directly.
//! It records `SceneChange`s that the frame driver applies afterwards.

use glam::Vec3;

use crate::level::{EntityKind, EntityRef};

/// Translucent segment shown while dragging out a wall or booster
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewShape {
    /// `Wall` or `Booster`
    pub kind: EntityKind,
    pub start: Vec3,
    pub end: Vec3,
}

impl PreviewShape {
    pub fn length(&self) -> f32 {
        (self.end - self.start).length()
    }

    pub fn center(&self) -> Vec3 {
        (self.start + self.end) * 0.5
    }

    pub fn angle(&self) -> f32 {
        let d = self.end - self.start;
        d.y.atan2(d.x)
    }
}

/// Adapter work requested by the editor
#[derive(Debug, Clone, PartialEq)]
pub enum SceneChange {
    /// Entity added to the document; create its body and visual
    Spawned(EntityRef),
    /// Entity removed from the document
    Despawned(EntityRef),
    /// Entity (or the bowl) moved in place
    Moved(EntityRef),
    /// Selection highlight moved to this entity (or cleared)
    Highlight(Option<EntityRef>),
    /// Drag preview replaced (or removed)
    Preview(Option<PreviewShape>),
    /// Unlinked first portal shown at this position (or removed)
    PendingPortal(Option<Vec3>),
}
