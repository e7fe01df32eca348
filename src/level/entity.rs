//! Placeable entities
//!
//! Every variant carries an id that is unique within its own list. Segment
//! variants (walls, boosters) are defined by two endpoints; everything else
//! is anchored at a single position.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Entity variants, in the fixed priority order used for picking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Star,
    Wall,
    Booster,
    Spike,
    Portal,
    Ramp,
    /// The singleton goal (never removed, only moved)
    Bowl,
}

impl EntityKind {
    /// Picking priority for list variants (the bowl is a fallback)
    pub const PICK_ORDER: [EntityKind; 6] = [
        EntityKind::Star,
        EntityKind::Wall,
        EntityKind::Booster,
        EntityKind::Spike,
        EntityKind::Portal,
        EntityKind::Ramp,
    ];

    /// Level-code directive for this variant
    pub fn directive(&self) -> &'static str {
        match self {
            EntityKind::Star => "STAR",
            EntityKind::Wall => "WALL",
            EntityKind::Booster => "BOOSTER",
            EntityKind::Spike => "SPIKE",
            EntityKind::Portal => "PORTAL",
            EntityKind::Ramp => "RAMP",
            EntityKind::Bowl => "BOWL",
        }
    }
}

/// Reference to a placed entity (variant + id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: u32,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: u32) -> Self {
        Self { kind, id }
    }

    /// Reference to the bowl singleton
    pub fn bowl() -> Self {
        Self {
            kind: EntityKind::Bowl,
            id: 0,
        }
    }
}

/// A collectible star
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub id: u32,
    pub position: Vec3,
    /// Set by gameplay, cleared by hazard reset
    #[serde(default)]
    pub collected: bool,
}

/// A static wall segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub id: u32,
    pub start: Vec3,
    pub end: Vec3,
}

impl Wall {
    /// Distance between the endpoints
    pub fn length(&self) -> f32 {
        (self.end - self.start).length()
    }

    /// Midpoint of the segment
    pub fn center(&self) -> Vec3 {
        (self.start + self.end) * 0.5
    }

    /// Rotation about Z matching the segment direction
    pub fn angle(&self) -> f32 {
        let d = self.end - self.start;
        d.y.atan2(d.x)
    }
}

/// A speed pad: pushes the ball along `end - start` while it overlaps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booster {
    pub id: u32,
    pub start: Vec3,
    pub end: Vec3,
}

impl Booster {
    /// Unit push direction (zero for a degenerate segment)
    pub fn direction(&self) -> Vec3 {
        (self.end - self.start).normalize_or_zero()
    }

    /// Distance between the endpoints
    pub fn length(&self) -> f32 {
        (self.end - self.start).length()
    }

    /// Midpoint of the segment (the trigger zone centre)
    pub fn center(&self) -> Vec3 {
        (self.start + self.end) * 0.5
    }

    /// Rotation about Z matching the push direction
    pub fn angle(&self) -> f32 {
        let d = self.end - self.start;
        d.y.atan2(d.x)
    }
}

/// A hazard that resets the ball on contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spike {
    pub id: u32,
    pub position: Vec3,
}

/// One half of a linked teleport pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portal {
    pub id: u32,
    pub position: Vec3,
    /// Id of the partner portal; always reciprocal inside a document
    pub linked_id: Option<u32>,
    /// Session-clock time (ms) until which this portal ignores the ball
    #[serde(default)]
    pub cooldown_until: Option<f64>,
}

impl Portal {
    pub fn is_cooling_down(&self, now_ms: f64) -> bool {
        self.cooldown_until.is_some_and(|t| now_ms < t)
    }
}

/// A static inclined plank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ramp {
    pub id: u32,
    pub position: Vec3,
    /// Rotation about Z (radians)
    pub rotation_z: f32,
    pub length: f32,
}

/// Field bundle for creating an entity; the document assigns the id
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntitySpec {
    Star { position: Vec3 },
    Wall { start: Vec3, end: Vec3 },
    Booster { start: Vec3, end: Vec3 },
    Spike { position: Vec3 },
    Ramp { position: Vec3, rotation_z: f32, length: f32 },
}

impl EntitySpec {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntitySpec::Star { .. } => EntityKind::Star,
            EntitySpec::Wall { .. } => EntityKind::Wall,
            EntitySpec::Booster { .. } => EntityKind::Booster,
            EntitySpec::Spike { .. } => EntityKind::Spike,
            EntitySpec::Ramp { .. } => EntityKind::Ramp,
        }
    }
}
