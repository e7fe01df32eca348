//! Editor tools

use serde::{Deserialize, Serialize};

use crate::level::EntityKind;

/// The active editor tool. Exactly one is armed at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolMode {
    #[default]
    Select,
    Star,
    Bowl,
    Wall,
    Booster,
    Spike,
    Portal,
    Delete,
}

impl ToolMode {
    pub const ALL: [ToolMode; 8] = [
        ToolMode::Select,
        ToolMode::Star,
        ToolMode::Bowl,
        ToolMode::Wall,
        ToolMode::Booster,
        ToolMode::Spike,
        ToolMode::Portal,
        ToolMode::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolMode::Select => "select",
            ToolMode::Star => "star",
            ToolMode::Bowl => "bowl",
            ToolMode::Wall => "wall",
            ToolMode::Booster => "booster",
            ToolMode::Spike => "spike",
            ToolMode::Portal => "portal",
            ToolMode::Delete => "delete",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "select" | "move" => Some(ToolMode::Select),
            "star" => Some(ToolMode::Star),
            "bowl" | "goal" => Some(ToolMode::Bowl),
            "wall" => Some(ToolMode::Wall),
            "booster" | "boost" => Some(ToolMode::Booster),
            "spike" => Some(ToolMode::Spike),
            "portal" => Some(ToolMode::Portal),
            "delete" | "erase" => Some(ToolMode::Delete),
            _ => None,
        }
    }

    /// Tools defined by dragging out a segment
    pub fn is_drag_tool(&self) -> bool {
        matches!(self, ToolMode::Wall | ToolMode::Booster)
    }

    /// Tools that act on pointer-up after a quick click
    pub fn is_click_tool(&self) -> bool {
        matches!(
            self,
            ToolMode::Star | ToolMode::Bowl | ToolMode::Spike | ToolMode::Portal
        )
    }

    /// Entity kind this tool creates, if any
    pub fn creates(&self) -> Option<EntityKind> {
        match self {
            ToolMode::Star => Some(EntityKind::Star),
            ToolMode::Bowl => Some(EntityKind::Bowl),
            ToolMode::Wall => Some(EntityKind::Wall),
            ToolMode::Booster => Some(EntityKind::Booster),
            ToolMode::Spike => Some(EntityKind::Spike),
            ToolMode::Portal => Some(EntityKind::Portal),
            ToolMode::Select | ToolMode::Delete => None,
        }
    }
}
