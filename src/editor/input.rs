//! Pointer input queue
//!
//! Platform handlers push events as they arrive; the editor drains the queue
//! once per tick, preserving down/move/up order.

use std::collections::VecDeque;

use glam::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

/// A pointer event already projected onto the arena plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// World position on the placement plane
    pub position: Vec3,
    /// Timestamp in milliseconds
    pub time_ms: f64,
}

impl PointerEvent {
    pub fn down(position: Vec3, time_ms: f64) -> Self {
        Self {
            kind: PointerKind::Down,
            position,
            time_ms,
        }
    }

    pub fn moved(position: Vec3, time_ms: f64) -> Self {
        Self {
            kind: PointerKind::Move,
            position,
            time_ms,
        }
    }

    pub fn up(position: Vec3, time_ms: f64) -> Self {
        Self {
            kind: PointerKind::Up,
            position,
            time_ms,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    events: VecDeque<PointerEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: PointerEvent) {
        self.events.push_back(event);
    }

    pub fn pop(&mut self) -> Option<PointerEvent> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
