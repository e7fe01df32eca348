//! Editor tool state machine
//!
//! Interprets pointer input according to the active tool and mutates the
//! level document. Click tools (star, bowl, spike, portal) act on pointer-up
//! after a quick click; drag tools (wall, booster) commit the dragged segment;
//! select picks and drags entities; delete removes on pointer-down.

use glam::Vec3;

use super::input::{InputQueue, PointerEvent, PointerKind};
use super::preview::{PreviewShape, SceneChange};
use super::tool::ToolMode;
use crate::clamp_to_arena;
use crate::level::{EntityKind, EntityRef, EntitySpec, LevelDocument};
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorState {
    #[default]
    Idle,
    /// Click tool pressed, waiting for pointer-up
    ToolPlacing,
    /// Wall/booster segment being dragged out
    ToolDragging,
    /// Selected entity following the pointer
    ObjectDragging,
    /// First portal placed, waiting for its partner
    PortalPendingSecond,
}

/// The picked entity plus the entity-minus-pointer offset taken at pick time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub entity: EntityRef,
    pub offset: Vec3,
}

/// Pointer-down bookkeeping for click/drag disambiguation
#[derive(Debug, Clone, Copy)]
struct Press {
    position: Vec3,
    time_ms: f64,
    has_dragged: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EditorController {
    tool: ToolMode,
    state: EditorState,
    selection: Option<Selection>,
    press: Option<Press>,
    drag_start: Option<Vec3>,
    pointer: Option<Vec3>,
    /// First half of a portal pair; never part of the document
    pending_portal: Option<Vec3>,
    preview: Option<PreviewShape>,
    changes: Vec<SceneChange>,
}

impl EditorController {
    /// Idle controller with the select tool
    pub fn new() -> Self {
        Self::default()
    }

    /// Active tool
    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    /// Current gesture state
    pub fn state(&self) -> EditorState {
        self.state
    }

    /// Selected entity and its grab offset
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Uncommitted wall/booster shape while dragging
    pub fn preview(&self) -> Option<PreviewShape> {
        self.preview
    }

    /// First portal of an unfinished pair
    pub fn pending_portal(&self) -> Option<Vec3> {
        self.pending_portal
    }

    /// True until the first portal of a pair has been placed
    pub fn placing_first(&self) -> bool {
        self.pending_portal.is_none()
    }

    /// Where a click tool's ghost should be drawn
    pub fn ghost_position(&self) -> Option<Vec3> {
        if self.tool.is_click_tool() {
            self.pointer
        } else {
            None
        }
    }

    /// Adapter work accumulated since the last drain
    pub fn drain_changes(&mut self) -> Vec<SceneChange> {
        std::mem::take(&mut self.changes)
    }

    /// Switch tools. Cancels any gesture, drops an unpaired portal and clears the selection.
    pub fn set_tool(&mut self, tool: ToolMode) {
        self.reset();
        if tool != self.tool {
            log::debug!("Tool: {} -> {}", self.tool.as_str(), tool.as_str());
        }
        self.tool = tool;
    }

    /// Return to idle without changing tools
    pub fn reset(&mut self) {
        self.cancel_gesture();
        if self.pending_portal.take().is_some() {
            log::debug!("Discarded unpaired portal");
            self.changes.push(SceneChange::PendingPortal(None));
        }
        self.set_selection(None);
        self.state = EditorState::Idle;
    }

    /// Feed every queued pointer event, in order
    pub fn process_queue(&mut self, doc: &mut LevelDocument, queue: &mut InputQueue, tuning: &Tuning) {
        while let Some(event) = queue.pop() {
            self.handle(doc, event, tuning);
        }
    }

    /// Apply one pointer event; the position is clamped to the arena first
    pub fn handle(&mut self, doc: &mut LevelDocument, event: PointerEvent, tuning: &Tuning) {
        let pos = clamp_to_arena(event.position);
        self.pointer = Some(pos);
        match event.kind {
            PointerKind::Down => self.pointer_down(doc, pos, event.time_ms, tuning),
            PointerKind::Move => self.pointer_move(doc, pos, tuning),
            PointerKind::Up => self.pointer_up(doc, pos, event.time_ms, tuning),
        }
    }

    fn pointer_down(&mut self, doc: &mut LevelDocument, pos: Vec3, time_ms: f64, tuning: &Tuning) {
        // A down without a matching up abandons the earlier gesture
        if self.press.is_some() {
            self.cancel_gesture();
        }
        self.press = Some(Press {
            position: pos,
            time_ms,
            has_dragged: false,
        });

        match self.tool {
            ToolMode::Select => match doc.find_nearest(pos, tuning.pick_threshold) {
                Some(entity) => {
                    let anchor = doc.entity_anchor(entity).unwrap_or(pos);
                    self.set_selection(Some(Selection {
                        entity,
                        offset: anchor - pos,
                    }));
                    self.state = EditorState::ObjectDragging;
                }
                None => {
                    self.set_selection(None);
                    self.state = EditorState::Idle;
                }
            },
            ToolMode::Delete => {
                if let Some(entity) = doc.find_nearest(pos, tuning.pick_threshold) {
                    self.delete(doc, entity);
                }
                self.state = EditorState::Idle;
            }
            ToolMode::Wall | ToolMode::Booster => {
                self.drag_start = Some(pos);
                self.state = EditorState::ToolDragging;
            }
            ToolMode::Star | ToolMode::Bowl | ToolMode::Spike | ToolMode::Portal => {
                self.state = EditorState::ToolPlacing;
            }
        }
    }

    fn pointer_move(&mut self, doc: &mut LevelDocument, pos: Vec3, tuning: &Tuning) {
        if let Some(press) = self.press.as_mut() {
            if pos.distance(press.position) > tuning.drag_threshold {
                press.has_dragged = true;
            }
        }

        match self.state {
            EditorState::ObjectDragging => {
                let Some(sel) = self.selection else { return };
                let Some(anchor) = doc.entity_anchor(sel.entity) else {
                    return;
                };
                let delta = pos + sel.offset - anchor;
                if delta != Vec3::ZERO && doc.translate_entity(sel.entity, delta) {
                    self.changes.push(SceneChange::Moved(sel.entity));
                }
            }
            EditorState::ToolDragging => {
                let (Some(start), Some(kind)) = (self.drag_start, self.tool.creates()) else {
                    return;
                };
                let shape = PreviewShape {
                    kind,
                    start,
                    end: pos,
                };
                let next = (shape.length() >= tuning.min_preview_length).then_some(shape);
                if next != self.preview {
                    self.preview = next;
                    self.changes.push(SceneChange::Preview(next));
                }
            }
            _ => {}
        }
    }

    fn pointer_up(&mut self, doc: &mut LevelDocument, pos: Vec3, time_ms: f64, tuning: &Tuning) {
        let Some(mut press) = self.press.take() else {
            return;
        };
        if pos.distance(press.position) > tuning.drag_threshold {
            press.has_dragged = true;
        }
        let quick_click = time_ms - press.time_ms < tuning.click_max_ms && !press.has_dragged;

        match self.state {
            EditorState::ObjectDragging => {
                // Selection stays for further edits
                self.state = EditorState::Idle;
            }
            EditorState::ToolDragging => {
                self.commit_segment(doc, pos, press.has_dragged, tuning);
                self.state = EditorState::Idle;
            }
            EditorState::ToolPlacing => {
                if quick_click {
                    self.place(doc, pos);
                }
                self.state = if self.pending_portal.is_some() {
                    EditorState::PortalPendingSecond
                } else {
                    EditorState::Idle
                };
            }
            EditorState::Idle | EditorState::PortalPendingSecond => {}
        }
    }

    fn commit_segment(&mut self, doc: &mut LevelDocument, end: Vec3, has_dragged: bool, tuning: &Tuning) {
        self.clear_preview();
        let Some(start) = self.drag_start.take() else {
            return;
        };
        let length = start.distance(end);
        if !has_dragged || length < tuning.min_segment_length {
            log::debug!("Discarded {:.2}-unit {} drag", length, self.tool.as_str());
            return;
        }
        let spec = match self.tool {
            ToolMode::Wall => EntitySpec::Wall { start, end },
            ToolMode::Booster => EntitySpec::Booster { start, end },
            _ => return,
        };
        let entity = doc.add_entity(spec);
        log::debug!("Placed {:?} {}", entity.kind, entity.id);
        self.changes.push(SceneChange::Spawned(entity));
    }

    fn place(&mut self, doc: &mut LevelDocument, pos: Vec3) {
        match self.tool {
            ToolMode::Star => {
                let entity = doc.add_entity(EntitySpec::Star { position: pos });
                self.changes.push(SceneChange::Spawned(entity));
            }
            ToolMode::Spike => {
                let entity = doc.add_entity(EntitySpec::Spike { position: pos });
                self.changes.push(SceneChange::Spawned(entity));
            }
            ToolMode::Bowl => {
                doc.bowl = pos;
                self.changes.push(SceneChange::Moved(EntityRef::bowl()));
            }
            ToolMode::Portal => match self.pending_portal.take() {
                None => {
                    self.pending_portal = Some(pos);
                    self.changes.push(SceneChange::PendingPortal(Some(pos)));
                }
                Some(first) => {
                    let (a, b) = doc.add_portal_pair(first, pos);
                    log::debug!("Placed portal pair {} <-> {}", a, b);
                    self.changes.push(SceneChange::PendingPortal(None));
                    self.changes
                        .push(SceneChange::Spawned(EntityRef::new(EntityKind::Portal, a)));
                    self.changes
                        .push(SceneChange::Spawned(EntityRef::new(EntityKind::Portal, b)));
                }
            },
            ToolMode::Select | ToolMode::Delete | ToolMode::Wall | ToolMode::Booster => {}
        }
    }

    /// Delete the current selection (keyboard delete)
    pub fn delete_selection(&mut self, doc: &mut LevelDocument) {
        if let Some(sel) = self.selection {
            self.delete(doc, sel.entity);
        }
    }

    fn delete(&mut self, doc: &mut LevelDocument, entity: EntityRef) {
        if entity.kind == EntityKind::Bowl {
            log::debug!("The bowl can be moved but not deleted");
            return;
        }
        for removed in doc.remove_entity(entity) {
            if self.selection.is_some_and(|s| s.entity == removed) {
                self.set_selection(None);
            }
            log::debug!("Deleted {:?} {}", removed.kind, removed.id);
            self.changes.push(SceneChange::Despawned(removed));
        }
    }

    fn set_selection(&mut self, selection: Option<Selection>) {
        let before = self.selection.map(|s| s.entity);
        let after = selection.map(|s| s.entity);
        self.selection = selection;
        if before != after {
            self.changes.push(SceneChange::Highlight(after));
        }
    }

    fn clear_preview(&mut self) {
        if self.preview.take().is_some() {
            self.changes.push(SceneChange::Preview(None));
        }
    }

    fn cancel_gesture(&mut self) {
        self.press = None;
        self.drag_start = None;
        self.clear_preview();
        self.state = if self.pending_portal.is_some() {
            EditorState::PortalPendingSecond
        } else {
            EditorState::Idle
        };
    }
}
