//! Session context
//!
//! One object owns the level document, the editor, the gameplay bookkeeping
//! and the ball. Editing and playing are mutually exclusive; test mode runs
//! the rules inside the editor and restores the pre-test document on stop.

use crate::editor::{EditorController, InputQueue, ToolMode};
use crate::level::{LevelDocument, codec};
use crate::tuning::Tuning;

use super::state::{BallKinematics, GameEvent, GameplayState, HazardCause};
use super::tick::{hazard_reset, tick};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionMode {
    #[default]
    Editing,
    Playing,
    /// Gameplay inside the editor; `snapshot` is the encoded pre-test document
    Testing { snapshot: String },
}

#[derive(Debug, Clone)]
pub struct Session {
    pub document: LevelDocument,
    pub editor: EditorController,
    pub gameplay: GameplayState,
    pub ball: BallKinematics,
    pub tuning: Tuning,
    mode: SessionMode,
}

impl Session {
    pub fn new(tuning: Tuning) -> Self {
        let document = LevelDocument::new();
        let ball = BallKinematics::at_rest(document.ball_start);
        Self {
            document,
            editor: EditorController::new(),
            gameplay: GameplayState::new(),
            ball,
            tuning,
            mode: SessionMode::Editing,
        }
    }

    pub fn mode(&self) -> &SessionMode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        self.mode == SessionMode::Editing
    }

    pub fn is_testing(&self) -> bool {
        matches!(self.mode, SessionMode::Testing { .. })
    }

    /// Replace the document wholesale. A running test is abandoned without
    /// restoring its snapshot.
    pub fn load_level(&mut self, code: &str, level_number: u32) {
        codec::decode_into(code, &mut self.document);
        self.document.level_number = level_number;
        self.gameplay.reset();
        self.ball = BallKinematics::at_rest(self.document.ball_start);
        self.editor.reset();
        if self.is_testing() {
            self.mode = SessionMode::Editing;
        }
    }

    pub fn export_code(&self) -> String {
        codec::encode(&self.document)
    }

    pub fn enter_play_mode(&mut self) {
        if self.is_testing() {
            self.stop_test();
        }
        self.editor.reset();
        self.mode = SessionMode::Playing;
        log::debug!("Mode: playing");
    }

    pub fn enter_edit_mode(&mut self) {
        if self.is_testing() {
            self.stop_test();
            return;
        }
        self.gameplay.reset();
        self.document.reset_stars();
        self.ball = BallKinematics::at_rest(self.document.ball_start);
        self.mode = SessionMode::Editing;
        log::debug!("Mode: editing");
    }

    /// Release the ball. Refused while editing, while a drop is already in
    /// flight, or while a win is pending.
    pub fn launch(&mut self) -> bool {
        if self.is_editing() || self.gameplay.is_playing || self.gameplay.pending_win_at.is_some() {
            return false;
        }
        self.gameplay.is_playing = true;
        self.gameplay.stuck_ms = 0.0;
        self.ball.dynamic = true;
        log::info!("Ball released on level {}", self.document.level_number);
        true
    }

    /// Snapshot the document and drop the ball inside the editor
    pub fn start_test(&mut self) -> bool {
        if !self.is_editing() {
            return false;
        }
        let snapshot = codec::encode(&self.document);
        self.editor.reset();
        self.mode = SessionMode::Testing { snapshot };
        self.launch()
    }

    /// Restore the pre-test document verbatim. Returns false when no test was
    /// running; on true the scene must be rebuilt from the document.
    pub fn stop_test(&mut self) -> bool {
        let snapshot = match std::mem::take(&mut self.mode) {
            SessionMode::Testing { snapshot } => snapshot,
            other => {
                self.mode = other;
                return false;
            }
        };
        codec::decode_into(&snapshot, &mut self.document);
        self.gameplay.reset();
        self.ball = BallKinematics::at_rest(self.document.ball_start);
        log::info!("Test stopped, level restored");
        true
    }

    /// Manual reset through the shared hazard path
    pub fn reset_ball(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.gameplay.pending_win_at = None;
        hazard_reset(
            &mut self.document,
            &mut self.gameplay,
            &mut self.ball,
            HazardCause::Manual,
            &mut events,
        );
        events
    }

    pub fn set_tool(&mut self, tool: ToolMode) {
        self.editor.set_tool(tool);
    }

    /// Feed queued pointer input to the editor. Input arriving outside edit
    /// mode is dropped.
    pub fn process_input(&mut self, queue: &mut InputQueue) {
        if !self.is_editing() {
            queue.clear();
            return;
        }
        self.editor
            .process_queue(&mut self.document, queue, &self.tuning);
    }

    /// One rule evaluation. Nothing runs while editing.
    pub fn tick(&mut self, dt: f32) -> Vec<GameEvent> {
        if self.is_editing() {
            return Vec::new();
        }
        tick(
            &mut self.document,
            &mut self.gameplay,
            &mut self.ball,
            &self.tuning,
            dt,
        )
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}
