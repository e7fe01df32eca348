//! Frame driver
//!
//! Owns the session, the adapters and the persisted records. One `frame`
//! runs physics, then the rules, reacts to their events, then feeds queued
//! editor input and pushes the results to the adapters.

use thiserror::Error;

use crate::adapter::{HeadlessPhysics, HeadlessRenderer, PhysicsAdapter, RendererAdapter, SceneBindings};
use crate::consts::MAX_FRAME_DT;
use crate::editor::{InputQueue, PointerEvent, ToolMode};
use crate::level::LevelSet;
use crate::persistence::Storage;
use crate::progression::ProgressionTracker;
use crate::sim::{GameEvent, ImpactGate, Session, SessionMode};
use crate::tuning::Tuning;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("level {0} is locked")]
    Locked(u32),
    #[error("level {0} does not exist")]
    UnknownLevel(u32),
}

pub struct Game<P: PhysicsAdapter, R: RendererAdapter> {
    session: Session,
    scene: SceneBindings,
    physics: P,
    renderer: R,
    progression: ProgressionTracker,
    storage: Box<dyn Storage>,
    levels: LevelSet,
    impact: ImpactGate,
    input: InputQueue,
}

impl Game<HeadlessPhysics, HeadlessRenderer> {
    /// A game backed by the in-memory adapters
    pub fn headless(levels: impl Into<LevelSet>, storage: Box<dyn Storage>) -> Self {
        Self::new(HeadlessPhysics::new(), HeadlessRenderer::new(), levels, storage)
    }
}

impl<P: PhysicsAdapter, R: RendererAdapter> Game<P, R> {
    /// Load tuning and progression from `storage` and open level 1
    pub fn new(physics: P, renderer: R, levels: impl Into<LevelSet>, storage: Box<dyn Storage>) -> Self {
        let levels = levels.into();
        let tuning = Tuning::load(storage.as_ref());
        let progression = ProgressionTracker::load(storage.as_ref());

        let mut game = Self {
            session: Session::new(tuning),
            scene: SceneBindings::new(),
            physics,
            renderer,
            progression,
            storage,
            levels,
            impact: ImpactGate::new(),
            input: InputQueue::new(),
        };
        game.open_level(1);
        game
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn scene(&self) -> &SceneBindings {
        &self.scene
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn progression(&self) -> &ProgressionTracker {
        &self.progression
    }

    /// Levels that can be listed; generated levels count up to the unlock frontier
    pub fn level_count(&self) -> usize {
        self.levels
            .fetched_len()
            .unwrap_or(self.progression.max_unlocked() as usize)
    }

    pub fn current_level(&self) -> u32 {
        self.session.document.level_number
    }

    /// Switch to level `n` if it exists and is unlocked
    pub fn select_level(&mut self, level: u32) -> Result<(), GameError> {
        let Some(code) = self.levels.code(level) else {
            return Err(GameError::UnknownLevel(level));
        };
        if !self.progression.is_selectable(level) {
            return Err(GameError::Locked(level));
        }
        self.load(&code, level);
        Ok(())
    }

    pub fn next_level(&mut self) -> Result<(), GameError> {
        self.select_level(self.current_level().saturating_add(1))
    }

    fn open_level(&mut self, level: u32) {
        if let Some(code) = self.levels.code(level) {
            self.load(&code, level);
        }
    }

    fn load(&mut self, code: &str, level: u32) {
        self.session.load_level(code, level);
        self.rebuild_scene();
        log::info!(
            "Opened level {} ({} stars)",
            level,
            self.session.document.total_stars()
        );
    }

    fn rebuild_scene(&mut self) {
        self.session.editor.drain_changes();
        self.scene
            .spawn_document(&self.session.document, &mut self.physics, &mut self.renderer);
        self.impact = ImpactGate::new();
    }

    pub fn export_code(&self) -> String {
        self.session.export_code()
    }

    /// Replace the current level's contents with an imported code
    pub fn import_code(&mut self, code: &str) {
        let level = self.current_level();
        self.session.load_level(code, level);
        self.rebuild_scene();
        log::info!("Imported level code ({} stars)", self.session.document.total_stars());
    }

    pub fn push_input(&mut self, event: PointerEvent) {
        self.input.push(event);
    }

    pub fn set_tool(&mut self, tool: ToolMode) {
        self.session.set_tool(tool);
        self.apply_editor_changes();
    }

    /// Drop obstacles placed on top of the level, keeping its stars
    pub fn clear_placed(&mut self) {
        if !self.session.is_editing() {
            return;
        }
        self.session.editor.reset();
        self.apply_editor_changes();
        for entity in self.session.document.clear_placed() {
            self.scene
                .despawn_entity(entity, &mut self.physics, &mut self.renderer);
        }
    }

    pub fn delete_selection(&mut self) {
        self.session.editor.delete_selection(&mut self.session.document);
        self.apply_editor_changes();
    }

    /// Leave the editor (if needed) and release the ball
    pub fn play(&mut self) -> bool {
        if self.session.is_editing() {
            self.session.enter_play_mode();
            self.apply_editor_changes();
        }
        let launched = self.session.launch();
        self.sync_ball();
        launched
    }

    /// Back to the editor; a running test restores its snapshot
    pub fn edit(&mut self) {
        let was_testing = self.session.is_testing();
        self.session.enter_edit_mode();
        if was_testing {
            self.rebuild_scene();
        } else {
            self.scene
                .restore_stars(&self.session.document, &mut self.renderer);
            self.sync_ball();
        }
    }

    pub fn start_test(&mut self) -> bool {
        let started = self.session.start_test();
        self.apply_editor_changes();
        self.sync_ball();
        started
    }

    pub fn stop_test(&mut self) -> bool {
        let stopped = self.session.stop_test();
        if stopped {
            self.rebuild_scene();
        }
        stopped
    }

    pub fn reset_ball(&mut self) -> Vec<GameEvent> {
        let events = self.session.reset_ball();
        self.sync_ball();
        self.handle_events(&events);
        events
    }

    /// Advance one frame by `dt` seconds
    pub fn frame(&mut self, dt: f32) -> Vec<GameEvent> {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        self.physics.advance(dt);
        self.session.ball = self.scene.read_ball(&self.physics, &self.session.ball);

        let mut events = Vec::new();
        let now = self.session.gameplay.clock_ms + dt as f64 * 1000.0;
        let ball_body = self.scene.ball().map(|b| b.body);
        for contact in self.physics.take_contacts() {
            if Some(contact.body) != ball_body {
                continue;
            }
            if let Some(event) = self
                .impact
                .accept(contact.impact_speed, now, &self.session.tuning)
            {
                events.push(event);
            }
        }

        events.extend(self.session.tick(dt));
        self.sync_ball();
        self.handle_events(&events);

        self.session.process_input(&mut self.input);
        self.apply_editor_changes();
        events
    }

    fn handle_events(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::StarCollected { id, .. } => {
                    self.scene.set_star_visible(*id, false, &mut self.renderer);
                }
                GameEvent::Hazard { .. } => {
                    self.scene
                        .restore_stars(&self.session.document, &mut self.renderer);
                }
                GameEvent::Won { level } => self.record_win(*level),
                GameEvent::Boosted { .. }
                | GameEvent::Teleported { .. }
                | GameEvent::GoalReached
                | GameEvent::Impact { .. } => {}
            }
        }
    }

    fn record_win(&mut self, level: u32) {
        if *self.session.mode() != SessionMode::Playing {
            log::info!("Test run reached the bowl");
            return;
        }
        if let Err(e) = self.progression.complete(level, self.storage.as_mut()) {
            log::error!("Failed to save progression: {}", e);
        }
    }

    fn apply_editor_changes(&mut self) {
        let changes = self.session.editor.drain_changes();
        if changes.is_empty() {
            return;
        }
        self.scene.apply(
            changes,
            &self.session.document,
            &mut self.physics,
            &mut self.renderer,
        );
    }

    fn sync_ball(&mut self) {
        self.scene
            .write_ball(&self.session.ball, &mut self.physics, &mut self.renderer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::VisualKind;
    use crate::consts::SIM_DT;
    use crate::level::builtin::{bowl_position, star_positions};
    use crate::level::{EntityKind, MemorySource, load_level_list};
    use crate::persistence::MemoryStorage;
    use crate::sim::HazardCause;
    use glam::Vec3;

    const DROP_LEVEL: &str = "BALL:0,0,0\nBOWL:0,-11.1,0\nSTAR:0,-3,0";

    fn game(levels: &[&str]) -> Game<HeadlessPhysics, HeadlessRenderer> {
        Game::headless(
            levels.iter().map(|s| s.to_string()).collect::<Vec<String>>(),
            Box::new(MemoryStorage::new()),
        )
    }

    fn run(game: &mut Game<HeadlessPhysics, HeadlessRenderer>, seconds: f32) -> Vec<GameEvent> {
        let frames = (seconds / SIM_DT) as usize;
        (0..frames).flat_map(|_| game.frame(SIM_DT)).collect()
    }

    #[test]
    fn test_drop_collects_star_and_wins() {
        let mut game = game(&[DROP_LEVEL, DROP_LEVEL]);
        assert_eq!(game.next_level(), Err(GameError::Locked(2)));
        assert!(game.play());

        let events = run(&mut game, 3.0);
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::StarCollected { .. })));
        assert!(events.contains(&GameEvent::GoalReached));
        assert!(events.contains(&GameEvent::Won { level: 1 }));
        assert!(events.iter().any(|e| matches!(e, GameEvent::Impact { .. })));

        assert!(game.progression().is_completed(1));
        assert_eq!(
            game.renderer()
                .visible_count(VisualKind::Entity(EntityKind::Star)),
            0
        );
        assert_eq!(game.next_level(), Ok(()));
        assert_eq!(game.current_level(), 2);
        assert_eq!(game.select_level(3), Err(GameError::UnknownLevel(3)));
    }

    #[test]
    fn test_builtin_levels_continue_after_a_win() {
        let mut game = Game::headless(
            load_level_list(&mut MemorySource::new()),
            Box::new(MemoryStorage::new()),
        );
        assert_eq!(game.level_count(), 1);
        assert_eq!(game.next_level(), Err(GameError::Locked(2)));

        assert!(game.play());
        let events = run(&mut game, 4.0);
        assert!(events.contains(&GameEvent::Won { level: 1 }));
        assert_eq!(game.level_count(), 2);

        assert_eq!(game.next_level(), Ok(()));
        assert_eq!(game.current_level(), 2);
        let doc = &game.session().document;
        assert_eq!(doc.stars.len(), 5);
        for (star, expected) in doc.stars.iter().zip(star_positions(2)) {
            assert!(star.position.distance(expected) < 0.01);
        }
        assert!(doc.bowl.distance(bowl_position(2)) < 0.01);
        assert_eq!(game.select_level(3), Err(GameError::Locked(3)));
    }

    #[test]
    fn test_editing_places_star_through_queue() {
        let mut game = game(&["BALL:0,12,0\nBOWL:0,-11.1,0"]);
        game.set_tool(ToolMode::Star);
        game.push_input(PointerEvent::down(Vec3::new(3.0, 3.0, 0.0), 0.0));
        game.push_input(PointerEvent::up(Vec3::new(3.0, 3.0, 0.0), 40.0));
        game.frame(SIM_DT);

        assert_eq!(game.session().document.total_stars(), 1);
        assert_eq!(
            game.renderer().count(VisualKind::Entity(EntityKind::Star)),
            1
        );
        assert!(game.export_code().contains("STAR:3.00,3.00,0.00"));
    }

    #[test]
    fn test_test_mode_restores_level() {
        let mut game = game(&[DROP_LEVEL]);
        let before = game.export_code();
        assert!(game.start_test());
        let events = run(&mut game, 3.0);
        assert!(events.contains(&GameEvent::Won { level: 1 }));
        assert!(game.session().document.stars[0].collected);

        assert!(game.stop_test());
        assert_eq!(game.export_code(), before);
        assert_eq!(
            game.renderer()
                .visible_count(VisualKind::Entity(EntityKind::Star)),
            1
        );
        // Wins inside a test never count as progression
        assert!(!game.progression().is_completed(1));
    }

    #[test]
    fn test_falling_off_the_floor_resets_ball() {
        // Dropped beside the floor, so nothing stops the fall
        let mut game = game(&["BALL:30,0,0\nBOWL:0,-11.1,0"]);
        game.play();
        let events = run(&mut game, 2.0);
        assert!(events.contains(&GameEvent::Hazard {
            cause: HazardCause::OutOfBounds
        }));
        assert_eq!(game.session().ball.position, Vec3::new(30.0, 0.0, 0.0));
        assert!(!game.session().gameplay.is_playing);
        let ball = game.scene().ball().unwrap();
        assert_eq!(game.physics().position(ball.body), Some(Vec3::new(30.0, 0.0, 0.0)));
    }

    #[test]
    fn test_manual_reset() {
        let mut game = game(&[DROP_LEVEL]);
        game.play();
        run(&mut game, 0.5);
        let events = game.reset_ball();
        assert_eq!(
            events,
            vec![GameEvent::Hazard {
                cause: HazardCause::Manual
            }]
        );
        assert_eq!(game.session().ball.position, Vec3::ZERO);
        assert!(game.play());
    }

    #[test]
    fn test_clear_placed_despawns_obstacles() {
        let mut game = game(&["BALL:0,12,0\nBOWL:0,-11.1,0\nSTAR:1,1,0\nWALL:0,0,0,3,0,0\nSPIKE:4,4,0"]);
        game.clear_placed();
        assert_eq!(game.session().document.walls.len(), 0);
        assert_eq!(game.session().document.spikes.len(), 0);
        assert_eq!(game.scene().entity_count(), 2);
        assert_eq!(game.renderer().count(VisualKind::Entity(EntityKind::Wall)), 0);
    }
}
