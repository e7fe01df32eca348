//! Browser entry points
//!
//! `WebEditor` wraps a headless-adapter [`Game`]; the page draws from its
//! state and forwards pointer input already projected onto the arena plane.

use glam::Vec3;
use wasm_bindgen::prelude::*;

use crate::adapter::{HeadlessPhysics, HeadlessRenderer};
use crate::editor::{PointerEvent, ToolMode};
use crate::game::Game;

#[wasm_bindgen(start)]
pub fn start() {
    super::init_logging();
    log::info!("Star Drop starting...");
}

#[wasm_bindgen]
pub struct WebEditor {
    game: Game<HeadlessPhysics, HeadlessRenderer>,
}

#[wasm_bindgen]
impl WebEditor {
    /// `levels` is an array of level-code strings, level 1 first
    #[wasm_bindgen(constructor)]
    pub fn new(levels: js_sys::Array) -> WebEditor {
        let codes: Vec<String> = levels.iter().filter_map(|v| v.as_string()).collect();
        WebEditor {
            game: Game::headless(codes, super::default_storage()),
        }
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.game
            .push_input(PointerEvent::down(Vec3::new(x, y, 0.0), js_sys::Date::now()));
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.game
            .push_input(PointerEvent::moved(Vec3::new(x, y, 0.0), js_sys::Date::now()));
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) {
        self.game
            .push_input(PointerEvent::up(Vec3::new(x, y, 0.0), js_sys::Date::now()));
    }

    /// Returns false for an unknown tool name
    pub fn set_tool(&mut self, name: &str) -> bool {
        match ToolMode::from_str(name) {
            Some(tool) => {
                self.game.set_tool(tool);
                true
            }
            None => false,
        }
    }

    pub fn tool(&self) -> String {
        self.game.session().editor.tool().as_str().to_string()
    }

    /// Advance one frame; returns the frame's events as JSON
    pub fn frame(&mut self, dt: f32) -> String {
        let events = self.game.frame(dt);
        serde_json::to_string(&events).unwrap_or_default()
    }

    pub fn play(&mut self) -> bool {
        self.game.play()
    }

    pub fn edit(&mut self) {
        self.game.edit();
    }

    pub fn start_test(&mut self) -> bool {
        self.game.start_test()
    }

    pub fn stop_test(&mut self) -> bool {
        self.game.stop_test()
    }

    pub fn reset_ball(&mut self) {
        self.game.reset_ball();
    }

    pub fn clear_placed(&mut self) {
        self.game.clear_placed();
    }

    pub fn delete_selection(&mut self) {
        self.game.delete_selection();
    }

    pub fn export_code(&self) -> String {
        self.game.export_code()
    }

    pub fn import_code(&mut self, code: &str) {
        self.game.import_code(code);
    }

    pub fn select_level(&mut self, level: u32) -> Result<(), JsValue> {
        self.game
            .select_level(level)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn next_level(&mut self) -> Result<(), JsValue> {
        self.game
            .next_level()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn current_level(&self) -> u32 {
        self.game.current_level()
    }

    pub fn level_count(&self) -> usize {
        self.game.level_count()
    }

    pub fn max_unlocked(&self) -> u32 {
        self.game.progression().max_unlocked()
    }

    pub fn stars_collected(&self) -> u32 {
        self.game.session().gameplay.stars_collected
    }

    pub fn total_stars(&self) -> usize {
        self.game.session().document.total_stars()
    }

    /// `[x, y, z]`
    pub fn ball_position(&self) -> Vec<f32> {
        self.game.session().ball.position.to_array().to_vec()
    }

    /// Ghost preview position for click tools, `[x, y, z]` or empty
    pub fn ghost_position(&self) -> Vec<f32> {
        self.game
            .session()
            .editor
            .ghost_position()
            .map(|p| p.to_array().to_vec())
            .unwrap_or_default()
    }

    /// The whole level document as JSON, for drawing
    pub fn document_json(&self) -> String {
        serde_json::to_string(&self.game.session().document).unwrap_or_default()
    }
}
