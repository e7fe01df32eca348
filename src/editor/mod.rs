//! Level editor
//!
//! Pointer input goes through an [`InputQueue`], the [`EditorController`]
//! turns it into document edits, and the resulting [`SceneChange`]s are
//! applied to the adapters by the frame driver.

pub mod controller;
pub mod input;
pub mod preview;
pub mod tool;

pub use controller::{EditorController, EditorState, Selection};
pub use input::{InputQueue, PointerEvent, PointerKind};
pub use preview::{PreviewShape, SceneChange};
pub use tool::ToolMode;
