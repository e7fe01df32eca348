//! External collaborator boundaries
//!
//! Physics and rendering live behind traits. The headless implementations
//! drive tests and the native binary; a browser build plugs in its own.

pub mod collision;
pub mod headless;
pub mod physics;
pub mod render;
pub mod scene;

pub use headless::{HeadlessPhysics, HeadlessRenderer};
pub use physics::{BodyHandle, BodyKind, Contact, KinematicMode, PhysicsAdapter, ShapeSpec};
pub use render::{RendererAdapter, VisualHandle, VisualKind, VisualParams};
pub use scene::{EntityBinding, SceneBindings};
