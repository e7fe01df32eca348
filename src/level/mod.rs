//! Level data model
//!
//! - `entity`: placeable entity variants and references
//! - `document`: the level registry
//! - `codec`: level-code text import/export
//! - `builtin`: the default level
//! - `loader`: sequential level-list fetching

pub mod builtin;
pub mod codec;
pub mod document;
pub mod entity;
pub mod loader;

pub use codec::{decode, decode_into, encode};
pub use document::{BOWL_PICK_RADIUS, BOWL_TIE_MARGIN, LevelDocument};
pub use entity::{Booster, EntityKind, EntityRef, EntitySpec, Portal, Ramp, Spike, Star, Wall};
pub use loader::{
    DirectorySource, LevelFetchError, LevelSet, LevelSource, MemorySource, load_level_list,
};
