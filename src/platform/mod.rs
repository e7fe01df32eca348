//! Platform layer
//!
//! Handles browser/native differences for:
//! - Logger and panic hook setup
//! - Storage backend selection
//! - The browser-facing editor handle (wasm32 only)

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::persistence::Storage;

/// Install the platform logger. Safe to call more than once.
pub fn init_logging() {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .try_init();
    }
}

/// Browser LocalStorage, or memory when it is unavailable (private mode)
#[cfg(target_arch = "wasm32")]
pub fn default_storage() -> Box<dyn Storage> {
    match crate::persistence::LocalStorage::open() {
        Ok(storage) => Box::new(storage),
        Err(e) => {
            log::warn!("LocalStorage unavailable ({}), progress will not persist", e);
            Box::new(crate::persistence::MemoryStorage::new())
        }
    }
}

/// Files under `save_dir`, or memory when no directory is given
#[cfg(not(target_arch = "wasm32"))]
pub fn default_storage(save_dir: Option<std::path::PathBuf>) -> Box<dyn Storage> {
    match save_dir {
        Some(dir) => {
            log::info!("Saving to {}", dir.display());
            Box::new(crate::persistence::FileStorage::new(dir))
        }
        None => Box::new(crate::persistence::MemoryStorage::new()),
    }
}
