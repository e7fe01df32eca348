//! Level list loading
//!
//! Levels are fetched one by one (1, 2, ...) until the first failure. A
//! failed fetch and "past the last level" look the same, so a transient error
//! silently shortens the list. If nothing loads, levels are generated from the
//! built-in layout.

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

use super::builtin::default_level;
use super::codec::encode;

/// Why a level could not be fetched
#[derive(Debug, Error)]
pub enum LevelFetchError {
    #[error("level {0} not found")]
    NotFound(u32),
    #[error("failed to read level {level}: {source}")]
    Io {
        level: u32,
        #[source]
        source: std::io::Error,
    },
}

/// Somewhere level codes can be fetched from by level number
pub trait LevelSource {
    fn fetch(&mut self, level: u32) -> Result<String, LevelFetchError>;
}

/// Reads `level{n}.txt` files from a directory
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, level: u32) -> PathBuf {
        self.root.join(format!("level{}.txt", level))
    }
}

impl LevelSource for DirectorySource {
    fn fetch(&mut self, level: u32) -> Result<String, LevelFetchError> {
        let path = self.path_for(level);
        std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LevelFetchError::NotFound(level)
            } else {
                LevelFetchError::Io { level, source }
            }
        })
    }
}

/// In-memory level codes keyed by level number
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    levels: BTreeMap<u32, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: u32, code: impl Into<String>) -> Self {
        self.levels.insert(level, code.into());
        self
    }
}

impl LevelSource for MemorySource {
    fn fetch(&mut self, level: u32) -> Result<String, LevelFetchError> {
        self.levels
            .get(&level)
            .cloned()
            .ok_or(LevelFetchError::NotFound(level))
    }
}

/// The levels a game can open
#[derive(Debug, Clone, PartialEq)]
pub enum LevelSet {
    /// Fetched level codes; index 0 is level 1
    Fetched(Vec<String>),
    /// Nothing loaded: every level is generated from the built-in layout
    Builtin,
}

impl LevelSet {
    /// Level code for `level`, if that level exists
    pub fn code(&self, level: u32) -> Option<String> {
        if level == 0 {
            return None;
        }
        match self {
            LevelSet::Fetched(codes) => codes.get(level as usize - 1).cloned(),
            LevelSet::Builtin => Some(encode(&default_level(level))),
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, LevelSet::Builtin)
    }

    /// Number of fetched levels (`None` when levels are generated)
    pub fn fetched_len(&self) -> Option<usize> {
        match self {
            LevelSet::Fetched(codes) => Some(codes.len()),
            LevelSet::Builtin => None,
        }
    }
}

impl From<Vec<String>> for LevelSet {
    fn from(codes: Vec<String>) -> Self {
        if codes.is_empty() {
            LevelSet::Builtin
        } else {
            LevelSet::Fetched(codes)
        }
    }
}

/// Fetch levels sequentially until the first failure.
///
/// Falls back to the built-in levels when the first fetch already fails.
pub fn load_level_list<S: LevelSource + ?Sized>(source: &mut S) -> LevelSet {
    let mut levels = Vec::new();
    let mut next = 1u32;
    loop {
        match source.fetch(next) {
            Ok(code) => {
                levels.push(code);
                next += 1;
            }
            Err(e) => {
                // End of list and a real failure are indistinguishable here
                log::info!("Level list ends before level {} ({})", next, e);
                break;
            }
        }
    }

    if levels.is_empty() {
        log::info!("No levels loaded, using built-in default levels");
    } else {
        log::info!("Loaded {} levels", levels.len());
    }
    LevelSet::from(levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::builtin::default_level_code;

    /// Fails on one specific level to model a transient error
    struct Flaky {
        inner: MemorySource,
        fail_at: u32,
    }

    impl LevelSource for Flaky {
        fn fetch(&mut self, level: u32) -> Result<String, LevelFetchError> {
            if level == self.fail_at {
                return Err(LevelFetchError::Io {
                    level,
                    source: std::io::Error::other("connection reset"),
                });
            }
            self.inner.fetch(level)
        }
    }

    #[test]
    fn test_loads_until_gap() {
        let mut src = MemorySource::new()
            .with_level(1, "STAR:0,0,0")
            .with_level(2, "STAR:1,0,0")
            .with_level(4, "STAR:3,0,0");
        let levels = load_level_list(&mut src);
        assert_eq!(levels.fetched_len(), Some(2));
        assert_eq!(levels.code(2).as_deref(), Some("STAR:1,0,0"));
        assert!(levels.code(3).is_none());
    }

    #[test]
    fn test_failure_truncates_list() {
        let mut src = Flaky {
            inner: MemorySource::new()
                .with_level(1, "STAR:0,0,0")
                .with_level(2, "STAR:1,0,0")
                .with_level(3, "STAR:2,0,0"),
            fail_at: 2,
        };
        assert_eq!(load_level_list(&mut src).fetched_len(), Some(1));
    }

    #[test]
    fn test_empty_source_uses_builtin() {
        let levels = load_level_list(&mut MemorySource::new());
        assert!(levels.is_builtin());
        assert_eq!(levels.code(1), Some(default_level_code()));
        assert_eq!(levels.code(4), Some(encode(&default_level(4))));
        assert!(levels.code(0).is_none());
    }

    #[test]
    fn test_directory_source_missing_dir() {
        let mut src = DirectorySource::new("/definitely/not/a/real/levels/dir");
        assert!(matches!(src.fetch(1), Err(LevelFetchError::NotFound(1))));
    }
}
