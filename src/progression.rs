//! Level progression
//!
//! Persisted as a JSON array of completed level numbers. Level `n` is
//! selectable iff `n <= 1 + max(completed)` (level 1 when nothing is done).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::persistence::{Storage, StorageError, load_json, save_json};

/// Completed levels and the derived unlock frontier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressionTracker {
    completed: BTreeSet<u32>,
}

impl ProgressionTracker {
    /// Storage key
    const STORAGE_KEY: &'static str = "star_drop_completed";

    /// Create an empty record
    pub fn new() -> Self {
        Self {
            completed: BTreeSet::new(),
        }
    }

    /// Highest selectable level (saturates at `u32::MAX`)
    pub fn max_unlocked(&self) -> u32 {
        self.completed.last().map_or(1, |n| n.saturating_add(1))
    }

    /// Levels 1..=max_unlocked can be opened
    pub fn is_selectable(&self, level: u32) -> bool {
        level >= 1 && level <= self.max_unlocked()
    }

    /// Whether `level` has been won at least once
    pub fn is_completed(&self, level: u32) -> bool {
        self.completed.contains(&level)
    }

    /// Completed levels in ascending order
    pub fn completed(&self) -> impl Iterator<Item = u32> + '_ {
        self.completed.iter().copied()
    }

    /// Mark a level complete. Returns true if it was newly added.
    pub fn mark_completed(&mut self, level: u32) -> bool {
        self.completed.insert(level)
    }

    /// Mark a level complete and persist the record
    pub fn complete(&mut self, level: u32, storage: &mut dyn Storage) -> Result<bool, StorageError> {
        let added = self.mark_completed(level);
        self.save(storage)?;
        if added {
            log::info!(
                "Level {} completed, levels unlocked up to {}",
                level,
                self.max_unlocked()
            );
        }
        Ok(added)
    }

    /// Load the record from storage (empty when absent or unreadable)
    pub fn load(storage: &dyn Storage) -> Self {
        match load_json::<ProgressionTracker>(storage, Self::STORAGE_KEY) {
            Ok(Some(record)) => {
                log::info!("Loaded {} completed levels", record.completed.len());
                record
            }
            Ok(None) => {
                log::info!("No progression found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Progression record unreadable ({}), starting fresh", e);
                Self::new()
            }
        }
    }

    pub fn save(&self, storage: &mut dyn Storage) -> Result<(), StorageError> {
        save_json(storage, Self::STORAGE_KEY, self)?;
        log::debug!("Progression saved ({} levels)", self.completed.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use proptest::prelude::*;

    #[test]
    fn test_empty_unlocks_level_one() {
        let p = ProgressionTracker::new();
        assert_eq!(p.max_unlocked(), 1);
        assert!(p.is_selectable(1));
        assert!(!p.is_selectable(2));
        assert!(!p.is_selectable(0));
    }

    #[test]
    fn test_frontier_follows_highest_completed() {
        let mut p = ProgressionTracker::new();
        p.mark_completed(1);
        assert_eq!(p.max_unlocked(), 2);
        p.mark_completed(4);
        assert_eq!(p.max_unlocked(), 5);
        assert!(p.is_selectable(5));
    }

    #[test]
    fn test_complete_is_idempotent_and_persisted() {
        let mut storage = MemoryStorage::new();
        let mut p = ProgressionTracker::new();
        assert!(p.complete(2, &mut storage).unwrap());
        assert!(!p.complete(2, &mut storage).unwrap());
        assert_eq!(p.completed().count(), 1);

        let json = storage.get("star_drop_completed").unwrap().unwrap();
        assert_eq!(json, "[2]");
        assert_eq!(ProgressionTracker::load(&storage), p);
    }

    #[test]
    fn test_load_accepts_unordered_array() {
        let mut storage = MemoryStorage::new();
        storage.set("star_drop_completed", "[3,1,3]").unwrap();
        let p = ProgressionTracker::load(&storage);
        assert_eq!(p.completed().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(p.max_unlocked(), 4);
    }

    #[test]
    fn test_highest_level_number_saturates() {
        let mut storage = MemoryStorage::new();
        storage.set("star_drop_completed", "[4294967295]").unwrap();
        let p = ProgressionTracker::load(&storage);
        assert_eq!(p.max_unlocked(), u32::MAX);
        assert!(p.is_selectable(1));
        assert!(p.is_selectable(u32::MAX));
    }

    proptest! {
        #[test]
        fn prop_max_unlocked_never_decreases(
            levels in proptest::collection::vec(prop_oneof![1u32..50, Just(u32::MAX)], 0..20)
        ) {
            let mut p = ProgressionTracker::new();
            let mut last = p.max_unlocked();
            for n in levels {
                p.mark_completed(n);
                let now = p.max_unlocked();
                prop_assert!(now >= last);
                let mut twice = p.clone();
                twice.mark_completed(n);
                prop_assert_eq!(&twice, &p);
                last = now;
            }
        }
    }
}
