//! Persistent progress: high score, unlocked levels, completed levels
//!
//! Every fact here is monotonic. Store failures are logged and ignored: the
//! in-memory copy stays authoritative for the rest of the process.

use std::collections::BTreeSet;

use super::store::KeyValueStore;
use crate::consts::LEVEL_COUNT;
use crate::error::GameError;

pub const HIGH_SCORE_KEY: &str = "arnabHighScore";
pub const UNLOCKED_LEVELS_KEY: &str = "unlockedLevels";

/// Storage key for a level's completion flag
pub fn completed_key(level: u32) -> String {
    format!("level{level}Completed")
}

/// Persistent progress backed by a key/value store
pub struct Progress {
    store: Box<dyn KeyValueStore>,
    high_score: u64,
    unlocked: BTreeSet<u32>,
    completed: BTreeSet<u32>,
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress")
            .field("high_score", &self.high_score)
            .field("unlocked", &self.unlocked)
            .field("completed", &self.completed)
            .finish_non_exhaustive()
    }
}

impl Progress {
    /// Load progress, falling back to defaults for anything unreadable
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let high_score = read(store.as_ref(), HIGH_SCORE_KEY, |s| s.trim().parse::<u64>().ok())
            .unwrap_or(0);

        let mut unlocked: BTreeSet<u32> = read(store.as_ref(), UNLOCKED_LEVELS_KEY, |s| {
            serde_json::from_str::<Vec<u32>>(s).ok()
        })
        .unwrap_or_default()
        .into_iter()
        .filter(|l| GameError::check_level(*l).is_ok())
        .collect();
        unlocked.insert(1);

        let completed = (1..=LEVEL_COUNT)
            .filter(|&l| read(store.as_ref(), &completed_key(l), |s| Some(s == "true")) == Some(true))
            .collect();

        log::info!(
            "Loaded progress: high score {}, unlocked {:?}",
            high_score,
            unlocked
        );
        Self {
            store,
            high_score,
            unlocked,
            completed,
        }
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn unlocked_levels(&self) -> &BTreeSet<u32> {
        &self.unlocked
    }

    pub fn is_unlocked(&self, level: u32) -> bool {
        self.unlocked.contains(&level)
    }

    pub fn is_completed(&self, level: u32) -> bool {
        self.completed.contains(&level)
    }

    /// Record a finished run's score. Returns true on a new high score.
    pub fn submit_score(&mut self, score: u64) -> bool {
        if score <= self.high_score {
            return false;
        }
        self.high_score = score;
        log::info!("New high score: {score}");
        self.write(HIGH_SCORE_KEY, &score.to_string());
        true
    }

    /// Add a level to the unlocked set. Returns true if it was newly unlocked.
    pub fn unlock(&mut self, level: u32) -> Result<bool, GameError> {
        let level = GameError::check_level(level)?;
        if !self.unlocked.insert(level) {
            return Ok(false);
        }
        log::info!("Unlocked level {level}");
        let levels: Vec<u32> = self.unlocked.iter().copied().collect();
        match serde_json::to_string(&levels) {
            Ok(json) => self.write(UNLOCKED_LEVELS_KEY, &json),
            Err(e) => log::warn!("Could not encode unlocked levels: {e}"),
        }
        Ok(true)
    }

    /// Mark a level completed. Returns true if it was not completed before.
    pub fn mark_completed(&mut self, level: u32) -> Result<bool, GameError> {
        let level = GameError::check_level(level)?;
        if !self.completed.insert(level) {
            return Ok(false);
        }
        self.write(&completed_key(level), "true");
        Ok(true)
    }

    fn write(&mut self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            log::warn!("Keeping {key} in memory only: {e}");
        }
    }
}

/// Read and decode one key; `None` on absence, store failure, or bad data
fn read<T>(store: &dyn KeyValueStore, key: &str, decode: impl FnOnce(&str) -> Option<T>) -> Option<T> {
    match store.get(key) {
        Ok(Some(raw)) => {
            let value = decode(&raw);
            if value.is_none() {
                log::warn!("Ignoring unreadable {key}: {raw:?}");
            }
            value
        }
        Ok(None) => None,
        Err(e) => {
            log::warn!("Could not read {key}, using default: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::store::MemoryStore;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Store that always fails
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, GameError> {
            Err(GameError::PersistenceUnavailable("disk on fire".into()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), GameError> {
            Err(GameError::PersistenceUnavailable("disk on fire".into()))
        }
    }

    /// Memory store that can be inspected after being boxed
    #[derive(Clone, Default)]
    struct SharedStore(Rc<RefCell<MemoryStore>>);

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>, GameError> {
            self.0.borrow().get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), GameError> {
            self.0.borrow_mut().set(key, value)
        }
    }

    #[test]
    fn test_fresh_progress_defaults() {
        let progress = Progress::load(Box::new(MemoryStore::new()));
        assert_eq!(progress.high_score(), 0);
        assert_eq!(progress.unlocked_levels().iter().copied().collect::<Vec<_>>(), vec![1]);
        assert!(!progress.is_completed(1));
    }

    #[test]
    fn test_broken_store_falls_back() {
        let mut progress = Progress::load(Box::new(BrokenStore));
        assert!(progress.is_unlocked(1));
        assert!(progress.submit_score(100));
        assert_eq!(progress.unlock(2), Ok(true));
        assert!(progress.is_unlocked(2));
        assert_eq!(progress.high_score(), 100);
    }

    #[test]
    fn test_persisted_formats() {
        let shared = SharedStore::default();
        let mut progress = Progress::load(Box::new(shared.clone()));
        progress.submit_score(250);
        progress.unlock(3).unwrap();
        progress.unlock(2).unwrap();
        progress.mark_completed(1).unwrap();

        let store = shared.0.borrow();
        assert_eq!(store.get(HIGH_SCORE_KEY).unwrap().as_deref(), Some("250"));
        assert_eq!(store.get(UNLOCKED_LEVELS_KEY).unwrap().as_deref(), Some("[1,2,3]"));
        assert_eq!(store.get("level1Completed").unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn test_high_score_only_rises() {
        let mut progress = Progress::load(Box::new(MemoryStore::new()));
        assert!(progress.submit_score(300));
        assert!(!progress.submit_score(200));
        assert!(!progress.submit_score(300));
        assert_eq!(progress.high_score(), 300);
    }

    #[test]
    fn test_corrupt_values_ignored() {
        let mut store = MemoryStore::new();
        store.set(HIGH_SCORE_KEY, "lots").unwrap();
        store.set(UNLOCKED_LEVELS_KEY, "{oops").unwrap();
        let progress = Progress::load(Box::new(store));
        assert_eq!(progress.high_score(), 0);
        assert_eq!(progress.unlocked_levels().len(), 1);
    }

    #[test]
    fn test_unlock_rejects_unknown_level() {
        let mut progress = Progress::load(Box::new(MemoryStore::new()));
        assert_eq!(progress.unlock(99), Err(GameError::InvalidLevel(99)));
        assert_eq!(progress.unlocked_levels().len(), 1);
    }

    proptest! {
        #[test]
        fn prop_unlocked_roundtrip_any_order(levels in proptest::collection::vec(1u32..=LEVEL_COUNT, 0..12)) {
            let shared = SharedStore::default();
            let mut progress = Progress::load(Box::new(shared.clone()));
            let mut sizes = vec![progress.unlocked_levels().len()];
            for level in &levels {
                progress.unlock(*level).unwrap();
                sizes.push(progress.unlocked_levels().len());
            }
            prop_assert!(sizes.windows(2).all(|w| w[0] <= w[1]));

            let reloaded = Progress::load(Box::new(shared));
            prop_assert_eq!(reloaded.unlocked_levels(), progress.unlocked_levels());
        }

        #[test]
        fn prop_stored_array_order_irrelevant(mut levels in proptest::collection::vec(1u32..=LEVEL_COUNT, 1..8)) {
            let mut forward = MemoryStore::new();
            forward.set(UNLOCKED_LEVELS_KEY, &serde_json::to_string(&levels).unwrap()).unwrap();
            levels.reverse();
            let mut backward = MemoryStore::new();
            backward.set(UNLOCKED_LEVELS_KEY, &serde_json::to_string(&levels).unwrap()).unwrap();

            let a = Progress::load(Box::new(forward));
            let b = Progress::load(Box::new(backward));
            prop_assert_eq!(a.unlocked_levels(), b.unlocked_levels());
        }
    }
}
