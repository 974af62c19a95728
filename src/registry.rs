//! Collection Registry
//!
//! Process-wide map from collection name to the lock that serializes every
//! operation on that collection. Entries are created on first use and never
//! removed, so a collection that is dropped and later re-created is still
//! guarded by the same lock.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// Lock guarding one collection's load → mutate → persist cycle
pub type CollectionLock = Arc<Mutex<()>>;

/// Registry of per-collection locks
///
/// ## Concurrency:
/// - The map itself sits behind a single Mutex, held only for the
///   get-or-insert, never while a collection lock is held
/// - Callers lock the returned `CollectionLock` themselves
#[derive(Default)]
pub struct Registry {
    locks: Mutex<HashMap<String, CollectionLock>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the lock for `name`, creating it on first reference
    pub fn lock_for(&self, name: &str) -> CollectionLock {
        let mut locks = self.locks.lock();

        if let Some(lock) = locks.get(name) {
            return Arc::clone(lock);
        }

        tracing::trace!("Registering lock for collection '{}'", name);
        let lock = Arc::new(Mutex::new(()));
        locks.insert(name.to_string(), Arc::clone(&lock));
        lock
    }

    /// Whether a lock has ever been created for `name`
    pub fn contains(&self, name: &str) -> bool {
        self.locks.lock().contains_key(name)
    }

    /// Number of registered collection names
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }
}
