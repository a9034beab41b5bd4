//! In-memory lock store.
//!
//! Same contract as [`super::PidFileStore`] but scoped to the current
//! process: exclusion is a condition variable instead of a file lock.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use nvserve_core::{LockGuard, LockName, LockProbe, LockRecord, LockStore, LockStoreError};

#[derive(Debug, Clone)]
enum Stored {
    Valid(LockRecord),
    Corrupt(String),
}

#[derive(Debug, Default)]
struct State {
    held: HashSet<LockName>,
    records: HashMap<LockName, Stored>,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<State>,
    released: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases the name on drop and wakes waiters.
struct Held {
    shared: Arc<Shared>,
    name: LockName,
}

impl Drop for Held {
    fn drop(&mut self) {
        self.shared.lock().held.remove(&self.name);
        self.shared.released.notify_all();
    }
}

/// Lock store kept entirely in memory. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryLockStore {
    shared: Arc<Shared>,
}

impl MemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record without going through the lock.
    pub fn insert_record(&self, record: LockRecord) {
        self.shared
            .lock()
            .records
            .insert(record.lock_name.clone(), Stored::Valid(record));
    }

    /// Seed an unparsable record, as left by an interrupted writer.
    pub fn insert_corrupt(&self, name: &LockName, content: impl Into<String>) {
        self.shared
            .lock()
            .records
            .insert(name.clone(), Stored::Corrupt(content.into()));
    }

    /// Current valid record, if any.
    pub fn record(&self, name: &LockName) -> Option<LockRecord> {
        match self.shared.lock().records.get(name) {
            Some(Stored::Valid(record)) => Some(record.clone()),
            _ => None,
        }
    }
}

impl LockStore for MemoryLockStore {
    fn acquire(&self, name: &LockName) -> Result<LockGuard, LockStoreError> {
        let mut state = self.shared.lock();
        while state.held.contains(name) {
            state = self
                .shared
                .released
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.held.insert(name.clone());
        drop(state);

        Ok(LockGuard::new(
            name.clone(),
            Held {
                shared: Arc::clone(&self.shared),
                name: name.clone(),
            },
        ))
    }

    fn probe(&self, guard: &LockGuard) -> Result<LockProbe, LockStoreError> {
        let probe = match self.shared.lock().records.get(guard.name()) {
            None => LockProbe::NoRecord,
            Some(Stored::Valid(record)) => LockProbe::Record(record.clone()),
            Some(Stored::Corrupt(content)) => {
                LockProbe::Corrupt(format!("unparsable record: {content:?}"))
            }
        };
        Ok(probe)
    }

    fn publish(&self, guard: &LockGuard, record: &LockRecord) -> Result<(), LockStoreError> {
        self.shared
            .lock()
            .records
            .insert(guard.name().clone(), Stored::Valid(record.clone()));
        Ok(())
    }

    fn clear(&self, guard: &LockGuard) -> Result<(), LockStoreError> {
        self.shared.lock().records.remove(guard.name());
        Ok(())
    }
}
