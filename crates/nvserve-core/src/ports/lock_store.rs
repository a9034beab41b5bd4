//! Persistence and mutual exclusion for lock records.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::instance::{LockName, LockProbe, LockRecord};

/// Errors raised by a lock store.
#[derive(Debug, Error)]
pub enum LockStoreError {
    /// Exclusive access could not be obtained (permissions, missing directory).
    #[error("Cannot acquire lock for {target}: {source}")]
    Unavailable {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("Cannot read lock record {target}: {source}")]
    Read {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write lock record {target}: {source}")]
    Write {
        target: String,
        #[source]
        source: io::Error,
    },
}

/// Proof of exclusive access to one lock name.
///
/// Access is released when the guard is dropped.
pub struct LockGuard {
    name: LockName,
    _held: Box<dyn Send>,
}

impl LockGuard {
    /// Wrap whatever keeps the lock held (a locked file, a registry entry).
    pub fn new(name: LockName, held: impl Send + 'static) -> Self {
        Self {
            name,
            _held: Box::new(held),
        }
    }

    pub const fn name(&self) -> &LockName {
        &self.name
    }
}

impl fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockGuard")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Storage for lock records, serialized by an exclusive acquisition primitive.
///
/// Implementations must make `publish` all-or-nothing: a reader never sees a
/// partially written record.
pub trait LockStore: Send + Sync {
    /// Block until exclusive access to `name` is held.
    fn acquire(&self, name: &LockName) -> Result<LockGuard, LockStoreError>;

    /// Read the current record for the guarded name.
    fn probe(&self, guard: &LockGuard) -> Result<LockProbe, LockStoreError>;

    /// Replace the record for the guarded name.
    fn publish(&self, guard: &LockGuard, record: &LockRecord) -> Result<(), LockStoreError>;

    /// Remove the record for the guarded name. Missing records are fine.
    fn clear(&self, guard: &LockGuard) -> Result<(), LockStoreError>;
}
