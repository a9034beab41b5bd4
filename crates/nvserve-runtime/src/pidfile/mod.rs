//! Lock record storage.
//!
//! Provides the PID-file store used in production and an in-memory store
//! with the same exclusion semantics for tests and embedding.
//!
//! # Safety guarantees
//! - Atomic writes via temp file + rename
//! - Every probe/publish/clear happens under an exclusive advisory lock
//! - Unparsable records are reported as corrupt, never as live

mod io;
mod memory;

pub use io::PidFileStore;
pub use memory::MemoryLockStore;
