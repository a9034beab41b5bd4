//! Process launcher port.

use std::io;

use crate::instance::LockRecord;
use crate::launch::LaunchSpec;

/// Starts detached processes and answers liveness questions about them.
pub trait ProcessLauncher: Send + Sync {
    /// Spawn `spec` detached from the caller and return its PID.
    fn launch(&self, spec: &LaunchSpec) -> io::Result<u32>;

    /// Whether the process a record refers to is still running and is
    /// plausibly the one that was launched (not a reused PID).
    fn is_alive(&self, record: &LockRecord) -> bool;

    /// Ask a process to exit. Already-gone processes are not an error.
    fn terminate(&self, pid: u32) -> io::Result<()>;
}
