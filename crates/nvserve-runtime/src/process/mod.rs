//! OS process management: detached launch, liveness checks, termination.

mod launcher;
mod shutdown;
mod verify;

pub use launcher::OsProcessLauncher;
pub use shutdown::terminate_pid;
pub use verify::{pid_exists, record_is_live};
