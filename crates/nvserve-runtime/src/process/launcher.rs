//! Detached process launcher.

use std::io;
use std::process::{Command, Stdio};
use std::thread;

use nvserve_core::{LaunchSpec, LockRecord, ProcessLauncher};
use tracing::{debug, warn};

use super::shutdown::terminate_pid;
use super::verify::record_is_live;

/// Launches processes detached from the caller.
///
/// The child gets its own process group and null stdio so it survives the
/// invoking tool and its terminal. No handle is kept: a background thread
/// reaps the child if it exits while the launcher's process is still alive.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsProcessLauncher;

impl OsProcessLauncher {
    pub const fn new() -> Self {
        Self
    }
}

impl ProcessLauncher for OsProcessLauncher {
    fn launch(&self, spec: &LaunchSpec) -> io::Result<u32> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        if let Some(dir) = &spec.working_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &spec.env {
            cmd.env(key, value);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let mut child = cmd.spawn()?;
        let pid = child.id();
        debug!(pid, program = %spec.program, "Spawned detached process");

        let reaper = thread::Builder::new()
            .name(format!("reap-{pid}"))
            .spawn(move || {
                if let Ok(status) = child.wait() {
                    debug!(pid, %status, "Detached process exited");
                }
            });
        if let Err(e) = reaper {
            warn!(pid, "Failed to start reaper thread: {e}");
        }

        Ok(pid)
    }

    fn is_alive(&self, record: &LockRecord) -> bool {
        record_is_live(record)
    }

    fn terminate(&self, pid: u32) -> io::Result<()> {
        terminate_pid(pid)
    }
}
