//! Terminate a detached process by PID (no Child handle available).

use std::io;

#[cfg(unix)]
use std::thread::sleep;
#[cfg(unix)]
use std::time::Duration;

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;
use tracing::debug;

/// Poll interval and attempts per phase (2 seconds each).
#[cfg(unix)]
const POLL_INTERVAL: Duration = Duration::from_millis(100);
#[cfg(unix)]
const POLL_ATTEMPTS: u32 = 20;

/// Terminate a process with SIGTERM → SIGKILL escalation.
///
/// # Strategy
/// 1. Send SIGTERM
/// 2. Poll for up to 2 seconds to verify process exit
/// 3. If still alive, send SIGKILL
/// 4. Poll again for up to 2 seconds
///
/// The process was detached, so it **cannot be reaped** here; exit is
/// detected through the null signal and zombie state.
///
/// # Returns
/// - `Ok(())` if the process was killed or already gone
/// - `Err` if signalling fails for any reason other than ESRCH
#[cfg(unix)]
pub fn terminate_pid(pid: u32) -> io::Result<()> {
    let raw = i32::try_from(pid)
        .ok()
        .filter(|raw| *raw > 0)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("invalid pid {pid}")))?;
    let nix_pid = Pid::from_raw(raw);

    for (phase, sig) in [Signal::SIGTERM, Signal::SIGKILL].into_iter().enumerate() {
        match signal::kill(nix_pid, sig) {
            Ok(()) => {}
            Err(Errno::ESRCH) => return Ok(()),
            Err(e) => return Err(io::Error::other(e)),
        }
        debug!(pid, signal = ?sig, phase, "Signalled process");

        for _ in 0..POLL_ATTEMPTS {
            sleep(POLL_INTERVAL);
            if !super::verify::pid_exists(pid) || is_zombie(pid) {
                return Ok(());
            }
        }
    }

    Err(io::Error::new(
        io::ErrorKind::TimedOut,
        format!("process {pid} did not exit after SIGKILL"),
    ))
}

#[cfg(not(unix))]
pub fn terminate_pid(pid: u32) -> io::Result<()> {
    use sysinfo::{Pid, ProcessesToUpdate, System};

    let mut sys = System::new();
    let sys_pid = Pid::from_u32(pid);
    sys.refresh_processes(ProcessesToUpdate::Some(&[sys_pid]), true);
    match sys.process(sys_pid) {
        Some(process) => {
            debug!(pid, "Killing process");
            if process.kill() {
                Ok(())
            } else {
                Err(io::Error::other(format!("failed to kill process {pid}")))
            }
        }
        None => Ok(()),
    }
}

#[cfg(unix)]
fn is_zombie(pid: u32) -> bool {
    use sysinfo::{Pid as SysPid, ProcessStatus, ProcessesToUpdate, System};

    let mut sys = System::new();
    let sys_pid = SysPid::from_u32(pid);
    sys.refresh_processes(ProcessesToUpdate::Some(&[sys_pid]), true);
    sys.process(sys_pid)
        .is_some_and(|p| matches!(p.status(), ProcessStatus::Zombie | ProcessStatus::Dead))
}
