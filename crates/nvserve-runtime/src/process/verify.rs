//! Process verification for lock records.

use nvserve_core::LockRecord;
use sysinfo::{Pid, ProcessStatus, ProcessesToUpdate, System};

/// A process that started this many seconds after its record was written
/// cannot be the one the record describes.
const START_TIME_SLACK_SECS: i64 = 5;

/// Check if a PID exists (without verifying it's our process).
///
/// Uses `kill` with null signal which doesn't send a signal but checks existence.
#[cfg(unix)]
pub fn pid_exists(pid: u32) -> bool {
    use nix::sys::signal;
    use nix::unistd::Pid as NixPid;

    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    if raw <= 0 {
        return false;
    }

    // Signal None is a special "null signal" that checks if we can signal the process
    match signal::kill(NixPid::from_raw(raw), None) {
        Ok(()) => true,
        Err(nix::errno::Errno::ESRCH) => false, // No such process
        Err(_) => true,                         // Process exists but we lack permission
    }
}

#[cfg(not(unix))]
pub fn pid_exists(pid: u32) -> bool {
    let mut sys = System::new();
    let pid = Pid::from_u32(pid);
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    sys.process(pid).is_some()
}

/// Check whether the process a record points at is still the live instance.
///
/// # Rules
/// - PID gone → not live
/// - Zombie (exited, not yet reaped) → not live
/// - Started well after the record was written → reused PID, not live
/// - Process exists but cannot be inspected → live (conservative: never
///   double-launch on incomplete information)
pub fn record_is_live(record: &LockRecord) -> bool {
    if !pid_exists(record.pid) {
        return false;
    }

    let mut sys = System::new();
    let pid = Pid::from_u32(record.pid);
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

    let Some(process) = sys.process(pid) else {
        return true;
    };

    if matches!(process.status(), ProcessStatus::Zombie | ProcessStatus::Dead) {
        return false;
    }

    let started = i64::try_from(process.start_time()).unwrap_or(i64::MAX);
    started <= record.started_at.saturating_add(START_TIME_SLACK_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use nvserve_core::{LaunchSpec, LockName};

    fn record_for(pid: u32, started_at: i64) -> LockRecord {
        let mut record = LockRecord::for_launch(
            LockName::new("neovim.pid").unwrap(),
            pid,
            &LaunchSpec::new("sh"),
        );
        record.started_at = started_at;
        record
    }

    #[test]
    #[cfg(unix)]
    fn test_pid_exists_for_self() {
        let self_pid = std::process::id();
        assert!(pid_exists(self_pid));
    }

    #[test]
    #[cfg(unix)]
    fn test_pid_exists_false_for_impossible_pid() {
        assert!(!pid_exists(999_999_999));
    }

    #[test]
    fn test_record_for_self_is_live() {
        let record = record_for(std::process::id(), Utc::now().timestamp());
        assert!(record_is_live(&record));
    }

    #[test]
    fn test_record_older_than_process_is_reused_pid() {
        // The test process started long after the epoch
        let record = record_for(std::process::id(), 0);
        assert!(!record_is_live(&record));
    }

    #[test]
    #[cfg(unix)]
    fn test_exited_child_is_not_live() {
        let mut child = std::process::Command::new("true").spawn().unwrap();
        let pid = child.id();
        let record = record_for(pid, Utc::now().timestamp());

        // Unreaped zombie first, then fully gone
        std::thread::sleep(std::time::Duration::from_millis(200));
        assert!(!record_is_live(&record));
        child.wait().unwrap();
        assert!(!record_is_live(&record));
    }
}
