//! Hand-written port fakes.

#![allow(dead_code)]

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use nvserve_core::{
    AccountError, CommandExecutor, ExecError, LaunchSpec, LockRecord, ProcessLauncher, Step,
    UserAccounts,
};

/// Launcher that hands out increasing fake PIDs and remembers them as alive.
#[derive(Debug)]
pub struct CountingLauncher {
    next_pid: AtomicU32,
    launches: AtomicU32,
    alive: Mutex<HashSet<u32>>,
    specs: Mutex<Vec<LaunchSpec>>,
    /// Simulated spawn latency, widening the race window.
    delay: Duration,
}

impl CountingLauncher {
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            next_pid: AtomicU32::new(10_000),
            launches: AtomicU32::new(0),
            alive: Mutex::new(HashSet::new()),
            specs: Mutex::new(Vec::new()),
            delay,
        }
    }

    pub fn launches(&self) -> u32 {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn specs(&self) -> Vec<LaunchSpec> {
        self.specs.lock().unwrap().clone()
    }

    pub fn kill(&self, pid: u32) {
        self.alive.lock().unwrap().remove(&pid);
    }
}

impl ProcessLauncher for CountingLauncher {
    fn launch(&self, spec: &LaunchSpec) -> io::Result<u32> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        self.launches.fetch_add(1, Ordering::SeqCst);
        self.alive.lock().unwrap().insert(pid);
        self.specs.lock().unwrap().push(spec.clone());
        Ok(pid)
    }

    fn is_alive(&self, record: &LockRecord) -> bool {
        self.alive.lock().unwrap().contains(&record.pid)
    }

    fn terminate(&self, pid: u32) -> io::Result<()> {
        self.kill(pid);
        Ok(())
    }
}

/// Executor that records steps and fakes the effect of the final link step.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    steps: Mutex<Vec<Step>>,
}

impl RecordingExecutor {
    pub fn steps(&self) -> Vec<Step> {
        self.steps.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn run(&self, step: &Step) -> Result<(), ExecError> {
        self.steps.lock().unwrap().push(step.clone());

        if step.program() == Some("ln") {
            let link = Path::new(step.argv.last().ok_or(ExecError::EmptyCommand)?);
            write_executable(link);
        }
        Ok(())
    }
}

/// Accounts rooted in a scratch home directory.
#[derive(Debug)]
pub struct FakeAccounts {
    home: PathBuf,
    chowned: Mutex<Vec<(PathBuf, String)>>,
}

impl FakeAccounts {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            chowned: Mutex::new(Vec::new()),
        }
    }

    pub fn chowned(&self) -> Vec<(PathBuf, String)> {
        self.chowned.lock().unwrap().clone()
    }
}

impl UserAccounts for FakeAccounts {
    fn home_dir(&self, _user: Option<&str>) -> Result<PathBuf, AccountError> {
        Ok(self.home.clone())
    }

    fn chown_recursive(&self, path: &Path, user: &str) -> Result<(), AccountError> {
        self.chowned
            .lock()
            .unwrap()
            .push((path.to_path_buf(), user.to_string()));
        Ok(())
    }
}

/// Accounts for a user without a home directory.
#[derive(Debug, Default)]
pub struct HomelessAccounts;

impl UserAccounts for HomelessAccounts {
    fn home_dir(&self, _user: Option<&str>) -> Result<PathBuf, AccountError> {
        Err(AccountError::NoHomeDir)
    }

    fn chown_recursive(&self, _path: &Path, _user: &str) -> Result<(), AccountError> {
        Ok(())
    }
}

/// Create an executable file, the way `ln -sf` would expose the entry point.
pub fn write_executable(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, "#!/bin/sh\n").unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}
