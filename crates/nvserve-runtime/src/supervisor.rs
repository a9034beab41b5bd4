//! Single-instance supervisor.
//!
//! Guarantees at most one live process per lock name. Every decision is
//! taken while holding the store's exclusive lock, so concurrent callers
//! serialize on it and only the first one that finds no live record
//! launches anything.

use std::io;

use nvserve_core::{
    EnsureOutcome, InstanceStatus, LaunchSpec, LockGuard, LockName, LockNameError, LockProbe,
    LockRecord, LockStore, LockStoreError, ProcessLauncher,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Supervisor failures.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("Invalid lock name: {0}")]
    InvalidLockName(#[from] LockNameError),

    #[error("Lock '{name}' is unavailable: {source}")]
    LockUnavailable {
        name: String,
        #[source]
        source: LockStoreError,
    },

    #[error("Failed to launch '{name}': {reason}")]
    Launch { name: String, reason: String },

    #[error("Failed to record instance '{name}': {source}")]
    Record {
        name: String,
        #[source]
        source: LockStoreError,
    },

    #[error("Failed to stop '{name}' (pid {pid}): {source}")]
    Terminate {
        name: String,
        pid: u32,
        #[source]
        source: io::Error,
    },
}

/// What the probe found, after asking the launcher about liveness.
enum Observed {
    Empty,
    Live(LockRecord),
    Stale(Option<LockRecord>),
}

/// Runs at most one process per lock name.
#[derive(Debug, Clone)]
pub struct InstanceSupervisor<S, L> {
    store: S,
    launcher: L,
}

impl<S: LockStore, L: ProcessLauncher> InstanceSupervisor<S, L> {
    pub const fn new(store: S, launcher: L) -> Self {
        Self { store, launcher }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Make sure a process for `lock_name` is running.
    ///
    /// `build` is only called when a launch is needed. A live instance is
    /// reported as [`EnsureOutcome::AlreadyRunning`] and left untouched.
    pub fn ensure_running<F>(
        &self,
        lock_name: &str,
        build: F,
    ) -> Result<EnsureOutcome, SupervisorError>
    where
        F: FnOnce() -> anyhow::Result<LaunchSpec>,
    {
        let name = LockName::new(lock_name)?;
        let guard = self.acquire(&name)?;

        match self.observe(&guard)? {
            Observed::Live(record) => {
                debug!(lock = %name, pid = record.pid, "Instance already running");
                return Ok(EnsureOutcome::AlreadyRunning { pid: record.pid });
            }
            Observed::Stale(Some(record)) => {
                info!(lock = %name, pid = record.pid, "Replacing stale instance record");
            }
            Observed::Stale(None) | Observed::Empty => {}
        }

        let launch_failed = |reason: String| SupervisorError::Launch {
            name: name.to_string(),
            reason,
        };

        let spec = build().map_err(|e| launch_failed(format!("{e:#}")))?;
        let pid = self
            .launcher
            .launch(&spec)
            .map_err(|e| launch_failed(format!("cannot spawn {}: {e}", spec.program)))?;

        let record = LockRecord::for_launch(name.clone(), pid, &spec);
        if let Err(source) = self.store.publish(&guard, &record) {
            warn!(lock = %name, pid, "Record not written, stopping launched process");
            if let Err(e) = self.launcher.terminate(pid) {
                warn!(pid, "Failed to stop unrecorded process: {e}");
            }
            return Err(SupervisorError::Record {
                name: name.to_string(),
                source,
            });
        }

        info!(lock = %name, pid, program = %spec.program, "Instance started");
        Ok(EnsureOutcome::Started { pid })
    }

    /// Current state of the instance for `lock_name`.
    pub fn status(&self, lock_name: &str) -> Result<InstanceStatus, SupervisorError> {
        let name = LockName::new(lock_name)?;
        let guard = self.acquire(&name)?;

        Ok(match self.observe(&guard)? {
            Observed::Empty => InstanceStatus::NotRunning,
            Observed::Live(record) => InstanceStatus::Running(record),
            Observed::Stale(record) => InstanceStatus::Stale {
                pid: record.map(|r| r.pid),
            },
        })
    }

    /// Stop the live instance, if any, and clear its record.
    ///
    /// Returns the PID that was terminated. A stale record is cleared
    /// without signalling anything.
    pub fn stop(&self, lock_name: &str) -> Result<Option<u32>, SupervisorError> {
        let name = LockName::new(lock_name)?;
        let guard = self.acquire(&name)?;

        let stopped = match self.observe(&guard)? {
            Observed::Empty => return Ok(None),
            Observed::Live(record) => {
                self.launcher
                    .terminate(record.pid)
                    .map_err(|source| SupervisorError::Terminate {
                        name: name.to_string(),
                        pid: record.pid,
                        source,
                    })?;
                info!(lock = %name, pid = record.pid, "Instance stopped");
                Some(record.pid)
            }
            Observed::Stale(_) => None,
        };

        self.store
            .clear(&guard)
            .map_err(|source| SupervisorError::Record {
                name: name.to_string(),
                source,
            })?;
        Ok(stopped)
    }

    fn acquire(&self, name: &LockName) -> Result<LockGuard, SupervisorError> {
        self.store
            .acquire(name)
            .map_err(|source| SupervisorError::LockUnavailable {
                name: name.to_string(),
                source,
            })
    }

    fn observe(&self, guard: &LockGuard) -> Result<Observed, SupervisorError> {
        let probe = self
            .store
            .probe(guard)
            .map_err(|source| SupervisorError::LockUnavailable {
                name: guard.name().to_string(),
                source,
            })?;

        Ok(match probe {
            LockProbe::NoRecord => Observed::Empty,
            LockProbe::Corrupt(reason) => {
                warn!(lock = %guard.name(), %reason, "Ignoring unreadable instance record");
                Observed::Stale(None)
            }
            LockProbe::Record(record) if self.launcher.is_alive(&record) => Observed::Live(record),
            LockProbe::Record(record) => Observed::Stale(Some(record)),
        })
    }
}
