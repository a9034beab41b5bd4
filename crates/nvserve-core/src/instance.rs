//! Single-instance domain types: lock names, lock records and outcomes.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::launch::LaunchSpec;

/// Lock name used for the Neovim server.
pub const NEOVIM_LOCK_NAME: &str = "neovim.pid";

/// Rejected lock identifiers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LockNameError {
    #[error("Lock name cannot be empty")]
    Empty,

    #[error("Lock name '{0}' may only contain ASCII letters, digits, '.', '_' and '-'")]
    InvalidCharacters(String),
}

/// Identifier of a mutual-exclusion domain.
///
/// One name allows at most one running process. Names double as file names
/// so they are restricted to a path-safe alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LockName(String);

impl LockName {
    pub fn new(name: impl Into<String>) -> Result<Self, LockNameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(LockNameError::Empty);
        }
        let path_safe = name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !path_safe || name == "." || name == ".." {
            return Err(LockNameError::InvalidCharacters(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LockName {
    type Error = LockNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LockName> for String {
    fn from(name: LockName) -> Self {
        name.0
    }
}

impl fmt::Display for LockName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted marker identifying the running instance for a lock name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    pub pid: u32,
    pub lock_name: LockName,
    pub program: String,
    pub args: Vec<String>,
    /// Unix timestamp (seconds) taken right after the process was spawned.
    pub started_at: i64,
}

impl LockRecord {
    /// Record for a process that was just launched from `spec`.
    pub fn for_launch(lock_name: LockName, pid: u32, spec: &LaunchSpec) -> Self {
        Self {
            pid,
            lock_name,
            program: spec.program.clone(),
            args: spec.args.clone(),
            started_at: Utc::now().timestamp(),
        }
    }
}

/// What a lock store found for a lock name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockProbe {
    NoRecord,
    Record(LockRecord),
    /// A record exists but cannot be parsed.
    Corrupt(String),
}

/// Successful result of ensuring an instance runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EnsureOutcome {
    /// A live instance was found; nothing was launched.
    AlreadyRunning { pid: u32 },
    /// A new process was launched and its record published.
    Started { pid: u32 },
}

impl EnsureOutcome {
    pub const fn pid(&self) -> u32 {
        match self {
            Self::AlreadyRunning { pid } | Self::Started { pid } => *pid,
        }
    }

    pub const fn started(&self) -> bool {
        matches!(self, Self::Started { .. })
    }
}

impl fmt::Display for EnsureOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRunning { pid } => write!(f, "already running (pid {pid})"),
            Self::Started { pid } => write!(f, "started (pid {pid})"),
        }
    }
}

/// Observed state of an instance, for status reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceStatus {
    NotRunning,
    /// A record exists but its process is gone (or the record is unreadable).
    Stale { pid: Option<u32> },
    Running(LockRecord),
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRunning => f.write_str("not running"),
            Self::Stale { pid: Some(pid) } => write!(f, "stale record (pid {pid} is gone)"),
            Self::Stale { pid: None } => f.write_str("stale record (unreadable)"),
            Self::Running(record) => write!(f, "running (pid {})", record.pid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_name_accepts_path_safe_names() {
        assert!(LockName::new(NEOVIM_LOCK_NAME).is_ok());
        assert!(LockName::new("code-server_2").is_ok());
    }

    #[test]
    fn test_lock_name_rejects_empty_and_separators() {
        assert_eq!(LockName::new(""), Err(LockNameError::Empty));
        for bad in ["../etc/passwd", "a/b", "..", "name with space"] {
            assert!(
                matches!(LockName::new(bad), Err(LockNameError::InvalidCharacters(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_record_serialization_validates_lock_name() {
        let json = r#"{"pid":1,"lock_name":"../x","program":"sh","args":[],"started_at":0}"#;
        assert!(serde_json::from_str::<LockRecord>(json).is_err());
    }

    #[test]
    fn test_record_for_launch_copies_command() {
        let spec = LaunchSpec::new("sh").arg("-c").arg("nvim --headless");
        let record = LockRecord::for_launch(LockName::new("neovim.pid").unwrap(), 42, &spec);
        assert_eq!(record.pid, 42);
        assert_eq!(record.program, "sh");
        assert_eq!(record.args, vec!["-c", "nvim --headless"]);
        assert!(record.started_at > 0);
    }

    #[test]
    fn test_outcome_reports_pid_and_kind() {
        assert_eq!(EnsureOutcome::Started { pid: 7 }.pid(), 7);
        assert!(EnsureOutcome::Started { pid: 7 }.started());
        assert!(!EnsureOutcome::AlreadyRunning { pid: 7 }.started());
        assert_eq!(
            EnsureOutcome::AlreadyRunning { pid: 7 }.to_string(),
            "already running (pid 7)"
        );
    }
}
