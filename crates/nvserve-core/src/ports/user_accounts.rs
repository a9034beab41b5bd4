//! User account port: home lookup and ownership changes.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Account lookup and ownership failures.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Unknown user '{0}'")]
    UnknownUser(String),

    #[error("Cannot determine home directory")]
    NoHomeDir,

    #[error("Failed to look up user '{user}': {reason}")]
    Lookup { user: String, reason: String },

    #[error("Failed to change ownership of {path}: {reason}")]
    Chown { path: PathBuf, reason: String },
}

/// Privileged account operations.
pub trait UserAccounts: Send + Sync {
    /// Home directory of `user`, or of the invoking user when `None`.
    fn home_dir(&self, user: Option<&str>) -> Result<PathBuf, AccountError>;

    /// `chown -R user path`
    fn chown_recursive(&self, path: &Path, user: &str) -> Result<(), AccountError>;
}
