//! User database lookups and ownership changes.

use std::path::{Path, PathBuf};

use nvserve_core::{AccountError, UserAccounts};

/// [`UserAccounts`] backed by the system user database.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAccounts;

impl SystemAccounts {
    pub const fn new() -> Self {
        Self
    }
}

impl UserAccounts for SystemAccounts {
    fn home_dir(&self, user: Option<&str>) -> Result<PathBuf, AccountError> {
        match user {
            None => dirs::home_dir().ok_or(AccountError::NoHomeDir),
            Some(name) => lookup_home(name),
        }
    }

    fn chown_recursive(&self, path: &Path, user: &str) -> Result<(), AccountError> {
        chown_tree(path, user)
    }
}

#[cfg(unix)]
fn lookup_user(name: &str) -> Result<nix::unistd::User, AccountError> {
    nix::unistd::User::from_name(name)
        .map_err(|e| AccountError::Lookup {
            user: name.to_string(),
            reason: e.to_string(),
        })?
        .ok_or_else(|| AccountError::UnknownUser(name.to_string()))
}

#[cfg(unix)]
fn lookup_home(name: &str) -> Result<PathBuf, AccountError> {
    let user = lookup_user(name)?;
    if user.dir.as_os_str().is_empty() {
        return Err(AccountError::NoHomeDir);
    }
    Ok(user.dir)
}

#[cfg(not(unix))]
fn lookup_home(name: &str) -> Result<PathBuf, AccountError> {
    Err(AccountError::Lookup {
        user: name.to_string(),
        reason: "user lookup is only supported on unix".to_string(),
    })
}

/// `chown -R user path` without following symlinks.
#[cfg(unix)]
fn chown_tree(root: &Path, user: &str) -> Result<(), AccountError> {
    use nix::unistd::{Gid, Uid, chown};
    use std::fs;

    fn walk(dir: &Path, uid: Uid, gid: Gid) -> Result<(), AccountError> {
        let entries = fs::read_dir(dir).map_err(|e| chown_failed(dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| chown_failed(dir, e))?.path();
            let meta = fs::symlink_metadata(&path).map_err(|e| chown_failed(&path, e))?;
            if meta.file_type().is_symlink() {
                continue;
            }
            chown(&path, Some(uid), Some(gid)).map_err(|e| chown_failed(&path, e))?;
            if meta.is_dir() {
                walk(&path, uid, gid)?;
            }
        }
        Ok(())
    }

    let account = lookup_user(user)?;
    chown(root, Some(account.uid), Some(account.gid)).map_err(|e| chown_failed(root, e))?;

    let meta = fs::symlink_metadata(root).map_err(|e| chown_failed(root, e))?;
    if meta.is_dir() {
        walk(root, account.uid, account.gid)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn chown_tree(root: &Path, _user: &str) -> Result<(), AccountError> {
    Err(chown_failed(root, "ownership changes are only supported on unix"))
}

fn chown_failed(path: &Path, reason: impl ToString) -> AccountError {
    AccountError::Chown {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
