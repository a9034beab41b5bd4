//! Lock directory resolution.

use std::env;
use std::ffi::OsStr;
use std::path::PathBuf;

/// Environment variable overriding the lock directory.
pub const RUN_DIR_ENV: &str = "NVSERVE_RUN_DIR";

/// Directory holding lock records.
///
/// Resolution order:
/// 1. `NVSERVE_RUN_DIR` environment variable
/// 2. The OS temporary directory
pub fn lock_dir() -> PathBuf {
    lock_dir_from(env::var_os(RUN_DIR_ENV).as_deref())
}

/// Same as [`lock_dir`] with the override passed in explicitly.
pub fn lock_dir_from(override_dir: Option<&OsStr>) -> PathBuf {
    match override_dir {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => env::temp_dir(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let dir = lock_dir_from(Some(OsStr::new("/run/nvserve")));
        assert_eq!(dir, PathBuf::from("/run/nvserve"));
    }

    #[test]
    fn test_empty_override_falls_back_to_temp_dir() {
        assert_eq!(lock_dir_from(Some(OsStr::new(""))), env::temp_dir());
        assert_eq!(lock_dir_from(None), env::temp_dir());
    }
}
