//! Install-root layout.
//!
//! ```text
//! <home>/nvim/
//!   nvim.appimage          (downloaded, removed after extraction)
//!   .staging/              (extraction scratch space)
//!   squashfs-root/AppRun   (entry point)
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use super::error::PathError;

/// Directory under the home directory holding the extracted tree.
pub const INSTALL_DIR_NAME: &str = "nvim";
/// Executable name looked up on `PATH`.
pub const NEOVIM_BINARY: &str = "nvim";
/// File name of the downloaded artifact.
pub const APPIMAGE_NAME: &str = "nvim.appimage";
/// Directory the AppImage extracts itself into.
pub const EXTRACTED_DIR: &str = "squashfs-root";
/// Entry point inside the extracted tree.
pub const ENTRY_POINT: &str = "AppRun";
/// Scratch directory used as the working directory for extraction.
pub const STAGING_DIR: &str = ".staging";
/// System binary directory receiving the `nvim` symlink.
pub const DEFAULT_BIN_DIR: &str = "/usr/bin";

/// `<home>/nvim`
pub fn install_root(home: &Path) -> PathBuf {
    home.join(INSTALL_DIR_NAME)
}

/// Create `dir` (and parents) if missing.
///
/// A freshly created directory gets mode `0777` regardless of umask, since
/// the launched server may run as a different user than the installer.
pub fn ensure_install_root(dir: &Path) -> Result<(), PathError> {
    if dir.exists() {
        if !dir.is_dir() {
            return Err(PathError::NotADirectory(dir.to_path_buf()));
        }
        return Ok(());
    }

    let create_failed = |e: std::io::Error| PathError::CreateFailed {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    };

    fs::create_dir_all(dir).map_err(create_failed)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o777)).map_err(create_failed)?;
    }

    Ok(())
}
