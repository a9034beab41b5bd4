//! Path utilities for nvserve install and runtime locations.
//!
//! This module provides the canonical path resolution for all nvserve components:
//! - Lock/PID record directory
//! - Per-user install root and the files inside it
//! - System binary directory the entry point is linked into
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - Home directories are resolved by the `UserAccounts` port, not here

mod error;
mod install;
mod runtime;

pub use error::PathError;

pub use install::{
    APPIMAGE_NAME, DEFAULT_BIN_DIR, ENTRY_POINT, EXTRACTED_DIR, INSTALL_DIR_NAME, NEOVIM_BINARY,
    STAGING_DIR, ensure_install_root, install_root,
};
pub use runtime::{RUN_DIR_ENV, lock_dir, lock_dir_from};
