//! Installer errors.

use std::io;
use std::path::PathBuf;

use nvserve_core::{AccountError, ExecError, FetchError, OptionError, PathError};
use thiserror::Error;

/// Failures while provisioning the Neovim binary.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Cannot resolve install location: {0}")]
    Home(#[source] AccountError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Option(#[from] OptionError),

    #[error("Download failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Install step '{step}' failed: {source}")]
    Step {
        step: String,
        #[source]
        source: ExecError,
    },

    #[error("Failed to hand {path} over to '{user}': {source}")]
    Chown {
        path: PathBuf,
        user: String,
        #[source]
        source: AccountError,
    },

    #[error("Failed to prepare {path}: {source}")]
    Prepare {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type InstallResult<T> = Result<T, InstallError>;
