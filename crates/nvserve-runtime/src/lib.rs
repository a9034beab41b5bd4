//! Process supervision, installation and OS-level concerns for nvserve.
//!
//! Adapters for the `nvserve-core` ports live here, together with the
//! single-instance supervisor, the installer and the [`NeovimServer`]
//! facade that ties them together.

#![deny(unsafe_code)]

mod accounts;
pub mod install;
pub mod pidfile;
pub mod process;
mod server;
mod supervisor;

pub use accounts::SystemAccounts;
pub use install::{
    DEFAULT_DOWNLOAD_BASE, HttpArtifactFetcher, InstallError, InstallOutcome, InstallResult,
    Installer, InstallerConfig, TokioCommandExecutor, download_url,
};
pub use pidfile::{MemoryLockStore, PidFileStore};
pub use process::OsProcessLauncher;
pub use server::{NeovimServer, ServerError, listen_command};
pub use supervisor::{InstanceSupervisor, SupervisorError};
