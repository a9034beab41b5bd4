//! Core domain types and port definitions for nvserve.
//!
//! Everything here is pure: option resolution, server configuration, lock
//! records and the traits that runtime adapters implement. No process,
//! network or lock-file I/O lives in this crate.

#![deny(unsafe_code)]

pub mod config;
pub mod instance;
pub mod launch;
pub mod options;
pub mod paths;
pub mod ports;

// Re-export commonly used types for convenience
pub use config::{ConfigError, DEFAULT_BIND_HOST, DEFAULT_NEOVIM_PORT, ServerConfig};
pub use instance::{
    EnsureOutcome, InstanceStatus, LockName, LockNameError, LockProbe, LockRecord,
    NEOVIM_LOCK_NAME,
};
pub use launch::{LaunchSpec, LaunchStrategy};
pub use options::{
    BIND_ADDRESS_OPTION, CONFIG_DIRECTORY_OPTION, FORWARD_PORTS_OPTION, NEOVIM_OPTIONS,
    OPEN_OPTION, OptionError, OptionSpec, OptionValues, VERSION_OPTION,
};
pub use ports::{
    AccountError, ArtifactFetcher, CommandExecutor, ExecError, FetchError, LockGuard, LockStore,
    LockStoreError, ProcessLauncher, Step, UserAccounts,
};

// Re-export path utilities
pub use paths::{
    DEFAULT_BIN_DIR, INSTALL_DIR_NAME, NEOVIM_BINARY, PathError, install_root, lock_dir,
};
