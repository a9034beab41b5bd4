//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where concrete adapters are wired
//! together: the PID-file lock store, the OS process launcher, the HTTP
//! fetcher, the command executor and the system account database.

use std::path::PathBuf;
use std::sync::Arc;

use nvserve_core::paths::{DEFAULT_BIN_DIR, lock_dir};
use nvserve_core::ServerConfig;
use nvserve_runtime::{
    DEFAULT_DOWNLOAD_BASE, HttpArtifactFetcher, InstallerConfig, Installer, InstanceSupervisor,
    NeovimServer, OsProcessLauncher, PidFileStore, SystemAccounts, TokioCommandExecutor,
};
use tracing_subscriber::EnvFilter;

use crate::error::CliError;
use crate::parser::Cli;

/// The server type every command operates on.
pub type CliServer = NeovimServer<PidFileStore, OsProcessLauncher>;

/// Locations resolved from global flags and the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub run_dir: PathBuf,
    pub bin_dir: PathBuf,
    pub download_base: String,
}

impl CliConfig {
    /// Create config with default locations.
    pub fn with_defaults() -> Self {
        Self {
            run_dir: lock_dir(),
            bin_dir: PathBuf::from(DEFAULT_BIN_DIR),
            download_base: DEFAULT_DOWNLOAD_BASE.to_string(),
        }
    }

    /// Apply global flags on top of the defaults.
    pub fn from_cli(cli: &Cli) -> Self {
        let defaults = Self::with_defaults();
        Self {
            run_dir: cli.run_dir.clone().unwrap_or(defaults.run_dir),
            bin_dir: cli.bin_dir.clone().unwrap_or(defaults.bin_dir),
            download_base: cli
                .download_base
                .clone()
                .unwrap_or(defaults.download_base),
        }
    }

    pub fn installer_config(&self) -> InstallerConfig {
        InstallerConfig {
            download_base: self.download_base.clone(),
            bin_dir: self.bin_dir.clone(),
            search_path: None,
        }
    }
}

/// Composed adapters shared by the command handlers.
pub struct CliContext {
    pub config: CliConfig,
    pub installer: Installer,
}

impl CliContext {
    /// Bind a server to `server_config`.
    pub fn server(&self, server_config: ServerConfig) -> CliServer {
        let supervisor = InstanceSupervisor::new(
            PidFileStore::new(&self.config.run_dir),
            OsProcessLauncher::new(),
        );
        NeovimServer::new(server_config, self.installer.clone(), supervisor)
    }

    /// Server with default configuration, for status and stop.
    pub fn default_server(&self) -> CliServer {
        self.server(ServerConfig::with_defaults())
    }
}

/// Bootstrap the CLI application.
pub fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let fetcher = HttpArtifactFetcher::new().map_err(|e| CliError::Network(e.to_string()))?;
    let installer = Installer::new(
        Arc::new(fetcher),
        Arc::new(TokioCommandExecutor::new()),
        Arc::new(SystemAccounts::new()),
        config.installer_config(),
    );

    Ok(CliContext { config, installer })
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`. Logs go
/// to stderr so stdout only carries command output.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
