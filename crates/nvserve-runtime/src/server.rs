//! The Neovim server facade.

use std::path::{Path, PathBuf};

use anyhow::ensure;
use nvserve_core::{
    CONFIG_DIRECTORY_OPTION, ConfigError, EnsureOutcome, InstanceStatus, LaunchSpec, LockStore,
    NEOVIM_LOCK_NAME, OptionError, ProcessLauncher, ServerConfig,
};
use thiserror::Error;
use tracing::info;

use crate::install::{InstallError, InstallOutcome, Installer};
use crate::supervisor::{InstanceSupervisor, SupervisorError};

/// Facade failures.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Install(#[from] InstallError),

    #[error(transparent)]
    Supervisor(#[from] SupervisorError),
}

impl From<OptionError> for ServerError {
    fn from(err: OptionError) -> Self {
        Self::Config(ConfigError::from(err))
    }
}

/// `nvim --listen <host>:<port> --headless`
pub fn listen_command(config: &ServerConfig) -> String {
    format!("nvim --listen {} --headless", config.listen_address())
}

/// Installs and starts one headless Neovim bound to a configuration.
#[derive(Debug)]
pub struct NeovimServer<S, L> {
    config: ServerConfig,
    installer: Installer,
    supervisor: InstanceSupervisor<S, L>,
}

impl<S: LockStore, L: ProcessLauncher> NeovimServer<S, L> {
    pub const fn new(
        config: ServerConfig,
        installer: Installer,
        supervisor: InstanceSupervisor<S, L>,
    ) -> Self {
        Self {
            config,
            installer,
            supervisor,
        }
    }

    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub const fn supervisor(&self) -> &InstanceSupervisor<S, L> {
        &self.supervisor
    }

    /// `host:port` the server listens on.
    pub fn listen_address(&self) -> String {
        self.config.listen_address()
    }

    /// Install Neovim for the configured user if it is missing.
    pub async fn install(&self) -> Result<InstallOutcome, ServerError> {
        let outcome = self
            .installer
            .install(self.config.user(), self.config.options())
            .await?;
        Ok(outcome)
    }

    /// Start the server in `workspace`, unless one is already running.
    pub fn start(&self, workspace: &Path) -> Result<EnsureOutcome, ServerError> {
        self.installer.prepare_root(self.config.user())?;

        // Only built once the lock is held and no instance is alive
        let outcome = self.supervisor.ensure_running(NEOVIM_LOCK_NAME, || {
            ensure!(
                workspace.is_dir(),
                "workspace {} is not a directory",
                workspace.display()
            );
            let spec = self.launch_spec(workspace)?;
            info!(workspace = %workspace.display(), "Starting Neovim in background");
            Ok(spec)
        })?;

        Ok(outcome)
    }

    /// State of the running server, if any.
    pub fn status(&self) -> Result<InstanceStatus, ServerError> {
        Ok(self.supervisor.status(NEOVIM_LOCK_NAME)?)
    }

    /// Stop the running server. Returns the terminated PID.
    pub fn stop(&self) -> Result<Option<u32>, ServerError> {
        Ok(self.supervisor.stop(NEOVIM_LOCK_NAME)?)
    }

    /// The command the supervisor launches for `workspace`.
    pub fn launch_spec(&self, workspace: &Path) -> Result<LaunchSpec, ServerError> {
        let mut spec = self
            .config
            .launch_strategy()
            .wrap(listen_command(&self.config))
            .current_dir(workspace);

        let config_dir = self.config.option(CONFIG_DIRECTORY_OPTION)?;
        if !config_dir.is_empty() {
            spec = spec.env("XDG_CONFIG_HOME", config_dir);
        }
        Ok(spec)
    }

    /// Install root for the configured user.
    pub fn install_root(&self) -> Result<PathBuf, ServerError> {
        Ok(self.installer.install_root(self.config.user())?)
    }
}
