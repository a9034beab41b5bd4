//! Neovim provisioning.
//!
//! Installation is skipped entirely when `nvim` already resolves on the
//! search path or sits in the binary directory. Otherwise the AppImage for the configured `VERSION` is
//! downloaded into the install root, extracted through a fixed sequence of
//! commands and linked into the binary directory.

mod error;
mod executor;
mod fetch;
mod pipeline;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{env, fmt};

use nvserve_core::paths::{DEFAULT_BIN_DIR, NEOVIM_BINARY, ensure_install_root, install_root};
use nvserve_core::{ArtifactFetcher, CommandExecutor, OptionValues, UserAccounts, VERSION_OPTION};
use tracing::{debug, info};

pub use error::{InstallError, InstallResult};
pub use executor::TokioCommandExecutor;
pub use fetch::{DEFAULT_DOWNLOAD_BASE, HttpArtifactFetcher, download_url};
pub use pipeline::{InstallLayout, extraction_steps};

/// Where artifacts come from and where the binary is linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerConfig {
    /// Scheme and host the release URL is built on.
    pub download_base: String,
    /// Directory receiving the `nvim` symlink.
    pub bin_dir: PathBuf,
    /// Search path for the "already installed" check; `$PATH` when unset.
    /// `bin_dir` is always checked after it.
    pub search_path: Option<OsString>,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            download_base: DEFAULT_DOWNLOAD_BASE.to_string(),
            bin_dir: PathBuf::from(DEFAULT_BIN_DIR),
            search_path: None,
        }
    }
}

/// Result of a successful [`Installer::install`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// `nvim` was already resolvable; nothing was downloaded.
    AlreadyInstalled(PathBuf),
    /// The AppImage was extracted and linked at this path.
    Installed(PathBuf),
}

impl InstallOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::AlreadyInstalled(path) | Self::Installed(path) => path,
        }
    }
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInstalled(path) => write!(f, "already installed at {}", path.display()),
            Self::Installed(path) => write!(f, "installed at {}", path.display()),
        }
    }
}

/// Downloads and unpacks Neovim for a user.
#[derive(Clone)]
pub struct Installer {
    fetcher: Arc<dyn ArtifactFetcher>,
    executor: Arc<dyn CommandExecutor>,
    accounts: Arc<dyn UserAccounts>,
    config: InstallerConfig,
}

impl fmt::Debug for Installer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Installer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Installer {
    pub fn new(
        fetcher: Arc<dyn ArtifactFetcher>,
        executor: Arc<dyn CommandExecutor>,
        accounts: Arc<dyn UserAccounts>,
        config: InstallerConfig,
    ) -> Self {
        Self {
            fetcher,
            executor,
            accounts,
            config,
        }
    }

    pub const fn config(&self) -> &InstallerConfig {
        &self.config
    }

    /// `<home>/nvim` for `user` (or the invoking user), created if missing.
    pub fn prepare_root(&self, user: Option<&str>) -> InstallResult<PathBuf> {
        let root = self.install_root(user)?;
        ensure_install_root(&root)?;
        Ok(root)
    }

    /// `<home>/nvim` for `user` without touching the filesystem.
    pub fn install_root(&self, user: Option<&str>) -> InstallResult<PathBuf> {
        let home = self.accounts.home_dir(user).map_err(InstallError::Home)?;
        Ok(install_root(&home))
    }

    /// Resolve `nvim` on the configured search path, then in the binary
    /// directory, which need not be on `$PATH`.
    pub fn locate_binary(&self) -> Option<PathBuf> {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        let found = match &self.config.search_path {
            Some(paths) => which::which_in(NEOVIM_BINARY, Some(paths), &cwd),
            None => which::which(NEOVIM_BINARY),
        };
        found
            .or_else(|_| {
                which::which_in(NEOVIM_BINARY, Some(self.config.bin_dir.as_os_str()), &cwd)
            })
            .ok()
    }

    /// Make sure `nvim` is available, installing it when it is not.
    ///
    /// When `user` is set the install root is resolved from that user's home
    /// and handed over to them afterwards.
    pub async fn install(
        &self,
        user: Option<&str>,
        options: &OptionValues,
    ) -> InstallResult<InstallOutcome> {
        info!("Checking if Neovim exists");
        let root = self.prepare_root(user)?;

        if let Some(existing) = self.locate_binary() {
            debug!(path = %existing.display(), "Neovim already installed");
            return Ok(InstallOutcome::AlreadyInstalled(existing));
        }

        info!(root = %root.display(), "Installing Neovim");
        let version = options.get(VERSION_OPTION)?;
        let url = download_url(&self.config.download_base, &version);
        let layout = InstallLayout::new(&root, &self.config.bin_dir);

        let bytes = self.fetcher.fetch(&url, &layout.artifact()).await?;
        debug!(bytes, %version, "Fetched Neovim AppImage");

        pipeline::prepare(&layout).await?;
        pipeline::run_pipeline(self.executor.as_ref(), &layout).await?;

        if let Some(user) = user {
            self.accounts
                .chown_recursive(&root, user)
                .map_err(|source| InstallError::Chown {
                    path: root.clone(),
                    user: user.to_string(),
                    source,
                })?;
        }

        info!(link = %layout.link().display(), "Successfully installed Neovim");
        Ok(InstallOutcome::Installed(layout.link()))
    }
}
