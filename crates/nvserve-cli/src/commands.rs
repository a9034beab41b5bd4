//! Subcommands and their shared argument groups.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use nvserve_core::{OptionValues, ServerConfig};

use crate::error::CliError;

/// Who the server is installed and run for, and its option values.
#[derive(Debug, Clone, Default, Args)]
pub struct TargetArgs {
    /// Install and run as this user (home lookup, ownership, `su`)
    #[arg(short, long, env = "NVSERVE_USER")]
    pub user: Option<String>,

    /// Option value as KEY=VALUE (see `nvserve options`), repeatable
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,
}

/// Listener settings on top of [`TargetArgs`].
#[derive(Debug, Clone, Default, Args)]
pub struct ServerArgs {
    /// Host to listen on (falls back to BIND_ADDRESS, then 0.0.0.0)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (falls back to BIND_ADDRESS, then 9251)
    #[arg(short, long)]
    pub port: Option<String>,

    #[command(flatten)]
    pub target: TargetArgs,
}

impl TargetArgs {
    /// Resolve into a server configuration with default listener settings.
    pub fn resolve(&self) -> Result<ServerConfig, CliError> {
        ServerArgs {
            host: None,
            port: None,
            target: self.clone(),
        }
        .resolve()
    }
}

impl ServerArgs {
    pub fn resolve(&self) -> Result<ServerConfig, CliError> {
        let options = OptionValues::from_assignments(&self.target.options)?;
        let config = ServerConfig::resolve(
            self.target.user.as_deref(),
            self.host.as_deref(),
            self.port.as_deref(),
            options,
        )?;
        Ok(config)
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download and unpack Neovim unless it is already on PATH
    Install {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Start the headless server for a workspace (at most one instance)
    Start {
        /// Working directory of the server
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,

        /// Do not check for or install Neovim first
        #[arg(long)]
        skip_install: bool,

        #[command(flatten)]
        server: ServerArgs,
    },

    /// Show whether a server instance is running
    Status,

    /// Stop the running server instance
    Stop,

    /// List the supported options and their defaults
    Options {
        /// Print the table as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show resolved lock, install and binary locations
    Paths {
        /// Resolve the install root for this user
        #[arg(short, long, env = "NVSERVE_USER")]
        user: Option<String>,
    },
}
