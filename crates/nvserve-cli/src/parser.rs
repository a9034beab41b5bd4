//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Provision and run a headless Neovim server for remote editing.
#[derive(Debug, Parser)]
#[command(name = "nvserve")]
#[command(about = "Install and supervise a headless Neovim server")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Directory holding the PID record and its lock file
    #[arg(long = "run-dir", env = "NVSERVE_RUN_DIR", global = true)]
    pub run_dir: Option<PathBuf>,

    /// Directory receiving the `nvim` symlink
    #[arg(long = "bin-dir", env = "NVSERVE_BIN_DIR", global = true)]
    pub bin_dir: Option<PathBuf>,

    /// Base URL release downloads are fetched from
    #[arg(long = "download-base", env = "NVSERVE_DOWNLOAD_BASE", global = true)]
    pub download_base: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}
