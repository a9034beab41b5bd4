//! Paths command handler.
//!
//! Displays all resolved locations for diagnostics.

use std::fmt;
use std::path::PathBuf;

use nvserve_core::paths::NEOVIM_BINARY;
use nvserve_core::{LockName, NEOVIM_LOCK_NAME, NEOVIM_OPTIONS, VERSION_OPTION};
use nvserve_runtime::{PidFileStore, download_url};

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Every location nvserve reads or writes, resolved once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub run_dir: PathBuf,
    pub lock_record: PathBuf,
    pub install_root: PathBuf,
    pub bin_link: PathBuf,
    pub download_url: String,
}

impl ResolvedPaths {
    pub fn resolve(ctx: &CliContext, user: Option<&str>) -> Result<Self, CliError> {
        let store = PidFileStore::new(&ctx.config.run_dir);
        let lock = LockName::new(NEOVIM_LOCK_NAME)
            .map_err(|e| CliError::General(e.to_string()))?;
        let default_version = NEOVIM_OPTIONS
            .iter()
            .find(|spec| spec.name == VERSION_OPTION)
            .map_or("latest", |spec| spec.default);

        Ok(Self {
            run_dir: ctx.config.run_dir.clone(),
            lock_record: store.record_path(&lock),
            install_root: ctx.installer.install_root(user)?,
            bin_link: ctx.config.bin_dir.join(NEOVIM_BINARY),
            download_url: download_url(&ctx.config.download_base, default_version),
        })
    }
}

impl fmt::Display for ResolvedPaths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "run_dir = {}", self.run_dir.display())?;
        writeln!(f, "lock_record = {}", self.lock_record.display())?;
        writeln!(f, "install_root = {}", self.install_root.display())?;
        writeln!(f, "bin_link = {}", self.bin_link.display())?;
        write!(f, "download_url = {}", self.download_url)
    }
}

/// Execute the paths command.
pub fn execute(ctx: &CliContext, user: Option<&str>) -> Result<(), CliError> {
    let paths = ResolvedPaths::resolve(ctx, user)?;
    println!("{paths}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_key_value_lines() {
        let paths = ResolvedPaths {
            run_dir: PathBuf::from("/tmp"),
            lock_record: PathBuf::from("/tmp/neovim.pid"),
            install_root: PathBuf::from("/home/dev/nvim"),
            bin_link: PathBuf::from("/usr/bin/nvim"),
            download_url: "https://github.com/neovim/neovim/releases/latest/download/nvim.appimage"
                .to_string(),
        };

        let rendered = paths.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "lock_record = /tmp/neovim.pid");
        assert!(lines.iter().all(|l| l.contains(" = ")));
    }
}
