//! The extraction pipeline.

use std::io;
use std::path::{Path, PathBuf};

use nvserve_core::paths::{APPIMAGE_NAME, ENTRY_POINT, EXTRACTED_DIR, NEOVIM_BINARY, STAGING_DIR};
use nvserve_core::{CommandExecutor, Step};
use tokio::fs;
use tracing::{debug, info};

use super::error::{InstallError, InstallResult};

/// Paths involved in one installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    pub root: PathBuf,
    pub bin_dir: PathBuf,
}

impl InstallLayout {
    pub fn new(root: impl Into<PathBuf>, bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            bin_dir: bin_dir.into(),
        }
    }

    /// `<root>/nvim.appimage`
    pub fn artifact(&self) -> PathBuf {
        self.root.join(APPIMAGE_NAME)
    }

    /// `<root>/.staging`
    pub fn staging(&self) -> PathBuf {
        self.root.join(STAGING_DIR)
    }

    /// `<root>/squashfs-root`
    pub fn extracted(&self) -> PathBuf {
        self.root.join(EXTRACTED_DIR)
    }

    /// `<root>/squashfs-root/AppRun`
    pub fn entry_point(&self) -> PathBuf {
        self.extracted().join(ENTRY_POINT)
    }

    /// `<bin_dir>/nvim`
    pub fn link(&self) -> PathBuf {
        self.bin_dir.join(NEOVIM_BINARY)
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// The five ordered commands that turn the downloaded AppImage into a
/// linked, extracted tree.
pub fn extraction_steps(layout: &InstallLayout) -> Vec<Step> {
    let artifact = display(&layout.artifact());
    let staged = display(&layout.staging().join(EXTRACTED_DIR));

    vec![
        Step::new("make executable", ["chmod", "u+x", artifact.as_str()]),
        Step::new("extract", [artifact.as_str(), "--appimage-extract"]).in_dir(layout.staging()),
        Step::new("remove artifact", ["rm", artifact.as_str()]),
        Step::new(
            "move tree",
            ["mv".to_string(), staged, display(&layout.root)],
        ),
        Step::new(
            "link binary",
            [
                "ln".to_string(),
                "-sf".to_string(),
                display(&layout.entry_point()),
                display(&layout.link()),
            ],
        ),
    ]
}

/// Clear leftovers from an interrupted run and create an empty staging dir.
pub async fn prepare(layout: &InstallLayout) -> InstallResult<()> {
    for dir in [layout.extracted(), layout.staging()] {
        remove_dir_if_present(&dir).await?;
    }

    let staging = layout.staging();
    fs::create_dir_all(&staging)
        .await
        .map_err(|source| InstallError::Prepare {
            path: staging.clone(),
            source,
        })
}

/// Run every step in order; the first failure aborts.
///
/// Completed steps are not rolled back. The staging directory is removed
/// once all steps succeeded.
pub async fn run_pipeline<E>(executor: &E, layout: &InstallLayout) -> InstallResult<()>
where
    E: CommandExecutor + ?Sized,
{
    let steps = extraction_steps(layout);
    let total = steps.len();

    for (index, step) in steps.into_iter().enumerate() {
        info!(step = %step.description, "Install step {}/{total}", index + 1);
        executor
            .run(&step)
            .await
            .map_err(|source| InstallError::Step {
                step: step.description.clone(),
                source,
            })?;
    }

    remove_dir_if_present(&layout.staging()).await?;
    debug!(root = %layout.root.display(), "Extraction pipeline finished");
    Ok(())
}

async fn remove_dir_if_present(dir: &Path) -> InstallResult<()> {
    match fs::remove_dir_all(dir).await {
        Ok(()) => {
            debug!(dir = %dir.display(), "Removed leftover directory");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(InstallError::Prepare {
            path: dir.to_path_buf(),
            source,
        }),
    }
}
