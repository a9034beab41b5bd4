//! Artifact download port.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// Download failures.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("Download from {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}

/// Retrieves a URL and persists the body at `dest`.
///
/// `dest` is created or truncated, never appended to, so a retry after an
/// interrupted download starts from a clean file.
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Returns the number of bytes written.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError>;
}
