//! Release artifact download over HTTP.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use nvserve_core::{ArtifactFetcher, FetchError};
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Host serving Neovim release assets.
pub const DEFAULT_DOWNLOAD_BASE: &str = "https://github.com";

const USER_AGENT: &str = concat!("nvserve/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// `<base>/neovim/neovim/releases/<version>/download/nvim.appimage`
///
/// The version is substituted verbatim (`latest`, `tag/v0.9.5`).
pub fn download_url(base: &str, version: &str) -> String {
    format!(
        "{}/neovim/neovim/releases/{version}/download/nvim.appimage",
        base.trim_end_matches('/')
    )
}

/// Streams a URL into a file with reqwest.
#[derive(Debug, Clone)]
pub struct HttpArtifactFetcher {
    client: Client,
}

impl HttpArtifactFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| FetchError::Request {
                url: String::new(),
                reason: format!("cannot build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArtifactFetcher for HttpArtifactFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let request_failed = |e: reqwest::Error| FetchError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        };
        let write_failed = |e: std::io::Error| FetchError::Write {
            path: dest.to_path_buf(),
            reason: e.to_string(),
        };

        info!(%url, "Downloading");
        let response = self.client.get(url).send().await.map_err(request_failed)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
        }
        // File::create truncates, so a partial file from an earlier attempt is replaced
        let mut file = File::create(dest).await.map_err(write_failed)?;

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(request_failed)?;
            file.write_all(&chunk).await.map_err(write_failed)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(write_failed)?;

        debug!(%url, bytes = written, dest = %dest.display(), "Download complete");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_url_substitutes_version_verbatim() {
        assert_eq!(
            download_url(DEFAULT_DOWNLOAD_BASE, "latest"),
            "https://github.com/neovim/neovim/releases/latest/download/nvim.appimage"
        );
        assert_eq!(
            download_url("http://127.0.0.1:1234/", "tag/v0.9.5"),
            "http://127.0.0.1:1234/neovim/neovim/releases/tag/v0.9.5/download/nvim.appimage"
        );
    }

    #[tokio::test]
    async fn test_fetch_writes_body_and_truncates_previous_file() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/artifact")
            .with_status(200)
            .with_body("fresh")
            .create_async()
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("nvim.appimage");
        std::fs::write(&dest, "a much longer partial download").unwrap();

        let fetcher = HttpArtifactFetcher::new().unwrap();
        let bytes = fetcher
            .fetch(&format!("{}/artifact", server.url()), &dest)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(bytes, 5);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "fresh");
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("nvim.appimage");
        let err = HttpArtifactFetcher::new()
            .unwrap()
            .fetch(&format!("{}/missing", server.url()), &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert!(!dest.exists(), "nothing is written for a failed request");
    }
}
