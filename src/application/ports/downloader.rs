//! Artifact download port interface

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// Download errors
#[derive(Debug, Clone, Error)]
pub enum DownloadError {
    #[error("Download request failed: {0}")]
    RequestFailed(String),

    #[error("Download of {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to write {}: {message}", .path.display())]
    WriteFailed { path: PathBuf, message: String },
}

/// Port for fetching a generated artifact to local storage
#[async_trait]
pub trait ArtifactDownloader: Send + Sync {
    /// Download `url` into `destination`, creating parent directories.
    ///
    /// # Returns
    /// Number of bytes written
    async fn download(&self, url: &str, destination: &Path) -> Result<u64, DownloadError>;
}
