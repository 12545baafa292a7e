//! Artifact downloader adapter

use std::path::Path;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::application::ports::{ArtifactDownloader, DownloadError};

/// Streams an artifact URL to a local file
#[derive(Debug, Clone, Default)]
pub struct HttpDownloader {
    http: reqwest::Client,
}

impl HttpDownloader {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ArtifactDownloader for HttpDownloader {
    async fn download(&self, url: &str, destination: &Path) -> Result<u64, DownloadError> {
        let write_failed = |e: std::io::Error| DownloadError::WriteFailed {
            path: destination.to_path_buf(),
            message: e.to_string(),
        };

        let mut response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::RequestFailed(e.to_string()))?;
        if !response.status().is_success() {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
        }

        // Partial downloads stay under a .part name until complete
        let partial = destination.with_extension("part");
        let written = async {
            let mut file = tokio::fs::File::create(&partial).await.map_err(write_failed)?;
            let mut written = 0u64;
            while let Some(chunk) = response
                .chunk()
                .await
                .map_err(|e| DownloadError::RequestFailed(e.to_string()))?
            {
                file.write_all(&chunk).await.map_err(write_failed)?;
                written += chunk.len() as u64;
            }
            file.flush().await.map_err(write_failed)?;
            drop(file);

            tokio::fs::rename(&partial, destination)
                .await
                .map_err(write_failed)?;
            Ok::<u64, DownloadError>(written)
        }
        .await;

        let written = match written {
            Ok(written) => written,
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                    if cleanup.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!(path = %partial.display(), error = %cleanup, "failed to remove partial download");
                    }
                }
                return Err(e);
            }
        };
        tracing::debug!(url, bytes = written, path = %destination.display(), "download complete");
        Ok(written)
    }
}
