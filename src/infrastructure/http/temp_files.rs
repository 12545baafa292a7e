//! Temp file API adapter

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use uuid::Uuid;

use crate::application::ports::{ApiError, TempFileApi};
use crate::domain::config::ServiceCredentials;
use crate::domain::content::MAX_CONTENT_FILE_SIZE;
use crate::domain::generation::{Page, PageQuery};
use crate::domain::temp_file::TempFile;

use super::resource_client::ResourceClient;

const SEGMENT: &str = "tempfiles";

/// HTTP implementation of [`TempFileApi`]
#[derive(Debug, Clone)]
pub struct HttpTempFileApi {
    client: ResourceClient<TempFile>,
}

impl HttpTempFileApi {
    pub fn new(http: reqwest::Client, credentials: &ServiceCredentials) -> Result<Self, ApiError> {
        Ok(Self {
            client: ResourceClient::new(http, credentials, SEGMENT)?,
        })
    }
}

#[async_trait]
impl TempFileApi for HttpTempFileApi {
    async fn upload(
        &self,
        path: &Path,
        expires_after_mins: Option<u32>,
    ) -> Result<TempFile, ApiError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|_| ApiError::FileNotFound(path.to_path_buf()))?;
        if !metadata.is_file() {
            return Err(ApiError::FileNotFound(path.to_path_buf()));
        }
        if metadata.len() > MAX_CONTENT_FILE_SIZE {
            return Err(ApiError::FileTooLarge {
                path: path.to_path_buf(),
                actual: metadata.len(),
                limit: MAX_CONTENT_FILE_SIZE,
            });
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::ReadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;
        let mut form = Form::new().part("file", part);
        if let Some(mins) = expires_after_mins {
            form = form.text("expiresAfterInMins", mins.to_string());
        }

        let id = Uuid::new_v4().to_string();
        tracing::debug!(%id, path = %path.display(), "uploading temp file");
        let created = self.client.create_multipart(&id, form).await?;
        Ok(created.resource)
    }

    async fn list(&self, query: PageQuery) -> Result<Page<TempFile>, ApiError> {
        self.client.list(query).await
    }

    async fn get(&self, id: &str) -> Result<Option<TempFile>, ApiError> {
        self.client.get(id).await
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(id).await
    }
}
