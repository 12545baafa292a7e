//! Temp file port interface

use std::path::Path;

use async_trait::async_trait;

use crate::domain::generation::{Page, PageQuery};
use crate::domain::temp_file::TempFile;

use super::api::ApiError;

/// Port for the remote temp file store
#[async_trait]
pub trait TempFileApi: Send + Sync {
    /// Upload a local file under a fresh id.
    ///
    /// The file must exist and be within the upload limit; both are
    /// checked before any request is sent.
    async fn upload(
        &self,
        path: &Path,
        expires_after_mins: Option<u32>,
    ) -> Result<TempFile, ApiError>;

    async fn list(&self, query: PageQuery) -> Result<Page<TempFile>, ApiError>;

    /// `Ok(None)` when the file is unknown or has expired
    async fn get(&self, id: &str) -> Result<Option<TempFile>, ApiError>;

    async fn delete(&self, id: &str) -> Result<(), ApiError>;
}
