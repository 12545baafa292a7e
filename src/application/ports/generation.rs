//! Podcast generation port interface

use async_trait::async_trait;

use crate::domain::config::ServiceCredentials;
use crate::domain::generation::{
    GenerationRequest, GenerationResource, OperationState, Page, PageQuery,
};

use super::api::ApiError;

/// Result of a create call
#[derive(Debug, Clone)]
pub struct CreatedGeneration {
    pub resource: GenerationResource,
    /// Where to poll for progress; absent when the service finished synchronously
    pub operation_location: Option<String>,
}

/// Port for the remote generation resource family
#[async_trait]
pub trait GenerationApi: Send + Sync {
    /// Create a generation under a client-chosen id.
    async fn create(
        &self,
        id: &str,
        request: &GenerationRequest,
    ) -> Result<CreatedGeneration, ApiError>;

    /// Read the status document at an operation location.
    async fn operation_status(&self, location: &str) -> Result<OperationState, ApiError>;

    /// Fetch a generation. `Ok(None)` when the service reports 404.
    async fn get(&self, id: &str) -> Result<Option<GenerationResource>, ApiError>;

    /// List one page of generations.
    async fn list(&self, query: PageQuery) -> Result<Page<GenerationResource>, ApiError>;

    /// Delete a generation. Deleting an unknown id is an error.
    async fn delete(&self, id: &str) -> Result<(), ApiError>;
}

/// Builds a [`GenerationApi`] bound to one set of credentials
pub trait GenerationApiProvider: Send + Sync {
    type Api: GenerationApi + 'static;

    fn connect(&self, credentials: &ServiceCredentials) -> Result<Self::Api, ApiError>;
}
