//! Generation API adapter

use async_trait::async_trait;

use crate::application::ports::{ApiError, CreatedGeneration, GenerationApi, GenerationApiProvider};
use crate::domain::config::ServiceCredentials;
use crate::domain::generation::{
    GenerationRequest, GenerationResource, OperationState, Page, PageQuery,
};

use super::dto::GenerationBody;
use super::resource_client::ResourceClient;

const SEGMENT: &str = "generations";

/// HTTP implementation of [`GenerationApi`]
#[derive(Debug, Clone)]
pub struct HttpGenerationApi {
    client: ResourceClient<GenerationResource>,
}

impl HttpGenerationApi {
    pub fn new(http: reqwest::Client, credentials: &ServiceCredentials) -> Result<Self, ApiError> {
        Ok(Self {
            client: ResourceClient::new(http, credentials, SEGMENT)?,
        })
    }
}

#[async_trait]
impl GenerationApi for HttpGenerationApi {
    async fn create(
        &self,
        id: &str,
        request: &GenerationRequest,
    ) -> Result<CreatedGeneration, ApiError> {
        let body = GenerationBody::from(request);
        let created = self.client.create_with_id(id, &body).await?;
        tracing::debug!(id, location = ?created.operation_location, "generation created");
        Ok(CreatedGeneration {
            resource: created.resource,
            operation_location: created.operation_location,
        })
    }

    async fn operation_status(&self, location: &str) -> Result<OperationState, ApiError> {
        self.client.operation_state(location).await
    }

    async fn get(&self, id: &str) -> Result<Option<GenerationResource>, ApiError> {
        self.client.get(id).await
    }

    async fn list(&self, query: PageQuery) -> Result<Page<GenerationResource>, ApiError> {
        self.client.list(query).await
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(id).await
    }
}

/// Connects [`HttpGenerationApi`] clients over one shared connection pool
#[derive(Debug, Clone, Default)]
pub struct HttpGenerationApiProvider {
    http: reqwest::Client,
}

impl HttpGenerationApiProvider {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl GenerationApiProvider for HttpGenerationApiProvider {
    type Api = HttpGenerationApi;

    fn connect(&self, credentials: &ServiceCredentials) -> Result<HttpGenerationApi, ApiError> {
        HttpGenerationApi::new(self.http.clone(), credentials)
    }
}
