//! Generic long-running resource client
//!
//! One client shape serves every podcast resource family. It is
//! parameterized by the resource payload type and its URL segment.

use std::marker::PhantomData;

use reqwest::header::HeaderMap;
use reqwest::multipart::Form;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::application::ports::ApiError;
use crate::domain::config::ServiceCredentials;
use crate::domain::generation::{OperationState, Page, PageQuery};

use super::endpoint::ServiceEndpoint;

pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
pub const OPERATION_ID_HEADER: &str = "Operation-Id";
pub const OPERATION_LOCATION_HEADER: &str = "Operation-Location";

/// A created resource and where to poll it
#[derive(Debug, Clone)]
pub struct Created<T> {
    pub resource: T,
    pub operation_location: Option<String>,
}

/// Client for one resource family (`generations`, `tempfiles`, ...)
#[derive(Debug, Clone)]
pub struct ResourceClient<T> {
    http: reqwest::Client,
    endpoint: ServiceEndpoint,
    subscription_key: String,
    segment: &'static str,
    _resource: PhantomData<fn() -> T>,
}

impl<T> ResourceClient<T>
where
    T: DeserializeOwned,
{
    pub fn new(
        http: reqwest::Client,
        credentials: &ServiceCredentials,
        segment: &'static str,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            http,
            endpoint: ServiceEndpoint::from_credentials(credentials)?,
            subscription_key: credentials.subscription_key().to_string(),
            segment,
            _resource: PhantomData,
        })
    }

    /// URL of the collection or of one resource
    pub fn url(&self, id: Option<&str>, query: &PageQuery) -> Url {
        self.endpoint.resource_url(self.segment, id, query)
    }

    /// Create with a client-chosen id by PUTting a JSON body
    pub async fn create_with_id<B>(&self, id: &str, body: &B) -> Result<Created<T>, ApiError>
    where
        B: Serialize + Sync,
    {
        let url = self.url(Some(id), &PageQuery::default());
        let request = self
            .http
            .put(url)
            .header(OPERATION_ID_HEADER, Uuid::new_v4().to_string())
            .json(body);
        self.send_create(request).await
    }

    /// Create with a client-chosen id by POSTing a multipart form
    pub async fn create_multipart(&self, id: &str, form: Form) -> Result<Created<T>, ApiError> {
        let url = self.url(Some(id), &PageQuery::default());
        let request = self.http.post(url).multipart(form);
        self.send_create(request).await
    }

    /// Read the status document at an operation location
    pub async fn operation_state(&self, location: &str) -> Result<OperationState, ApiError> {
        let response = self.send(self.http.get(location)).await?;
        let response = ensure_status(response, &[StatusCode::OK]).await?;
        parse_json(response).await
    }

    /// Fetch one resource; 404 is `Ok(None)`
    pub async fn get(&self, id: &str) -> Result<Option<T>, ApiError> {
        let url = self.url(Some(id), &PageQuery::default());
        let response = self.send(self.http.get(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_status(response, &[StatusCode::OK]).await?;
        parse_json(response).await.map(Some)
    }

    /// List one page
    pub async fn list(&self, query: PageQuery) -> Result<Page<T>, ApiError> {
        let url = self.url(None, &query);
        let response = self.send(self.http.get(url)).await?;
        let response = ensure_status(response, &[StatusCode::OK]).await?;
        parse_json(response).await
    }

    /// Delete one resource. Only 204 counts as success.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let url = self.url(Some(id), &PageQuery::default());
        let response = self.send(self.http.delete(url)).await?;
        ensure_status(response, &[StatusCode::NO_CONTENT]).await?;
        Ok(())
    }

    async fn send_create(&self, request: RequestBuilder) -> Result<Created<T>, ApiError> {
        let response = self.send(request).await?;
        let response = ensure_status(response, &[StatusCode::OK, StatusCode::CREATED]).await?;
        let operation_location = operation_location(response.headers());
        let resource = parse_json(response).await?;
        Ok(Created {
            resource,
            operation_location,
        })
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        request
            .header(SUBSCRIPTION_KEY_HEADER, &self.subscription_key)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))
    }
}

fn operation_location(headers: &HeaderMap) -> Option<String> {
    headers
        .get(OPERATION_LOCATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Turn any status outside `accepted` into [`ApiError::Remote`] carrying the body
async fn ensure_status(response: Response, accepted: &[StatusCode]) -> Result<Response, ApiError> {
    let status = response.status();
    if accepted.contains(&status) {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
    Err(ApiError::Remote {
        status: status.as_u16(),
        body,
    })
}

async fn parse_json<R: DeserializeOwned>(response: Response) -> Result<R, ApiError> {
    response
        .json()
        .await
        .map_err(|e| ApiError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn operation_location_header_is_optional() {
        let mut headers = HeaderMap::new();
        assert_eq!(operation_location(&headers), None);

        headers.insert(OPERATION_LOCATION_HEADER, HeaderValue::from_static(" "));
        assert_eq!(operation_location(&headers), None);

        headers.insert(
            OPERATION_LOCATION_HEADER,
            HeaderValue::from_static("https://svc/operations/1?api-version=v1"),
        );
        assert_eq!(
            operation_location(&headers).as_deref(),
            Some("https://svc/operations/1?api-version=v1")
        );
    }

    #[test]
    fn url_uses_segment() {
        let credentials = ServiceCredentials::new("eastus", "key", "v1").unwrap();
        let client: ResourceClient<serde_json::Value> =
            ResourceClient::new(reqwest::Client::new(), &credentials, "tempfiles").unwrap();
        let url = client.url(Some("t1"), &PageQuery::default());
        assert_eq!(url.path(), "/podcast/tempfiles/t1");
    }
}
