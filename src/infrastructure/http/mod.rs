//! HTTP adapters for the podcast service

mod downloader;
mod dto;
mod endpoint;
mod generations;
mod resource_client;
mod temp_files;

pub use downloader::HttpDownloader;
pub use dto::{ContentBody, GenerationBody};
pub use endpoint::ServiceEndpoint;
pub use generations::{HttpGenerationApi, HttpGenerationApiProvider};
pub use resource_client::{
    Created, ResourceClient, OPERATION_ID_HEADER, OPERATION_LOCATION_HEADER,
    SUBSCRIPTION_KEY_HEADER,
};
pub use temp_files::HttpTempFileApi;

/// Build the shared HTTP client
pub fn build_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}
