//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with the podcast service over HTTP and with the
//! local config file.

pub mod config;
pub mod http;

// Re-export adapters
pub use config::XdgConfigStore;
pub use http::{
    build_http_client, HttpDownloader, HttpGenerationApi, HttpGenerationApiProvider,
    HttpTempFileApi,
};
