//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod api;
pub mod config;
pub mod downloader;
pub mod generation;
pub mod temp_file;

// Re-export common types
pub use api::ApiError;
pub use config::ConfigStore;
pub use downloader::{ArtifactDownloader, DownloadError};
pub use generation::{CreatedGeneration, GenerationApi, GenerationApiProvider};
pub use temp_file::TempFileApi;
