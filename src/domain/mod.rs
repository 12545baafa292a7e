//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod config;
pub mod content;
pub mod duration;
pub mod error;
pub mod generation;
pub mod job;
pub mod temp_file;

// Re-export common types
pub use config::{AppConfig, ServiceCredentials};
pub use content::{ContentFileFormat, ContentHints, ContentSource};
pub use duration::Duration;
pub use error::*;
pub use generation::{
    GenerationDraft, GenerationRequest, GenerationResource, OperationStatus, Page, PageQuery,
};
pub use job::{FailureStage, Job, JobFailure, JobPhase};
pub use temp_file::TempFile;
