//! Domain error types

use std::path::PathBuf;

use thiserror::Error;

/// Error when parsing a duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration format: \"{input}\". Expected format: <number>h, <number>m, <number>s or a combination (e.g., 5s, 1m, 2m30s, 24h)")]
pub struct DurationParseError {
    pub input: String,
}

/// Error when an enum-like option value is not recognised
#[derive(Debug, Clone, Error)]
#[error("Invalid {kind}: \"{input}\". Valid values are: {valid}")]
pub struct InvalidOptionError {
    pub kind: &'static str,
    pub input: String,
    pub valid: &'static str,
}

/// Error when a generation request is incomplete
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    #[error("A target locale is required (e.g. en-US)")]
    MissingLocale,

    #[error(transparent)]
    InvalidOption(#[from] InvalidOptionError),
}

/// Error when resolving a content source
#[derive(Debug, Clone, Error)]
pub enum ContentError {
    #[error("At least one content source must be provided (content URL, temp file id or local file)")]
    MissingSource,

    #[error("{subject} is {actual} bytes, exceeding the {limit}-byte limit. Upload the file with 'upload_temp_file' and pass --temp-file-id instead")]
    SizeLimitExceeded {
        subject: &'static str,
        actual: u64,
        limit: u64,
    },

    #[error("Unsupported file extension: \"{extension}\". Only .txt and .pdf are supported")]
    UnsupportedFormat { extension: String },

    #[error("Text file is not valid UTF-8: {}", .0.display())]
    InvalidText(PathBuf),

    #[error("Failed to read {}: {message}", .path.display())]
    ReadFailed { path: PathBuf, message: String },
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Missing required setting '{key}'. {hint}")]
    Missing { key: &'static str, hint: &'static str },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
