//! Remote service error type shared by all API ports

use std::path::PathBuf;

use thiserror::Error;

/// Remote API errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Non-success HTTP status; the body is kept verbatim
    #[error("Service returned HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("File {} is {actual} bytes, exceeding the {limit}-byte upload limit", .path.display())]
    FileTooLarge {
        path: PathBuf,
        actual: u64,
        limit: u64,
    },

    #[error("Failed to read {}: {message}", .path.display())]
    ReadFailed { path: PathBuf, message: String },
}

impl ApiError {
    /// HTTP status of a remote error, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_keeps_body() {
        let err = ApiError::Remote {
            status: 400,
            body: r#"{"error":{"code":"InvalidArgument"}}"#.to_string(),
        };
        assert!(err.to_string().contains("HTTP 400"));
        assert!(err.to_string().contains("InvalidArgument"));
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_not_found());
    }

    #[test]
    fn not_found_detection() {
        let err = ApiError::Remote {
            status: 404,
            body: String::new(),
        };
        assert!(err.is_not_found());
        assert!(!ApiError::RequestFailed("timeout".into()).is_not_found());
    }
}
