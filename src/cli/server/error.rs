use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::application::ports::ApiError;
use crate::application::OrchestratorError;
use crate::domain::error::{ConfigError, ContentError, InvalidOptionError, RequestError};

/// Errors returned by the job API
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    UnsupportedMediaType(String),

    #[error("Remote service error: {0}")]
    BadGateway(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error body: `{"error": "..."}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = %status.as_u16(), "Request failed");
        } else {
            tracing::warn!(error = %self, status = %status.as_u16(), "Request rejected");
        }

        (status, Json(self.to_response())).into_response()
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::SizeLimitExceeded { .. } => Self::PayloadTooLarge(err.to_string()),
            ContentError::UnsupportedFormat { .. } => Self::UnsupportedMediaType(err.to_string()),
            _ => Self::BadRequest(err.to_string()),
        }
    }
}

impl From<RequestError> for AppError {
    fn from(err: RequestError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<InvalidOptionError> for AppError {
    fn from(err: InvalidOptionError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<OrchestratorError> for AppError {
    fn from(err: OrchestratorError) -> Self {
        match err {
            OrchestratorError::Request(e) => e.into(),
            OrchestratorError::Content(e) => e.into(),
            OrchestratorError::Connect(_) => Self::BadRequest(err.to_string()),
            OrchestratorError::JobNotFound(_) | OrchestratorError::ArtifactUnavailable { .. } => {
                Self::NotFound(err.to_string())
            }
            OrchestratorError::Remote(e) => e.into(),
        }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        Self::BadGateway(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
