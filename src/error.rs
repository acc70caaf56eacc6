//! Error types for the resource access layer and gateway
//!
//! Provides unified error handling using thiserror, plus the classification
//! of upstream failures into a small taxonomy.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Error Kind ==
/// Coarse failure class, derived from the HTTP status where there is one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 400 and 422, or a request rejected before leaving the process
    Validation,
    /// 401
    Authentication,
    /// 403
    Authorization,
    /// Any other 4xx
    Client,
    /// 5xx, or an upstream body that does not match the schema
    Server,
    /// No response at all
    Network,
}

impl ErrorKind {
    /// Classifies an HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => ErrorKind::Validation,
            401 => ErrorKind::Authentication,
            403 => ErrorKind::Authorization,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Client,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Authentication => "authentication",
            ErrorKind::Authorization => "authorization",
            ErrorKind::Client => "client",
            ErrorKind::Server => "server",
            ErrorKind::Network => "network",
        }
    }
}

// == Api Error Enum ==
/// Unified error type for upstream calls and gateway requests.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request rejected locally before any upstream call
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Upstream answered with a non-2xx status
    #[error("Upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Upstream could not be reached or the response could not be read
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream body did not match the expected schema
    #[error("Failed to decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        ApiError::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Taxonomy class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::Upstream { status, .. } => ErrorKind::from_status(*status),
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Decode(_) | ApiError::Internal(_) => ErrorKind::Server,
        }
    }

    /// Whether a repeat of the same request could succeed: network failures,
    /// rate limiting and the transient 5xx statuses.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Upstream { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// Status the gateway answers with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ApiError::Network(_) | ApiError::Decode(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::new(self.to_string(), self.kind().as_str()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, ApiError>;
