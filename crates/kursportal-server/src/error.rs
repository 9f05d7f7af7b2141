//! Error types for the server.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Server error type.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Admin token missing or wrong.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Conflicting resource state (e.g. duplicate registration).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Service unavailable.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database/storage error.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<kursportal_content::ContentError> for ServerError {
    fn from(e: kursportal_content::ContentError) -> Self {
        match e {
            kursportal_content::ContentError::NotFound(name) => ServerError::NotFound(name),
            kursportal_content::ContentError::Parse { .. } => ServerError::Internal(e.to_string()),
            kursportal_content::ContentError::Io(e) => {
                ServerError::Internal(format!("IO error: {}", e))
            }
        }
    }
}

impl From<kursportal_registry::RegistryError> for ServerError {
    fn from(e: kursportal_registry::RegistryError) -> Self {
        match e {
            kursportal_registry::RegistryError::NotFound(id) => {
                ServerError::NotFound(format!("Teilnehmer {} nicht gefunden", id))
            }
            kursportal_registry::RegistryError::DuplicateEmail(email) => {
                ServerError::Conflict(format!("E-Mail bereits angemeldet: {}", email))
            }
            kursportal_registry::RegistryError::Database(e) => {
                ServerError::Storage(e.to_string())
            }
            kursportal_registry::RegistryError::Migration(msg) => {
                ServerError::Internal(format!("Migration error: {}", msg))
            }
            kursportal_registry::RegistryError::Csv(e) => ServerError::Internal(e.to_string()),
            kursportal_registry::RegistryError::Io(e) => {
                ServerError::Storage(format!("IO error: {}", e))
            }
        }
    }
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ServerError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ServerError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ServerError::RateLimitExceeded => {
                (StatusCode::TOO_MANY_REQUESTS, "rate_limit_exceeded")
            }
            ServerError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable")
            }
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            ServerError::Serialization(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "serialization_error")
            }
            ServerError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
        };

        let message = self.to_string();

        match &self {
            ServerError::Internal(_) | ServerError::Serialization(_) | ServerError::Storage(_) => {
                tracing::error!(status = %status, code, error = %message, "Server error");
            }
            _ => {
                tracing::warn!(status = %status, code, error = %message, "Client error");
            }
        }

        let body = ErrorResponse {
            code: code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
