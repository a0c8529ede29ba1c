//! Read-only HTTP query API.
//!
//! Exposes Chronicle's stored activity to other tools over plain
//! HTTP/JSON: sessions (with their summarization checkpoints), commits,
//! the combined timeline, and usage statistics. Strictly read-only --
//! every mutation goes through the CLI.

pub mod handlers;
pub mod router;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Error envelope returned by every handler on failure.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({"error": self.message}));
        (self.status, body).into_response()
    }
}

impl From<chronicle_types::error::RepositoryError> for ApiError {
    fn from(err: chronicle_types::error::RepositoryError) -> Self {
        tracing::error!(error = %err, "repository error in handler");
        ApiError::internal(err.to_string())
    }
}
