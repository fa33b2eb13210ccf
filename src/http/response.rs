//! Response bodies and the HTTP error boundary.
//!
//! Every subsystem error that can reach a caller is mapped here; handlers
//! return `Result<_, ApiError>` and never build error responses by hand.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::task::JoinError;

use crate::compression::CompressionError;
use crate::relay::RelayError;

/// Errors surfaced to HTTP callers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid JSON: {0}")]
    InvalidInput(#[source] serde_json::Error),

    #[error("Failed to compress payload: {0}")]
    Compression(#[from] CompressionError),

    #[error("Relay failed: {0}")]
    Relay(#[from] RelayError),

    #[error("Compression task failed: {0}")]
    Task(#[from] JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Compression(_) | ApiError::Relay(_) | ApiError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message placed in the `error` field of the body.
    pub fn message(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "Invalid JSON",
            ApiError::Compression(_) | ApiError::Task(_) => "Failed to compress payload",
            ApiError::Relay(RelayError::Upstream { .. }) => "Original endpoint returned non-OK status",
            ApiError::Relay(_) => "Failed to send to original endpoint",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

/// `{"status": "ok"}`
pub fn ok() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `{"status": "success"}`
pub fn success() -> Json<Value> {
    Json(json!({ "status": "success" }))
}
