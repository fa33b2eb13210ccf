//! Request extraction.
//!
//! # Responsibilities
//! - Buffer and decode JSON bodies, turning every decode failure into `400`
//! - Read the request ID assigned by the request-id layer
//!
//! # Design Decisions
//! - No Content-Type requirement; storage crawlers post bare JSON
//! - Body-limit rejections keep their own status (413), they are not "invalid input"

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::http::response::ApiError;
use crate::relay::client::REQUEST_ID_HEADER;

/// JSON body extractor whose only decode rejection is `400 Invalid JSON`.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        serde_json::from_slice(&bytes).map(JsonBody).map_err(|e| {
            tracing::debug!(error = %e, "Rejecting malformed request body");
            ApiError::InvalidInput(e).into_response()
        })
    }
}

/// The request ID header value, if present and printable.
pub fn request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}
