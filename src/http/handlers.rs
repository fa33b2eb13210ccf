//! Route handlers.
//!
//! # Responsibilities
//! - `GET /` liveness
//! - `GET /metrics` Prometheus exposition
//! - `POST /{id}` single item: acknowledge, then compress and relay detached
//! - `POST /batch` many items: compress all, relay once, report the outcome

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use tracing::Instrument;

use crate::compression::Dictionary;
use crate::http::request::{request_id, JsonBody};
use crate::http::response::{self, ApiError};
use crate::http::server::AppState;
use crate::payload::{compress_batch, Batch, CompressedPayload, Payload};
use crate::relay::{DownstreamRelay, RelayError};

const METRICS_ID: &str = "metrics";

pub async fn health() -> Json<Value> {
    response::ok()
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// `POST /{id}`: the acknowledgment never waits on compression or the relay.
pub async fn relay_single(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    JsonBody(payload): JsonBody<Payload>,
) -> Json<Value> {
    dispatch_item(state, id, &headers, payload)
}

/// `POST /metrics`: the static metrics route shadows `/{id}` for this one id.
pub async fn relay_metrics_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(payload): JsonBody<Payload>,
) -> Json<Value> {
    dispatch_item(state, METRICS_ID.to_owned(), &headers, payload)
}

fn dispatch_item(state: AppState, id: String, headers: &HeaderMap, payload: Payload) -> Json<Value> {
    let request_id = request_id(headers);
    let span = tracing::info_span!("relay_item", id = %id, request_id = ?request_id);

    let dictionary = state.dictionary.clone();
    let relay = state.relay.clone();
    state.tasks.spawn(
        async move {
            forward_item(&dictionary, &relay, &id, payload, request_id.as_deref()).await;
        }
        .instrument(span),
    );

    response::success()
}

/// Background half of `POST /{id}`. Failures end here, in the log.
async fn forward_item(
    dictionary: &Dictionary,
    relay: &DownstreamRelay,
    id: &str,
    payload: Payload,
    request_id: Option<&str>,
) {
    let compressed = match CompressedPayload::compress(payload, dictionary) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Failed to compress payload, dropping item");
            return;
        }
    };

    match relay.relay_item(id, &compressed, request_id).await {
        Ok(_) => tracing::debug!(bytes = compressed.compressed_body.len(), "Item relayed"),
        Err(RelayError::Upstream { status }) => {
            tracing::warn!(status = %status, "Original endpoint returned non-OK status, item lost")
        }
        Err(e) => tracing::error!(
            error = %e,
            timed_out = e.is_timeout(),
            "Error sending to original endpoint, item lost"
        ),
    }
}

/// `POST /batch`: one downstream request for the whole mapping.
///
/// Compression runs on the blocking pool; batches can be large.
pub async fn relay_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(batch): JsonBody<Batch>,
) -> Result<Json<Value>, ApiError> {
    let request_id = request_id(&headers);
    let items = batch.len();

    let dictionary = state.dictionary.clone();
    let compressed = tokio::task::spawn_blocking(move || compress_batch(batch, &dictionary))
        .await
        .map_err(|e| {
            tracing::error!(items, error = %e, "Batch compression task failed");
            ApiError::from(e)
        })?
        .map_err(|e| {
            tracing::error!(items, error = %e, "Failed to compress batch");
            ApiError::from(e)
        })?;

    if let Err(e) = state.relay.relay_batch(&compressed, request_id.as_deref()).await {
        match &e {
            RelayError::Upstream { status } => {
                tracing::warn!(items, status = %status, "Original endpoint rejected batch")
            }
            other => tracing::error!(
                items,
                error = %other,
                timed_out = other.is_timeout(),
                "Error sending batch to original endpoint"
            ),
        }
        return Err(e.into());
    }

    tracing::debug!(items, "Batch relayed");
    Ok(response::success())
}
