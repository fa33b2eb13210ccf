//! HTTP client for the storage service.
//!
//! # Responsibilities
//! - Build `{endpoint}/{id}` and `{endpoint}/batch` URLs flagged as precompressed
//! - POST JSON bodies with a bounded timeout
//! - Classify failures as connection or upstream errors

use std::time::{Duration, Instant};

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Serialize;
use url::Url;

use crate::observability::metrics;
use crate::payload::{CompressedBatch, CompressedPayload};
use crate::relay::types::{RelayError, RelayOutcome};

/// Query parameter telling storage the body is already compressed.
pub const PRECOMPRESSED_PARAM: &str = "is_precompressed";

/// Path segment of the batch endpoint.
pub const BATCH_SEGMENT: &str = "batch";

/// Request ID header, read inbound and forwarded downstream.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared relay to the storage service. Cheap to clone; clones share one pool.
#[derive(Clone, Debug)]
pub struct DownstreamRelay {
    client: reqwest::Client,
    endpoint: Url,
}

impl DownstreamRelay {
    /// Create a relay for `endpoint` whose requests give up after `timeout`.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, RelayError> {
        if endpoint.cannot_be_a_base() {
            return Err(RelayError::InvalidEndpoint(endpoint.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RelayError::Client)?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// `{endpoint}/{segment}?is_precompressed=...`, with `segment` percent-encoded.
    pub fn target_url(&self, segment: &str, precompressed: bool) -> Result<Url, RelayError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| RelayError::InvalidEndpoint(self.endpoint.to_string()))?
            .pop_if_empty()
            .push(segment);
        url.query_pairs_mut()
            .append_pair(PRECOMPRESSED_PARAM, if precompressed { "true" } else { "false" });
        Ok(url)
    }

    /// Relay one compressed item under its identifier.
    pub async fn relay_item(
        &self,
        id: &str,
        payload: &CompressedPayload,
        request_id: Option<&str>,
    ) -> RelayOutcome {
        let outcome = match self.target_url(id, true) {
            Ok(url) => self.relay(url, payload, request_id).await,
            Err(e) => Err(e),
        };
        record_outcome("single", &outcome);
        outcome
    }

    /// Relay a whole compressed batch in a single request.
    pub async fn relay_batch(&self, batch: &CompressedBatch, request_id: Option<&str>) -> RelayOutcome {
        let outcome = match self.target_url(BATCH_SEGMENT, true) {
            Ok(url) => self.relay(url, batch, request_id).await,
            Err(e) => Err(e),
        };
        record_outcome("batch", &outcome);
        outcome
    }

    /// POST `body` as JSON to `url`. Only `200 OK` counts as success.
    pub async fn relay<T: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &T,
        request_id: Option<&str>,
    ) -> RelayOutcome {
        let start = Instant::now();
        let json = serde_json::to_vec(body)?;

        let mut request = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(json);
        if let Some(id) = request_id.and_then(|id| HeaderValue::from_str(id).ok()) {
            request = request.header(REQUEST_ID_HEADER, id);
        }

        let response = request
            .send()
            .await
            .map_err(|source| RelayError::Connection { source })?;
        let status = response.status();

        // Drain so the connection goes back to the pool.
        if let Err(e) = response.bytes().await {
            tracing::debug!(url = %url, error = %e, "Failed to drain downstream response body");
        }

        tracing::debug!(
            url = %url,
            status = %status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Downstream responded"
        );

        if status != StatusCode::OK {
            return Err(RelayError::Upstream { status });
        }
        Ok(status)
    }
}

fn record_outcome(kind: &'static str, outcome: &RelayOutcome) {
    let label = match outcome {
        Ok(_) => "success",
        Err(e) => e.outcome_label(),
    };
    metrics::record_relay(kind, label);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relay(endpoint: &str) -> DownstreamRelay {
        DownstreamRelay::new(endpoint.parse().unwrap(), Duration::from_secs(120)).unwrap()
    }

    #[test]
    fn test_item_url() {
        let relay = relay("http://html-storage.default.svc.cluster.local");
        let url = relay.target_url("abc123", true).unwrap();
        assert_eq!(
            url.as_str(),
            "http://html-storage.default.svc.cluster.local/abc123?is_precompressed=true"
        );
    }

    #[test]
    fn test_batch_url_with_trailing_slash_and_base_path() {
        let relay = relay("http://storage:9000/v1/");
        let url = relay.target_url(BATCH_SEGMENT, true).unwrap();
        assert_eq!(url.as_str(), "http://storage:9000/v1/batch?is_precompressed=true");
    }

    #[test]
    fn test_item_id_is_percent_encoded() {
        let relay = relay("http://storage:9000");
        let url = relay.target_url("a/b c", true).unwrap();
        assert_eq!(url.as_str(), "http://storage:9000/a%2Fb%20c?is_precompressed=true");
    }

    #[test]
    fn test_rejects_endpoint_without_base() {
        let err = DownstreamRelay::new("mailto:ops@example.com".parse().unwrap(), Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, RelayError::InvalidEndpoint(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_connection_error() {
        // Nothing listens on the discard port locally.
        let relay = relay("http://127.0.0.1:9");
        let payload = CompressedPayload {
            compressed_body: vec![1, 2, 3],
            blog: "x".into(),
            timestamp: 1,
        };

        let err = relay.relay_item("abc", &payload, None).await.unwrap_err();
        assert!(matches!(err, RelayError::Connection { .. }));
        assert_eq!(err.status(), None);
    }
}
