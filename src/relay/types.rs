//! Relay outcome and error definitions.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while relaying to the storage service.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Endpoint cannot carry path segments (e.g. `mailto:`).
    #[error("invalid downstream endpoint: {0}")]
    InvalidEndpoint(String),

    /// HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Body could not be serialized.
    #[error("failed to encode relay body: {0}")]
    Encode(#[from] serde_json::Error),

    /// Request could not be sent, or timed out.
    #[error("failed to send to original endpoint: {source}")]
    Connection {
        #[source]
        source: reqwest::Error,
    },

    /// A response arrived with a status other than 200.
    #[error("original endpoint returned non-OK status: {status}")]
    Upstream { status: StatusCode },
}

impl RelayError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, RelayError::Connection { source } if source.is_timeout())
    }

    /// Status returned by the storage service, if one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RelayError::Upstream { status } => Some(*status),
            _ => None,
        }
    }

    /// Label used for the relay outcome metric.
    pub fn outcome_label(&self) -> &'static str {
        match self {
            RelayError::Upstream { .. } => "upstream_error",
            _ => "connection_error",
        }
    }
}

/// Result of one relay call: the accepted status, or why it failed.
pub type RelayOutcome = Result<StatusCode, RelayError>;
