//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::compression::DEFAULT_LEVEL;

/// Root configuration for the precompressor.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PrecompressorConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Storage service the compressed payloads are relayed to.
    pub downstream: DownstreamConfig,

    /// Compression dictionary source and level.
    pub dictionary: DictionaryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Downstream storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DownstreamConfig {
    /// Base URL of the HTML storage service.
    pub endpoint: String,

    /// Deadline for one relay request in seconds.
    pub timeout_secs: u64,
}

impl DownstreamConfig {
    pub fn endpoint_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.endpoint)
    }
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://html-storage.default.svc.cluster.local".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Compression dictionary configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DictionaryConfig {
    /// Path to the zstd dictionary blob.
    pub path: PathBuf,

    /// zstd compression level.
    pub level: i32,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./zstd_dict"),
            level: DEFAULT_LEVEL,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Serve Prometheus metrics on `/metrics`.
    pub metrics_enabled: bool,

    /// Log filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            log_filter: "html_precompressor=info,tower_http=info".to_string(),
        }
    }
}
