//! Inbound and relayed payload shapes.
//!
//! Inbound: `{"body": "<html>", "blog": "...", "timestamp": 0}`
//! Relayed: same keys, with `body` replaced by base64 of the zstd frame.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::compression::{compress, CompressionError, Dictionary};

/// Raw HTML document as posted by the crawler. Missing fields default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Payload {
    pub body: String,
    pub blog: String,
    pub timestamp: i64,
}

/// Payload whose body has been replaced by the dictionary-compressed frame.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CompressedPayload {
    #[serde(rename = "body", with = "base64_body")]
    pub compressed_body: Vec<u8>,
    pub blog: String,
    pub timestamp: i64,
}

/// Identifier → payload, as accepted by `POST /batch`.
pub type Batch = HashMap<String, Payload>;

/// Identifier → compressed payload, as relayed to storage.
pub type CompressedBatch = HashMap<String, CompressedPayload>;

impl CompressedPayload {
    /// Compress the body of `payload`; `blog` and `timestamp` pass through unchanged.
    pub fn compress(payload: Payload, dictionary: &Dictionary) -> Result<Self, CompressionError> {
        Ok(Self {
            compressed_body: compress(&payload.body, dictionary)?,
            blog: payload.blog,
            timestamp: payload.timestamp,
        })
    }
}

/// Compress every entry of a batch. Iteration order is unspecified.
pub fn compress_batch(batch: Batch, dictionary: &Dictionary) -> Result<CompressedBatch, CompressionError> {
    batch
        .into_iter()
        .map(|(id, payload)| Ok((id, CompressedPayload::compress(payload, dictionary)?)))
        .collect()
}

mod base64_body {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
