//! Downstream relay subsystem.
//!
//! # Data Flow
//! ```text
//! CompressedPayload / CompressedBatch
//!     → client.rs (JSON body, POST {endpoint}/{id|batch}?is_precompressed=true)
//!     → response status interpreted (200 = accepted)
//!     → RelayOutcome handed back to the handler
//! ```
//!
//! # Design Decisions
//! - Every relay has a deadline (client-wide timeout)
//! - No retries: delivery is at most once
//! - The response body is always drained so pooled connections are reused
//! - One shared client (and connection pool) for all handlers

pub mod client;
pub mod types;

pub use client::DownstreamRelay;
pub use types::{RelayError, RelayOutcome};
