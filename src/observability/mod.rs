//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, compression duration summary)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → GET /metrics (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows from the inbound request into the downstream relay
//! - Metric updates never influence request handling
//! - Recorder install is idempotent so tests can share the global recorder

pub mod logging;
pub mod metrics;
