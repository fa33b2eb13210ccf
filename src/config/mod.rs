//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → CLI flag overrides (cli.rs)
//!     → validation.rs (semantic checks, all errors reported)
//!     → PrecompressorConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::Cli;
pub use loader::{load_config, ConfigError};
pub use schema::PrecompressorConfig;
pub use schema::{DictionaryConfig, DownstreamConfig, ListenerConfig, ObservabilityConfig};
