//! HTML precompressor library.
//!
//! Accepts HTML over HTTP, compresses it with a shared zstd dictionary and
//! relays the compressed bytes to the HTML storage service.

pub mod compression;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod payload;
pub mod relay;

pub use compression::Dictionary;
pub use config::schema::PrecompressorConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
