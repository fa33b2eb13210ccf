//! Dictionary-based compression subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (dictionary.rs):
//!     dictionary blob → validate (size, level, trial frame)
//!     → prepared encoder/decoder contexts → Arc<Dictionary>
//!
//! Per payload (compressor.rs):
//!     HTML text → zstd frame (prepared dictionary) → bytes
//!     → duration sample recorded
//! ```
//!
//! # Design Decisions
//! - Dictionary is built once before the listener binds and never mutated
//! - Prepared dictionaries are shared by reference; each call gets its own context
//! - Storage must decompress with the same dictionary; this is not checked here

pub mod compressor;
pub mod dictionary;

pub use compressor::{compress, CompressionError};
pub use dictionary::{Dictionary, DictionaryError, DEFAULT_LEVEL};
