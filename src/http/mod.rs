//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, routes)
//!     → request.rs (buffer body, decode JSON, request ID)
//!     → handlers.rs
//!         POST /{id}   → ack now, compress + relay in background
//!         POST /batch  → compress all, relay once, ack with relay outcome
//!     → response.rs (status + JSON body, error mapping)
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::JsonBody;
pub use response::ApiError;
pub use server::{AppState, HttpServer};
