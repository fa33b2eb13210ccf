//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Resolve config → Load dictionary (fatal on error) → Build relay → Bind listener
//!
//! Requests (background.rs):
//!     Single-item handler → detached compress+relay task (counted, never joined)
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → broadcast → stop accepting → finish open requests → exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, no partial startup
//! - Detached relays are not drained on shutdown; the count is logged instead

pub mod background;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use background::BackgroundTasks;
pub use shutdown::Shutdown;
