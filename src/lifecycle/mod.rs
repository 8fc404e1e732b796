//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Logging → HttpServer (metrics recorder) → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Trigger → Stop accepting → Drain in-flight requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: listener binds last, once everything else is ready
//! - The task store lives exactly as long as the server

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
