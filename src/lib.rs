//! In-memory task tracking API.
//!
//! ```text
//!     Client Request
//!     ──────────────▶ TraceLayer ─▶ trace_requests ─▶ handlers ─▶ TaskStore
//!                                     (trace ID,        (JSON)     (Mutex<Vec<Task>>)
//!                                      log, metrics)
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod tasks;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use tasks::{Task, TaskId, TaskStore};
