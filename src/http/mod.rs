//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (assign trace ID, schedule log + metrics)
//!     → handlers.rs (translate to TaskStore operation)
//!     → response.rs (JSON envelope or traced error)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{TraceId, X_TRACE_ID};
pub use response::{ApiError, TaskError};
pub use server::{AppState, HttpServer, ServerError};
