//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! http::request::trace_requests (one record per request)
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms, scrape-time gauges)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → GET /metrics (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Trace ID flows through every log record and error body
//! - Metric updates are cheap atomic operations on the request path

pub mod logging;
pub mod metrics;
