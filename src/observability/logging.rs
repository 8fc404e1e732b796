//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber
//! - Select pretty or JSON output
//!
//! # Design Decisions
//! - `RUST_LOG` takes precedence over the configured level
//! - JSON format for production, pretty format for development

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

use crate::config::{LogFormat, ObservabilityConfig};

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let (pretty, json) = match config.log_format {
        LogFormat::Pretty => (Some(fmt::layer()), None),
        LogFormat::Json => (None, Some(fmt::layer().json().with_current_span(false))),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .try_init()
}
