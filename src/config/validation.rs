//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: AppConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("observability.log_level must not be empty")]
    EmptyLogLevel,
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }
    if config.observability.log_level.trim().is_empty() {
        errors.push(ValidationError::EmptyLogLevel);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
