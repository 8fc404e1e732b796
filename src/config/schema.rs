//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files, and
//! every field has a default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for the task API.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl ListenerConfig {
    /// Replace the port of the bind address, keeping the host.
    pub fn override_port(&mut self, port: u16) {
        let host = match self.bind_address.rsplit_once(':') {
            Some((host, _)) => host,
            None => self.bind_address.as_str(),
        };
        self.bind_address = format!("{}:{}", host, port);
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default `EnvFilter` directive, used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Pretty for development, JSON for log aggregation.
    pub log_format: LogFormat,

    /// Serve Prometheus metrics on `/metrics`.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "task_api=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
        }
    }
}
