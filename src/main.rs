//! Task API binary.
//!
//! Loads configuration (optional TOML file, `PORT` override), initializes
//! logging, then serves until SIGINT/SIGTERM.

use std::path::PathBuf;

use clap::Parser;

use task_api::config::{load_config, AppConfig};
use task_api::lifecycle::startup;
use task_api::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "task-api", version, about = "In-memory task tracking HTTP API")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "TASK_API_CONFIG")]
    config: Option<PathBuf>,

    /// Listen port, replacing the port of the configured bind address.
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(port) = args.port {
        config.listener.override_port(port);
    }

    logging::init(&config.observability)?;
    tracing::info!("task-api v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
