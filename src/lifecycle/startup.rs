//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the server (store, metrics recorder, router)
//! - Bind the listener and announce the address
//! - Wire OS signals to graceful shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::{signals, Shutdown};

/// Run the service until a termination signal arrives.
pub async fn run(config: AppConfig) -> Result<(), ServerError> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        metrics_enabled = config.observability.metrics_enabled,
        "Configuration loaded"
    );

    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Task API running on http://{}", local_addr);

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_termination().await;
        shutdown.trigger();
    });

    server.run(listener, receiver).await
}
