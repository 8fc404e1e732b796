//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Own the task store and metrics handle for the server's lifetime
//! - Create the Axum Router with all handlers
//! - Wire up middleware (tracing, trace IDs, panic recovery, timeouts)
//! - Serve on a listener until shutdown

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    middleware,
    routing::{get, put},
    Extension, Router,
};
use metrics_exporter_prometheus::{BuildError, PrometheusHandle};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::http::handlers;
use crate::http::request::trace_requests;
use crate::http::response::panic_response;
use crate::observability::metrics;
use crate::tasks::TaskStore;

/// Errors that stop the server from starting or serving.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to install metrics recorder: {0}")]
    Metrics(#[from] BuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TaskStore>,
    /// `None` when metrics are disabled.
    pub metrics: Option<PrometheusHandle>,
    pub started_at: Instant,
}

/// HTTP server for the task API.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a server with an empty store.
    pub fn new(config: AppConfig) -> Result<Self, ServerError> {
        let metrics = if config.observability.metrics_enabled {
            Some(metrics::install_recorder()?)
        } else {
            None
        };

        let state = AppState {
            store: Arc::new(TaskStore::new()),
            metrics,
            started_at: Instant::now(),
        };

        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            config,
            state,
        })
    }

    fn build_router(config: &AppConfig, state: AppState) -> Router {
        let mut routes = Router::new()
            .route("/health", get(handlers::health))
            .route(
                "/tasks",
                get(handlers::list_tasks).post(handlers::create_task),
            )
            .route(
                "/tasks/{id}",
                put(handlers::update_task).delete(handlers::delete_task),
            );

        if let Some(handle) = state.metrics.clone() {
            routes = routes.route(
                "/metrics",
                get(handlers::prometheus_metrics).layer(Extension(handle)),
            );
        }

        with_middleware(routes.fallback(handlers::route_not_found), config).with_state(state)
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let upkeep = self
            .state
            .metrics
            .clone()
            .map(|handle| metrics::spawn_upkeep(handle, shutdown.resubscribe()));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        if let Some(upkeep) = upkeep {
            upkeep.abort();
        }

        tracing::info!(tasks = self.state.store.len(), "HTTP server stopped");
        Ok(())
    }

    /// A clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Layer stack, outermost first. Panics are caught inside the trace layer so
/// the 500 still carries the trace ID.
#[allow(deprecated)]
fn with_middleware(router: Router<AppState>, config: &AppConfig) -> Router<AppState> {
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(trace_requests))
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            ))),
    )
}
