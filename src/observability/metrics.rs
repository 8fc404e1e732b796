//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Install the Prometheus recorder behind the `metrics` facade
//! - Record per-request counters and latency
//! - Refresh process and store gauges at scrape time
//!
//! # Metrics
//! - `task_api_requests_total` (counter): requests by method, path, status
//! - `task_api_request_duration_seconds` (histogram): latency distribution
//! - `task_api_tasks` (gauge): tasks currently held
//! - `process_uptime_seconds` (gauge): time since the server started
//! - `process_resident_memory_bytes` (gauge): RSS, Linux only
//!
//! # Design Decisions
//! - The recorder is process-global, so installation is idempotent
//! - `path` is the matched route template, which keeps label cardinality bounded

use std::time::{Duration, Instant};

use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

pub const REQUESTS_TOTAL: &str = "task_api_requests_total";
pub const REQUEST_DURATION: &str = "task_api_request_duration_seconds";
pub const TASKS: &str = "task_api_tasks";
pub const UPTIME: &str = "process_uptime_seconds";
pub const RESIDENT_MEMORY: &str = "process_resident_memory_bytes";

/// Content type of the Prometheus text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

const LATENCY_BUCKETS: &[f64] = &[
    0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

static HANDLE: Mutex<Option<PrometheusHandle>> = parking_lot::const_mutex(None);

/// Install the global Prometheus recorder, or return the existing handle.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let mut slot = HANDLE.lock();
    if let Some(handle) = slot.as_ref() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION.to_string()),
            LATENCY_BUCKETS,
        )?
        .install_recorder()?;

    metrics::describe_counter!(REQUESTS_TOTAL, "Total HTTP requests by method, path and status");
    metrics::describe_histogram!(
        REQUEST_DURATION,
        metrics::Unit::Seconds,
        "HTTP request latency"
    );
    metrics::describe_gauge!(TASKS, "Tasks currently held in memory");
    metrics::describe_gauge!(UPTIME, metrics::Unit::Seconds, "Process uptime");
    metrics::describe_gauge!(RESIDENT_MEMORY, metrics::Unit::Bytes, "Resident set size");

    tracing::debug!("Prometheus recorder installed");
    *slot = Some(handle.clone());
    Ok(handle)
}

/// Record one completed request.
pub fn record_request(method: &str, path: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let path = path.to_string();
    let status = status.to_string();

    metrics::counter!(
        REQUESTS_TOTAL,
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.clone()
    )
    .increment(1);

    metrics::histogram!(
        REQUEST_DURATION,
        "method" => method,
        "path" => path,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

/// Refresh scrape-time gauges and render the exposition text.
pub fn render(handle: &PrometheusHandle, tasks: usize, started_at: Instant) -> String {
    metrics::gauge!(TASKS).set(tasks as f64);
    metrics::gauge!(UPTIME).set(started_at.elapsed().as_secs_f64());
    if let Some(bytes) = resident_memory_bytes() {
        metrics::gauge!(RESIDENT_MEMORY).set(bytes as f64);
    }

    handle.render()
}

/// Periodically drain histogram buffers until shutdown.
pub fn spawn_upkeep(
    handle: PrometheusHandle,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(UPKEEP_INTERVAL);
        loop {
            tokio::select! {
                _ = interval.tick() => handle.run_upkeep(),
                _ = shutdown.recv() => break,
            }
        }
    })
}

#[cfg(target_os = "linux")]
fn resident_memory_bytes() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    parse_vm_rss(&status)
}

#[cfg(not(target_os = "linux"))]
fn resident_memory_bytes() -> Option<u64> {
    None
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_vm_rss(status: &str) -> Option<u64> {
    let line = status.lines().find(|line| line.starts_with("VmRSS:"))?;
    let kilobytes: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kilobytes * 1024)
}
