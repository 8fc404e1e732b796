//! Request handling.
//!
//! # Responsibilities
//! - Generate a unique trace ID (UUID v4) for every request
//! - Make the trace ID available to handlers as an extractor
//! - Emit one structured log record and metric sample per request
//! - Define the JSON request bodies accepted by the task routes
//!
//! # Design Decisions
//! - Trace ID assigned before any handler runs, echoed in `X-Trace-ID`
//! - Route template (not raw path) used as the metric label

use std::convert::Infallible;
use std::fmt;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, MatchedPath, Request},
    http::{header, request::Parts, HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::http::response::{PanicRecovered, TaskError};
use crate::observability::metrics;

/// Response header carrying the trace ID.
pub const X_TRACE_ID: HeaderName = HeaderName::from_static("x-trace-id");

/// Metric label for requests that matched no route.
const UNMATCHED_ROUTE: &str = "unmatched";

/// Opaque per-request identifier used to correlate logs, metrics and responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(Uuid);

impl TraceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Reads the ID set by [`trace_requests`]; a fresh one is generated when the
/// middleware is not installed.
impl<S> FromRequestParts<S> for TraceId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<TraceId>().copied().unwrap_or_default())
    }
}

/// Tag the request with a trace ID and record it once the response is final.
pub async fn trace_requests(mut request: Request, next: Next) -> Response {
    let start = Instant::now();
    let trace_id = TraceId::new();
    request.extensions_mut().insert(trace_id);

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());

    let mut response = next.run(request).await;

    // Responses produced outside the handlers get a traced JSON body too.
    let replacement = if response.extensions().get::<PanicRecovered>().is_some() {
        Some(TaskError::Internal)
    } else {
        match response.status() {
            StatusCode::METHOD_NOT_ALLOWED => Some(TaskError::MethodNotAllowed),
            StatusCode::REQUEST_TIMEOUT => Some(TaskError::Timeout),
            _ => None,
        }
    };
    if let Some(error) = replacement {
        let allow = response.headers().get(header::ALLOW).cloned();
        response = error.with_trace(trace_id).into_response();
        if let Some(allow) = allow {
            response.headers_mut().insert(header::ALLOW, allow);
        }
    }

    if let Ok(value) = HeaderValue::from_str(&trace_id.to_string()) {
        response.headers_mut().insert(X_TRACE_ID, value);
    }

    let status = response.status().as_u16();
    tracing::info!(
        trace_id = %trace_id,
        method = %method,
        path = %path,
        status,
        latency_ms = start.elapsed().as_secs_f64() * 1000.0,
        timestamp = %Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "Request completed"
    );
    metrics::record_request(method.as_str(), &route, status, start);

    response
}

/// A JSON request body, read leniently.
///
/// A body that is empty or not declared as JSON counts as `{}`. Well-formed
/// JSON with wrongly typed fields is kept apart from unparseable input, so a
/// handler can decide whether a missing resource outranks the bad field.
#[derive(Debug)]
pub enum JsonBody<T> {
    Parsed(T),
    /// Valid JSON that does not fit `T`.
    Mismatched,
    /// Not JSON at all, or the body could not be read.
    Malformed,
}

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = Infallible;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let declared_json = is_json_content_type(request.headers());

        let bytes = match Bytes::from_request(request, state).await {
            Ok(bytes) => bytes,
            Err(rejection) => {
                tracing::debug!(reason = %rejection.body_text(), "Failed to read request body");
                return Ok(Self::Malformed);
            }
        };

        if !declared_json || bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::Parsed(T::default()));
        }

        Ok(match serde_json::from_slice(&bytes) {
            Ok(value) => Self::Parsed(value),
            Err(e) if e.is_data() => {
                tracing::debug!(error = %e, "Request body has mistyped fields");
                Self::Mismatched
            }
            Err(e) => {
                tracing::debug!(error = %e, "Request body is not valid JSON");
                Self::Malformed
            }
        })
    }
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Body of `POST /tasks`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
}

/// Body of `PUT /tasks/{id}`. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub completed: Option<bool>,
}
