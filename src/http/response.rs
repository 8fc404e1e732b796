//! Response envelopes and error mapping.
//!
//! # Responsibilities
//! - Define the JSON shapes returned by every route
//! - Map task errors to HTTP status codes
//! - Turn handler panics into a generic 500
//!
//! # Design Decisions
//! - Every error body carries the trace ID
//! - Panic payloads are logged, never returned to the caller

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http::request::TraceId;
use crate::tasks::Task;

/// `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn up() -> Self {
        Self {
            status: "UP".to_string(),
        }
    }
}

/// `GET /tasks`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListResponse {
    pub trace_id: TraceId,
    pub data: Vec<Task>,
}

/// `POST /tasks` and `PUT /tasks/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub trace_id: TraceId,
    pub message: String,
    pub task: Task,
}

/// `DELETE /tasks/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub trace_id: TraceId,
    pub message: String,
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub trace_id: TraceId,
    pub error: String,
}

/// Failures a request can end in. The display text is the `error` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("Title is required")]
    TitleRequired,

    #[error("Invalid request body")]
    InvalidBody,

    #[error("Task not found")]
    TaskNotFound,

    #[error("Not found")]
    RouteNotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Request timed out")]
    Timeout,

    #[error("Internal server error")]
    Internal,
}

impl TaskError {
    pub fn status(&self) -> StatusCode {
        match self {
            TaskError::TitleRequired | TaskError::InvalidBody => StatusCode::BAD_REQUEST,
            TaskError::TaskNotFound | TaskError::RouteNotFound => StatusCode::NOT_FOUND,
            TaskError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            TaskError::Timeout => StatusCode::REQUEST_TIMEOUT,
            TaskError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Attach the request's trace ID.
    pub fn with_trace(self, trace_id: TraceId) -> ApiError {
        ApiError {
            trace_id,
            error: self,
        }
    }
}

/// A [`TaskError`] bound to the request it happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{error} (trace {trace_id})")]
pub struct ApiError {
    pub trace_id: TraceId,
    pub error: TaskError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            trace_id: self.trace_id,
            error: self.error.to_string(),
        };
        (self.error.status(), Json(body)).into_response()
    }
}

/// Response extension marking a response produced by [`panic_response`].
#[derive(Debug, Clone, Copy)]
pub struct PanicRecovered;

/// Build the response for a panicking handler.
///
/// The trace middleware sits outside the panic boundary and replaces this
/// body with one that carries the trace ID.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(panic = %detail, "Handler panicked");

    let mut response = (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": TaskError::Internal.to_string() })),
    )
        .into_response();
    response.extensions_mut().insert(PanicRecovered);
    response
}
