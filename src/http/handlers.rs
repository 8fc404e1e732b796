//! Route handlers.
//!
//! Each handler is a thin translation between HTTP and a [`TaskStore`]
//! operation. Failures are returned as [`ApiError`] so the body always carries
//! the trace ID.
//!
//! [`TaskStore`]: crate::tasks::TaskStore

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::http::request::{CreateTaskRequest, JsonBody, TraceId, UpdateTaskRequest};
use crate::http::response::{
    ApiError, HealthResponse, MessageResponse, TaskError, TaskListResponse, TaskResponse,
};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::tasks::TaskId;

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::up())
}

/// `GET /metrics` in Prometheus text format. Only routed when a recorder is
/// installed, which supplies the handle.
pub async fn prometheus_metrics(
    State(state): State<AppState>,
    Extension(handle): Extension<PrometheusHandle>,
) -> Response {
    let body = metrics::render(&handle, state.store.len(), state.started_at);
    ([(header::CONTENT_TYPE, metrics::CONTENT_TYPE)], body).into_response()
}

/// `GET /tasks`
pub async fn list_tasks(State(state): State<AppState>, trace_id: TraceId) -> Json<TaskListResponse> {
    Json(TaskListResponse {
        trace_id,
        data: state.store.list(),
    })
}

/// `POST /tasks`
pub async fn create_task(
    State(state): State<AppState>,
    trace_id: TraceId,
    body: JsonBody<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let JsonBody::Parsed(request) = body else {
        return Err(TaskError::InvalidBody.with_trace(trace_id));
    };
    let title = request
        .title
        .filter(|title| !title.is_empty())
        .ok_or(TaskError::TitleRequired.with_trace(trace_id))?;

    let task = state.store.append(title);
    tracing::debug!(trace_id = %trace_id, task_id = %task.id, "Task created");

    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            trace_id,
            message: "Task created".to_string(),
            task,
        }),
    ))
}

/// `PUT /tasks/{id}`
///
/// Only `completed` is mutable; when the body omits it the task is returned
/// unchanged.
///
/// Unparseable JSON is rejected first. A body that parses but has mistyped
/// fields only matters once the task is known to exist.
pub async fn update_task(
    State(state): State<AppState>,
    trace_id: TraceId,
    Path(id): Path<String>,
    body: JsonBody<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let invalid_body = TaskError::InvalidBody.with_trace(trace_id);
    if matches!(body, JsonBody::Malformed) {
        return Err(invalid_body);
    }

    let not_found = TaskError::TaskNotFound.with_trace(trace_id);
    let id: TaskId = id.parse().map_err(|_| not_found)?;

    let JsonBody::Parsed(request) = body else {
        return Err(match state.store.find_by_id(id) {
            Some(_) => invalid_body,
            None => not_found,
        });
    };

    let task = match request.completed {
        Some(completed) => state.store.update_completed(id, completed),
        None => state.store.find_by_id(id),
    }
    .ok_or(not_found)?;

    tracing::debug!(trace_id = %trace_id, task_id = %id, completed = task.completed, "Task updated");

    Ok(Json(TaskResponse {
        trace_id,
        message: "Task updated".to_string(),
        task,
    }))
}

/// `DELETE /tasks/{id}`
pub async fn delete_task(
    State(state): State<AppState>,
    trace_id: TraceId,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let not_found = TaskError::TaskNotFound.with_trace(trace_id);
    let id: TaskId = id.parse().map_err(|_| not_found)?;

    state.store.remove(id).ok_or(not_found)?;
    tracing::debug!(trace_id = %trace_id, task_id = %id, "Task deleted");

    Ok(Json(MessageResponse {
        trace_id,
        message: "Task deleted".to_string(),
    }))
}

/// Fallback for unknown routes.
pub async fn route_not_found(trace_id: TraceId) -> ApiError {
    TaskError::RouteNotFound.with_trace(trace_id)
}
