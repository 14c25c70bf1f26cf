//! HTTP handlers for the task API.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use super::dto::{CreateTaskRequest, MessageResponse, TaskResponse, UpdateTaskRequest};
use super::error::ApiErrorResponse;
use crate::application::TaskService;
use crate::domain::{CreateTaskInput, validate_new_task};

const LIVENESS_MESSAGE: &str = "TODO API is running";
const TASK_DELETED: &str = "Task deleted successfully";
const ROUTE_NOT_FOUND: &str = "Route not found";

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Task service.
    pub service: TaskService,
}

impl AppState {
    /// Creates application state around a service.
    #[must_use]
    pub const fn new(service: TaskService) -> Self {
        Self { service }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /`
pub async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

/// `GET /api/tasks`
///
/// # Errors
///
/// Returns 500 if the store fails.
pub async fn list_tasks(
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskResponse>>, ApiErrorResponse> {
    let tasks = state.service.list().await?;
    Ok(Json(tasks.iter().map(TaskResponse::from).collect()))
}

/// `GET /api/tasks/{id}`
///
/// # Errors
///
/// Returns 404 if the task does not exist or the id is malformed.
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, ApiErrorResponse> {
    let task = state.service.get(&id).await?;
    Ok(Json(TaskResponse::from(task)))
}

/// `POST /api/tasks`
///
/// The body shape is validated here before the service is called, so a bad
/// request never reaches the store.
///
/// # Errors
///
/// Returns 400 with field errors if the body is malformed or invalid.
pub async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiErrorResponse> {
    let Json(request) = body?;
    let input = CreateTaskInput::from(request);

    if let Err(error) = validate_new_task(&input) {
        tracing::warn!(errors = ?error.errors, "Create request rejected");
        return Err(error.into());
    }

    let task = state.service.create(input).await?;
    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

/// `PUT /api/tasks/{id}`
///
/// # Errors
///
/// Returns 404 if the task does not exist, 400 if a supplied field is invalid.
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiErrorResponse> {
    let Json(request) = body?;
    let task = state.service.update(&id, request.into()).await?;
    Ok(Json(TaskResponse::from(task)))
}

/// `DELETE /api/tasks/{id}`
///
/// # Errors
///
/// Returns 404 if the task does not exist.
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiErrorResponse> {
    state.service.delete(&id).await?;
    Ok(Json(MessageResponse::new(TASK_DELETED)))
}

/// Fallback for unmatched routes.
pub async fn route_not_found() -> ApiErrorResponse {
    ApiErrorResponse::not_found(ROUTE_NOT_FOUND)
}
