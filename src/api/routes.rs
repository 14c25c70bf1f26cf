//! Routing definitions for the task API.

use std::any::Any;

use axum::Router;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::error::ApiErrorResponse;
use super::handlers::{
    AppState, create_task, delete_task, get_task, list_tasks, liveness, route_not_found,
    update_task,
};
use crate::infrastructure::CorsOrigin;

/// Creates the API router with all routes and middleware.
///
/// # Examples
///
/// ```ignore
/// let state = AppState::new(TaskService::new(repository));
/// let router = create_router(state, &CorsOrigin::Any);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
/// axum::serve(listener, router).await?;
/// ```
pub fn create_router(state: AppState, cors_origin: &CorsOrigin) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .fallback(route_not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer(cors_origin))
}

/// Creates the CORS layer for the configured origins.
///
/// Origins that are not valid header values are skipped with a warning.
fn create_cors_layer(cors_origin: &CorsOrigin) -> CorsLayer {
    let allow_origin = match cors_origin {
        CorsOrigin::Any => AllowOrigin::from(AnyOrigin),
        CorsOrigin::List(origins) => AllowOrigin::list(origins.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|_| tracing::warn!(origin, "Ignoring invalid CORS origin"))
                .ok()
        })),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin)
}

/// Maps a handler panic to the generic 500 body.
fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");

    tracing::error!(panic = detail, "Handler panicked");
    ApiErrorResponse::internal_error().into_response()
}
