//! Common test helpers for integration tests.
//!
//! # Note
//!
//! The `#![allow(dead_code)]` attribute is necessary because Rust compiles each
//! integration test file as a separate crate, and not every file uses every
//! helper.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use futures::FutureExt;
use futures::future::BoxFuture;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

use todo_api::api::{AppState, create_router};
use todo_api::application::TaskService;
use todo_api::domain::{NewTask, Task, TaskId, TaskPatch};
use todo_api::infrastructure::{
    CorsOrigin, InMemoryTaskRepository, RepositoryError, TaskRepository,
};

// =============================================================================
// App Construction
// =============================================================================

/// Creates a router over the given repository.
pub fn create_test_app_with(repository: Arc<dyn TaskRepository>) -> Router {
    create_router(
        AppState::new(TaskService::new(repository)),
        &CorsOrigin::Any,
    )
}

/// Creates a router over a fresh in-memory store.
pub fn create_test_app() -> Router {
    create_test_app_with(Arc::new(InMemoryTaskRepository::new()))
}

/// Binds `router` to an ephemeral local port and returns its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let address = listener.local_addr().expect("No local address");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server failed");
    });

    format!("http://{address}")
}

// =============================================================================
// Request Helpers
// =============================================================================

/// A collected response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parses the body as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Response body is not JSON")
    }

    /// Returns the body as UTF-8 text.
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Response body is not UTF-8")
    }
}

/// Sends one request through the router in-process.
pub async fn send(router: &Router, method: Method, uri: &str, body: Option<&str>) -> TestResponse {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("Router is infallible");

    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect body")
        .to_bytes()
        .to_vec();

    TestResponse { status, body }
}

pub async fn get(router: &Router, uri: &str) -> TestResponse {
    send(router, Method::GET, uri, None).await
}

pub async fn post_json(router: &Router, uri: &str, body: &Value) -> TestResponse {
    send(router, Method::POST, uri, Some(&body.to_string())).await
}

pub async fn put_json(router: &Router, uri: &str, body: &Value) -> TestResponse {
    send(router, Method::PUT, uri, Some(&body.to_string())).await
}

pub async fn delete(router: &Router, uri: &str) -> TestResponse {
    send(router, Method::DELETE, uri, None).await
}

// =============================================================================
// Faulty Repositories
// =============================================================================

/// A store whose every operation fails.
#[derive(Debug, Default)]
pub struct FailingTaskRepository;

impl FailingTaskRepository {
    fn failure<T: Send + 'static>() -> BoxFuture<'static, Result<T, RepositoryError>> {
        async {
            Err(RepositoryError::DatabaseError(
                "connection to server at \"db.internal\" failed".to_string(),
            ))
        }
        .boxed()
    }
}

impl TaskRepository for FailingTaskRepository {
    fn insert(&self, _draft: NewTask) -> BoxFuture<'static, Result<Task, RepositoryError>> {
        Self::failure()
    }

    fn find_by_id(&self, _id: &TaskId) -> BoxFuture<'static, Result<Option<Task>, RepositoryError>> {
        Self::failure()
    }

    fn find_all(&self) -> BoxFuture<'static, Result<Vec<Task>, RepositoryError>> {
        Self::failure()
    }

    fn update(
        &self,
        _id: &TaskId,
        _patch: TaskPatch,
    ) -> BoxFuture<'static, Result<Option<Task>, RepositoryError>> {
        Self::failure()
    }

    fn delete(&self, _id: &TaskId) -> BoxFuture<'static, Result<bool, RepositoryError>> {
        Self::failure()
    }
}

/// A store that panics while listing and otherwise behaves like the in-memory store.
#[derive(Debug, Default)]
pub struct PanickingTaskRepository {
    inner: InMemoryTaskRepository,
}

impl TaskRepository for PanickingTaskRepository {
    fn insert(&self, draft: NewTask) -> BoxFuture<'static, Result<Task, RepositoryError>> {
        self.inner.insert(draft)
    }

    fn find_by_id(&self, id: &TaskId) -> BoxFuture<'static, Result<Option<Task>, RepositoryError>> {
        self.inner.find_by_id(id)
    }

    fn find_all(&self) -> BoxFuture<'static, Result<Vec<Task>, RepositoryError>> {
        futures::future::lazy(|_| -> Result<Vec<Task>, RepositoryError> {
            panic!("index corrupted")
        })
        .boxed()
    }

    fn update(
        &self,
        id: &TaskId,
        patch: TaskPatch,
    ) -> BoxFuture<'static, Result<Option<Task>, RepositoryError>> {
        self.inner.update(id, patch)
    }

    fn delete(&self, id: &TaskId) -> BoxFuture<'static, Result<bool, RepositoryError>> {
        self.inner.delete(id)
    }
}
