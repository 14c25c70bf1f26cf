//! HTTP client for the task API.

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::api::{CreateTaskRequest, MessageResponse, TaskResponse, UpdateTaskRequest};

const FETCH_FAILED: &str = "Failed to fetch tasks";
const CREATE_FAILED: &str = "Create failed";
const UPDATE_FAILED: &str = "Update failed";
const DELETE_FAILED: &str = "Delete failed";

/// Errors from a task API call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response, or the body was unreadable.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Api {
        /// Response status.
        status: StatusCode,
        /// Message taken from the body, or the per-operation default.
        message: String,
    },
}

impl ClientError {
    /// The message shown to the user.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// The response status, if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(_) => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Typed client for `/api/tasks`.
#[derive(Debug, Clone)]
pub struct TaskApiClient {
    client: Client,
    base_url: String,
}

impl TaskApiClient {
    /// Creates a client for the API at `base_url` (e.g. `http://localhost:5000`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Creates a client that reuses an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// `GET /api/tasks`
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on a transport fault or non-2xx response.
    pub async fn list_tasks(&self) -> ClientResult<Vec<TaskResponse>> {
        let response = self.client.get(self.url("/api/tasks")).send().await?;
        parse_response(response, FETCH_FAILED).await
    }

    /// `POST /api/tasks`
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on a transport fault or non-2xx response.
    pub async fn create_task(&self, request: &CreateTaskRequest) -> ClientResult<TaskResponse> {
        let response = self
            .client
            .post(self.url("/api/tasks"))
            .json(request)
            .send()
            .await?;
        parse_response(response, CREATE_FAILED).await
    }

    /// `PUT /api/tasks/{id}`
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on a transport fault or non-2xx response.
    pub async fn update_task(
        &self,
        id: &str,
        request: &UpdateTaskRequest,
    ) -> ClientResult<TaskResponse> {
        let response = self
            .client
            .put(self.url(&format!("/api/tasks/{id}")))
            .json(request)
            .send()
            .await?;
        parse_response(response, UPDATE_FAILED).await
    }

    /// `DELETE /api/tasks/{id}`
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on a transport fault or non-2xx response.
    pub async fn delete_task(&self, id: &str) -> ClientResult<MessageResponse> {
        let response = self
            .client
            .delete(self.url(&format!("/api/tasks/{id}")))
            .send()
            .await?;
        parse_response(response, DELETE_FAILED).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

async fn parse_response<T: DeserializeOwned>(
    response: Response,
    default_message: &str,
) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.json::<Value>().await.ok();
    let message = body
        .as_ref()
        .and_then(error_message)
        .unwrap_or_else(|| default_message.to_string());

    Err(ClientError::Api { status, message })
}

/// Picks `message`, else the first `errors[].message`.
fn error_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .or_else(|| {
            body.get("errors")
                .and_then(Value::as_array)
                .and_then(|errors| errors.first())
                .and_then(|error| error.get("message"))
                .and_then(Value::as_str)
        })
        .map(ToString::to_string)
}
