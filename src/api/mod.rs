//! HTTP API layer.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;

pub use dto::{CreateTaskRequest, MessageResponse, TaskResponse, UpdateTaskRequest};
pub use error::{ApiErrorResponse, ErrorBody};
pub use handlers::AppState;
pub use routes::create_router;
