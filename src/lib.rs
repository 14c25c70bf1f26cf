//! Task management REST API.
//!
//! A small CRUD service over a document store together with the state model
//! and HTTP client used by the task board front end.
//!
//! # Architecture
//!
//! - **Domain Layer**: the `Task` entity, value objects and the shared validator
//! - **Application Layer**: `TaskService`, the five task operations
//! - **Infrastructure Layer**: configuration, repository trait and its
//!   in-memory / `PostgreSQL` implementations
//! - **API Layer**: axum handlers, DTOs, error mapping and routing
//! - **Client**: immutable view-state snapshot, pure transitions and a
//!   `reqwest` based API client

pub mod api;
pub mod application;
pub mod client;
pub mod domain;
pub mod infrastructure;
