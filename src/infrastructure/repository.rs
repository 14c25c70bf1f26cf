//! Repository trait for the task document collection.
//!
//! Every method returns a boxed `'static` future so the trait stays object
//! safe and can sit behind `Arc<dyn TaskRepository>` in the application state.
//! Implementations clone what they need out of `&self` before building the
//! future.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{NewTask, Task, TaskId, TaskPatch};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
///
/// A missing document is not an error here; lookups return `Option` and
/// deletes return `bool`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Database connection or query error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// =============================================================================
// Task Repository
// =============================================================================

/// The persistence collection for tasks.
///
/// The store assigns ids and both timestamps. Writes are single-document and
/// unconditional: the last writer wins.
pub trait TaskRepository: Send + Sync {
    /// Persists a new task and returns the stored record.
    fn insert(&self, draft: NewTask) -> BoxFuture<'static, Result<Task, RepositoryError>>;

    /// Finds a task by its ID.
    ///
    /// Returns `Ok(Some(task))` if found, `Ok(None)` if not found.
    fn find_by_id(&self, id: &TaskId) -> BoxFuture<'static, Result<Option<Task>, RepositoryError>>;

    /// Returns every task, newest `created_at` first.
    ///
    /// Tasks created at the same instant come back in reverse insertion order.
    fn find_all(&self) -> BoxFuture<'static, Result<Vec<Task>, RepositoryError>>;

    /// Applies `patch` to the task and refreshes `updated_at`.
    ///
    /// Returns the updated record, or `Ok(None)` if the task doesn't exist.
    fn update(
        &self,
        id: &TaskId,
        patch: TaskPatch,
    ) -> BoxFuture<'static, Result<Option<Task>, RepositoryError>>;

    /// Deletes a task by its ID.
    ///
    /// Returns `Ok(true)` if the task was deleted, `Ok(false)` if it didn't exist.
    fn delete(&self, id: &TaskId) -> BoxFuture<'static, Result<bool, RepositoryError>>;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_repository_error_display() {
        let error = RepositoryError::DatabaseError("connection refused".to_string());
        assert_eq!(format!("{error}"), "Database error: connection refused");

        let error = RepositoryError::SerializationError("missing field `title`".to_string());
        assert_eq!(
            format!("{error}"),
            "Serialization error: missing field `title`"
        );
    }
}
