//! Task service: the five task operations over a [`TaskRepository`].
//!
//! Every write goes through the shared validators in `crate::domain`, so the
//! service enforces the title rules even when it is called without the HTTP
//! layer in front of it.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::{
    CreateTaskInput, Task, TaskId, UpdateTaskInput, ValidationError, validate_new_task,
    validate_patch,
};
use crate::infrastructure::{RepositoryError, TaskRepository};

/// Errors returned by [`TaskService`] operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// One or more supplied fields are invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The task does not exist, or the id is not a valid identifier.
    #[error("Task not found")]
    NotFound,

    /// The store failed.
    #[error(transparent)]
    Unexpected(#[from] RepositoryError),
}

/// Request/response logic for tasks.
#[derive(Clone)]
pub struct TaskService {
    repository: Arc<dyn TaskRepository>,
}

impl std::fmt::Debug for TaskService {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("TaskService")
            .field("repository", &"Arc<dyn TaskRepository>")
            .finish()
    }
}

impl TaskService {
    /// Creates a service over the given repository.
    #[must_use]
    pub const fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }

    /// Returns every task, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Unexpected` if the store fails.
    pub async fn list(&self) -> Result<Vec<Task>, ServiceError> {
        let tasks = self.repository.find_all().await.map_err(log_unexpected)?;
        tracing::debug!(count = tasks.len(), "Listed tasks");
        Ok(tasks)
    }

    /// Returns a single task.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` for a missing or malformed id.
    pub async fn get(&self, id: &str) -> Result<Task, ServiceError> {
        let task_id = parse_id(id)?;
        let task = self
            .repository
            .find_by_id(&task_id)
            .await
            .map_err(log_unexpected)?
            .ok_or(ServiceError::NotFound)?;

        tracing::debug!(task_id = %task.id, "Fetched task");
        Ok(task)
    }

    /// Validates and persists a new task.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if the title or due date is invalid.
    pub async fn create(&self, input: CreateTaskInput) -> Result<Task, ServiceError> {
        let draft = validate_new_task(&input).map_err(log_validation)?;
        let task = self
            .repository
            .insert(draft)
            .await
            .map_err(log_unexpected)?;

        tracing::info!(task_id = %task.id, "Task created");
        Ok(task)
    }

    /// Applies a partial update.
    ///
    /// Only the supplied fields are validated; `updatedAt` is refreshed even
    /// when nothing else changes.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` for a missing or malformed id, and
    /// `ServiceError::Validation` if a supplied field is invalid.
    pub async fn update(&self, id: &str, input: UpdateTaskInput) -> Result<Task, ServiceError> {
        let task_id = parse_id(id)?;
        let patch = validate_patch(&input).map_err(log_validation)?;
        let task = self
            .repository
            .update(&task_id, patch)
            .await
            .map_err(log_unexpected)?
            .ok_or(ServiceError::NotFound)?;

        tracing::info!(task_id = %task.id, completed = task.completed, "Task updated");
        Ok(task)
    }

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` for a missing or malformed id.
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let task_id = parse_id(id)?;
        let deleted = self
            .repository
            .delete(&task_id)
            .await
            .map_err(log_unexpected)?;

        if !deleted {
            return Err(ServiceError::NotFound);
        }

        tracing::info!(%task_id, "Task deleted");
        Ok(())
    }
}

fn parse_id(id: &str) -> Result<TaskId, ServiceError> {
    TaskId::parse(id).ok_or_else(|| {
        tracing::debug!(id, "Rejected malformed task id");
        ServiceError::NotFound
    })
}

fn log_validation(error: ValidationError) -> ServiceError {
    tracing::warn!(errors = ?error.errors, "Task validation failed");
    ServiceError::Validation(error)
}

fn log_unexpected(error: RepositoryError) -> ServiceError {
    tracing::error!(%error, "Task store failure");
    ServiceError::Unexpected(error)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldError;
    use crate::infrastructure::InMemoryTaskRepository;
    use rstest::{fixture, rstest};

    #[fixture]
    fn service() -> TaskService {
        TaskService::new(Arc::new(InMemoryTaskRepository::new()))
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_then_get(service: TaskService) {
        let created = service
            .create(CreateTaskInput::titled("  Buy milk  "))
            .await
            .unwrap();

        let fetched = service.get(&created.id.to_string()).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.title, "Buy milk");
        assert_eq!(fetched.description, "");
        assert!(!fetched.completed);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[tokio::test]
    async fn test_create_blank_title_fails(service: TaskService, #[case] title: &str) {
        let error = service
            .create(CreateTaskInput::titled(title))
            .await
            .unwrap_err();

        assert_eq!(
            error,
            ServiceError::Validation(ValidationError::new(vec![FieldError::new(
                "title",
                "Title is required"
            )]))
        );
        assert!(service.list().await.unwrap().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_title_too_long_fails(service: TaskService) {
        let error = service
            .create(CreateTaskInput::titled("x".repeat(201)))
            .await
            .unwrap_err();

        assert!(matches!(error, ServiceError::Validation(_)));
    }

    #[rstest]
    #[tokio::test]
    async fn test_list_newest_first(service: TaskService) {
        for title in ["A", "B", "C"] {
            service.create(CreateTaskInput::titled(title)).await.unwrap();
        }

        let titles: Vec<String> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|task| task.title)
            .collect();

        assert_eq!(titles, vec!["C", "B", "A"]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_completed_only(service: TaskService) {
        let created = service
            .create(CreateTaskInput::titled("Call mom"))
            .await
            .unwrap();

        let updated = service
            .update(
                &created.id.to_string(),
                UpdateTaskInput {
                    completed: Some(true),
                    ..UpdateTaskInput::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.completed);
        assert_eq!(
            Task {
                completed: created.completed,
                updated_at: created.updated_at,
                ..updated.clone()
            },
            created
        );
        assert!(updated.updated_at >= created.updated_at);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_rejects_blank_title(service: TaskService) {
        let created = service
            .create(CreateTaskInput::titled("Keep me"))
            .await
            .unwrap();

        let error = service
            .update(
                &created.id.to_string(),
                UpdateTaskInput {
                    title: Some(" ".to_string()),
                    ..UpdateTaskInput::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(error, ServiceError::Validation(_)));
        assert_eq!(
            service.get(&created.id.to_string()).await.unwrap().title,
            "Keep me"
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_then_get_not_found(service: TaskService) {
        let created = service
            .create(CreateTaskInput::titled("Temp"))
            .await
            .unwrap();
        let id = created.id.to_string();

        service.delete(&id).await.unwrap();

        assert_eq!(service.get(&id).await, Err(ServiceError::NotFound));
        assert_eq!(service.delete(&id).await, Err(ServiceError::NotFound));
    }

    #[rstest]
    #[case("not-an-id")]
    #[case("64b7f0c2e4b0a1a2b3c4d5e6")]
    #[case("0190a5b2-0000-7000-8000-000000000000")]
    #[tokio::test]
    async fn test_unknown_or_malformed_id_not_found(service: TaskService, #[case] id: &str) {
        assert_eq!(service.get(id).await, Err(ServiceError::NotFound));
        assert_eq!(
            service.update(id, UpdateTaskInput::default()).await,
            Err(ServiceError::NotFound)
        );
        assert_eq!(service.delete(id).await, Err(ServiceError::NotFound));
    }
}
