//! In-memory task repository.
//!
//! Backs the service when `DATABASE_URL` uses the `memory://` scheme, and is
//! what the test suite runs against.
//!
//! # Features
//!
//! - Thread-safe with `Arc<RwLock<...>>`
//! - Store-assigned ids (UUID v7) and timestamps
//! - Insertion sequence numbers keep `find_all` ordering stable when two
//!   tasks share a creation timestamp

use std::collections::HashMap;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::domain::{NewTask, Task, TaskId, TaskPatch, Timestamp};
use crate::infrastructure::{RepositoryError, TaskRepository};

/// A stored task together with its insertion sequence number.
#[derive(Debug, Clone)]
struct StoredTask {
    sequence: u64,
    task: Task,
}

#[derive(Debug, Default)]
struct Collection {
    documents: HashMap<TaskId, StoredTask>,
    next_sequence: u64,
}

/// In-memory implementation of `TaskRepository`.
///
/// # Example
///
/// ```ignore
/// use todo_api::infrastructure::InMemoryTaskRepository;
///
/// let repository = InMemoryTaskRepository::new();
/// let task = repository.insert(NewTask::titled("My Task")).await?;
/// let found = repository.find_by_id(&task.id).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    collection: Arc<RwLock<Collection>>,
}

impl InMemoryTaskRepository {
    /// Creates a new empty in-memory task repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[allow(clippy::significant_drop_tightening)]
impl TaskRepository for InMemoryTaskRepository {
    fn insert(&self, draft: NewTask) -> BoxFuture<'static, Result<Task, RepositoryError>> {
        let collection = Arc::clone(&self.collection);
        async move {
            let mut guard = collection.write().await;

            let task = Task::new(TaskId::generate(), draft, Timestamp::now());
            let sequence = guard.next_sequence;
            guard.next_sequence += 1;
            guard.documents.insert(
                task.id.clone(),
                StoredTask {
                    sequence,
                    task: task.clone(),
                },
            );

            Ok(task)
        }
        .boxed()
    }

    fn find_by_id(&self, id: &TaskId) -> BoxFuture<'static, Result<Option<Task>, RepositoryError>> {
        let collection = Arc::clone(&self.collection);
        let id = id.clone();
        async move {
            let guard = collection.read().await;
            Ok(guard.documents.get(&id).map(|stored| stored.task.clone()))
        }
        .boxed()
    }

    fn find_all(&self) -> BoxFuture<'static, Result<Vec<Task>, RepositoryError>> {
        let collection = Arc::clone(&self.collection);
        async move {
            let guard = collection.read().await;

            let mut stored: Vec<&StoredTask> = guard.documents.values().collect();
            stored.sort_by(|left, right| {
                right
                    .task
                    .created_at
                    .cmp(&left.task.created_at)
                    .then(right.sequence.cmp(&left.sequence))
            });

            Ok(stored.into_iter().map(|entry| entry.task.clone()).collect())
        }
        .boxed()
    }

    fn update(
        &self,
        id: &TaskId,
        patch: TaskPatch,
    ) -> BoxFuture<'static, Result<Option<Task>, RepositoryError>> {
        let collection = Arc::clone(&self.collection);
        let id = id.clone();
        async move {
            let mut guard = collection.write().await;

            let Some(stored) = guard.documents.get_mut(&id) else {
                return Ok(None);
            };

            let updated = patch.apply(stored.task.clone(), Timestamp::now());
            stored.task = updated.clone();

            Ok(Some(updated))
        }
        .boxed()
    }

    fn delete(&self, id: &TaskId) -> BoxFuture<'static, Result<bool, RepositoryError>> {
        let collection = Arc::clone(&self.collection);
        let id = id.clone();
        async move {
            let mut guard = collection.write().await;
            Ok(guard.documents.remove(&id).is_some())
        }
        .boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn repository() -> InMemoryTaskRepository {
        InMemoryTaskRepository::new()
    }

    #[rstest]
    #[tokio::test]
    async fn test_find_by_id_not_found(repository: InMemoryTaskRepository) {
        let result = repository.find_by_id(&TaskId::generate()).await;

        assert_eq!(result, Ok(None));
    }

    #[rstest]
    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamps(repository: InMemoryTaskRepository) {
        let task = repository
            .insert(NewTask::titled("Write report"))
            .await
            .unwrap();

        assert_eq!(task.title, "Write report");
        assert!(!task.completed);
        assert_eq!(task.created_at, task.updated_at);

        let found = repository.find_by_id(&task.id).await.unwrap();
        assert_eq!(found, Some(task));
    }

    #[rstest]
    #[tokio::test]
    async fn test_find_all_newest_first(repository: InMemoryTaskRepository) {
        let first = repository.insert(NewTask::titled("A")).await.unwrap();
        let second = repository.insert(NewTask::titled("B")).await.unwrap();
        let third = repository.insert(NewTask::titled("C")).await.unwrap();

        let all = repository.find_all().await.unwrap();
        let ids: Vec<TaskId> = all.into_iter().map(|task| task.id).collect();

        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_find_all_empty(repository: InMemoryTaskRepository) {
        assert_eq!(repository.find_all().await.unwrap(), Vec::new());
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_applies_patch(repository: InMemoryTaskRepository) {
        let task = repository.insert(NewTask::titled("Call mom")).await.unwrap();

        let updated = repository
            .update(&task.id, TaskPatch::completed(true))
            .await
            .unwrap()
            .unwrap();

        assert!(updated.completed);
        assert_eq!(updated.title, task.title);
        assert_eq!(updated.created_at, task.created_at);
        assert!(updated.updated_at >= task.updated_at);

        let stored = repository.find_by_id(&task.id).await.unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_missing_returns_none(repository: InMemoryTaskRepository) {
        let result = repository
            .update(&TaskId::generate(), TaskPatch::completed(true))
            .await;

        assert_eq!(result, Ok(None));
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete(repository: InMemoryTaskRepository) {
        let task = repository.insert(NewTask::titled("Temp")).await.unwrap();

        assert_eq!(repository.delete(&task.id).await, Ok(true));
        assert_eq!(repository.delete(&task.id).await, Ok(false));
        assert_eq!(repository.find_by_id(&task.id).await, Ok(None));
    }
}
