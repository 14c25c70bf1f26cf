//! `PostgreSQL` task repository.
//!
//! Tasks are stored as JSONB documents keyed by UUID, with the two
//! store-managed timestamps kept as columns next to the document. Partial
//! updates are JSONB merges (`data || patch`), so the database applies each
//! write atomically on a single row.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE tasks (
//!     id UUID PRIMARY KEY,
//!     data JSONB NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL,
//!     updated_at TIMESTAMPTZ NOT NULL
//! );
//! CREATE INDEX idx_tasks_created_at ON tasks (created_at DESC, id DESC);
//! ```

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{DueDate, NewTask, Task, TaskId, TaskPatch, Timestamp};
use crate::infrastructure::{RepositoryError, TaskRepository};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS tasks (\
     id UUID PRIMARY KEY, \
     data JSONB NOT NULL, \
     created_at TIMESTAMPTZ NOT NULL, \
     updated_at TIMESTAMPTZ NOT NULL)";

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks (created_at DESC, id DESC)";

/// Row shape returned by every query: `(id, data, created_at, updated_at)`.
type TaskRow = (Uuid, serde_json::Value, DateTime<Utc>, DateTime<Utc>);

// =============================================================================
// Document Mapping
// =============================================================================

/// The JSONB document stored in `tasks.data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskDocument {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    due_date: Option<DueDate>,
}

impl From<&NewTask> for TaskDocument {
    fn from(draft: &NewTask) -> Self {
        Self {
            title: draft.title.clone(),
            description: draft.description.clone(),
            completed: false,
            due_date: draft.due_date,
        }
    }
}

/// Converts a patch into the JSON object merged into the stored document.
///
/// Absent fields are left out of the object; a cleared due date becomes an
/// explicit `null`.
fn patch_document(patch: &TaskPatch) -> serde_json::Value {
    let mut object = serde_json::Map::new();

    if let Some(title) = &patch.title {
        object.insert("title".to_string(), serde_json::Value::from(title.clone()));
    }
    if let Some(description) = &patch.description {
        object.insert(
            "description".to_string(),
            serde_json::Value::from(description.clone()),
        );
    }
    if let Some(completed) = patch.completed {
        object.insert("completed".to_string(), serde_json::Value::from(completed));
    }
    if let Some(due_date) = &patch.due_date {
        object.insert(
            "dueDate".to_string(),
            due_date.map_or(serde_json::Value::Null, |due| {
                serde_json::Value::from(due.to_rfc3339())
            }),
        );
    }

    serde_json::Value::Object(object)
}

fn row_to_task((id, data, created_at, updated_at): TaskRow) -> Result<Task, RepositoryError> {
    let document: TaskDocument = serde_json::from_value(data)
        .map_err(|error| RepositoryError::SerializationError(error.to_string()))?;

    Ok(Task {
        id: TaskId::from_uuid(id),
        title: document.title,
        description: document.description,
        completed: document.completed,
        due_date: document.due_date,
        created_at: Timestamp::from_datetime(created_at),
        updated_at: Timestamp::from_datetime(updated_at),
    })
}

fn database_error(error: &sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(error.to_string())
}

// =============================================================================
// PostgreSQL Task Repository
// =============================================================================

/// `PostgreSQL` implementation of `TaskRepository`.
///
/// # Example
///
/// ```ignore
/// let pool = PgPool::connect("postgres://localhost/todo").await?;
/// let repository = PostgresTaskRepository::new(pool);
/// repository.ensure_schema().await?;
///
/// let task = repository.insert(NewTask::titled("My Task")).await?;
/// ```
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new `PostgreSQL` task repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `tasks` table and its ordering index if they are missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if either statement fails.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|error| database_error(&error))?;
        sqlx::query(CREATE_INDEX)
            .execute(&self.pool)
            .await
            .map_err(|error| database_error(&error))?;
        Ok(())
    }
}

impl TaskRepository for PostgresTaskRepository {
    fn insert(&self, draft: NewTask) -> BoxFuture<'static, Result<Task, RepositoryError>> {
        let pool = self.pool.clone();
        async move {
            let document = serde_json::to_value(TaskDocument::from(&draft))
                .map_err(|error| RepositoryError::SerializationError(error.to_string()))?;

            // One clock reading so created_at and updated_at start out equal.
            let row: TaskRow = sqlx::query_as(
                "WITH clock AS (SELECT clock_timestamp() AS ts) \
                 INSERT INTO tasks (id, data, created_at, updated_at) \
                 SELECT $1, $2, clock.ts, clock.ts FROM clock \
                 RETURNING id, data, created_at, updated_at",
            )
            .bind(*TaskId::generate().as_uuid())
            .bind(&document)
            .fetch_one(&pool)
            .await
            .map_err(|error| database_error(&error))?;

            row_to_task(row)
        }
        .boxed()
    }

    fn find_by_id(&self, id: &TaskId) -> BoxFuture<'static, Result<Option<Task>, RepositoryError>> {
        let pool = self.pool.clone();
        let task_id = *id.as_uuid();
        async move {
            let row: Option<TaskRow> = sqlx::query_as(
                "SELECT id, data, created_at, updated_at FROM tasks WHERE id = $1",
            )
            .bind(task_id)
            .fetch_optional(&pool)
            .await
            .map_err(|error| database_error(&error))?;

            row.map(row_to_task).transpose()
        }
        .boxed()
    }

    fn find_all(&self) -> BoxFuture<'static, Result<Vec<Task>, RepositoryError>> {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<TaskRow> = sqlx::query_as(
                "SELECT id, data, created_at, updated_at FROM tasks \
                 ORDER BY created_at DESC, id DESC",
            )
            .fetch_all(&pool)
            .await
            .map_err(|error| database_error(&error))?;

            rows.into_iter().map(row_to_task).collect()
        }
        .boxed()
    }

    fn update(
        &self,
        id: &TaskId,
        patch: TaskPatch,
    ) -> BoxFuture<'static, Result<Option<Task>, RepositoryError>> {
        let pool = self.pool.clone();
        let task_id = *id.as_uuid();
        async move {
            let merge = patch_document(&patch);

            let row: Option<TaskRow> = sqlx::query_as(
                "UPDATE tasks SET data = data || $2, updated_at = clock_timestamp() \
                 WHERE id = $1 \
                 RETURNING id, data, created_at, updated_at",
            )
            .bind(task_id)
            .bind(&merge)
            .fetch_optional(&pool)
            .await
            .map_err(|error| database_error(&error))?;

            row.map(row_to_task).transpose()
        }
        .boxed()
    }

    fn delete(&self, id: &TaskId) -> BoxFuture<'static, Result<bool, RepositoryError>> {
        let pool = self.pool.clone();
        let task_id = *id.as_uuid();
        async move {
            let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
                .bind(task_id)
                .execute(&pool)
                .await
                .map_err(|error| database_error(&error))?;

            Ok(result.rows_affected() > 0)
        }
        .boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================
