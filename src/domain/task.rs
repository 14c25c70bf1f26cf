//! Task domain model.
//!
//! A task is the only persisted entity. Its identifier and both timestamps
//! are assigned by the store; everything else comes from validated input.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Unique identifier for a task.
///
/// This is a newtype wrapper around UUID to provide type safety.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a `TaskId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Generates a new time-ordered `TaskId` (UUID v7).
    ///
    /// **Note**: This is an impure function (side effect: time + random).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parses an identifier received from a client.
    ///
    /// Returns `None` for anything that is not a UUID; callers treat that the
    /// same as an identifier that does not exist.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim()).ok().map(Self)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A timestamp wrapper for `DateTime<Utc>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a `Timestamp` from a `DateTime<Utc>`.
    #[must_use]
    pub const fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Returns the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the current time as a `Timestamp`.
    ///
    /// **Note**: This is an impure function (side effect: system clock).
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Formats the timestamp as RFC 3339 with millisecond precision and a `Z` suffix.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.to_rfc3339())
    }
}

/// Error returned when a due date string cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid due date: '{0}'")]
pub struct DueDateParseError(pub String);

/// The optional deadline of a task.
///
/// Accepts either a calendar date (`YYYY-MM-DD`, midnight UTC) or a full
/// RFC 3339 timestamp. Stored and serialized as a UTC timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DueDate(DateTime<Utc>);

impl DueDate {
    /// Creates a `DueDate` from a `DateTime<Utc>`.
    #[must_use]
    pub const fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Returns the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Formats the due date the same way as [`Timestamp::to_rfc3339`].
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl FromStr for DueDate {
    type Err = DueDateParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();

        if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self(datetime.with_timezone(&Utc)));
        }

        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Self(naive.and_utc()))
            .ok_or_else(|| DueDateParseError(value.to_string()))
    }
}

// =============================================================================
// Task
// =============================================================================

/// A persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Store-assigned identifier.
    pub id: TaskId,
    /// Trimmed, non-empty title of at most 200 characters.
    pub title: String,
    /// Free-form description, empty when not supplied.
    pub description: String,
    /// Whether the task is done.
    pub completed: bool,
    /// Optional deadline.
    pub due_date: Option<DueDate>,
    /// Store-assigned creation time, never changed afterwards.
    pub created_at: Timestamp,
    /// Store-assigned time of the last write.
    pub updated_at: Timestamp,
}

impl Task {
    /// Materializes a validated draft into a task.
    ///
    /// The task starts open, and both timestamps equal `timestamp`.
    #[must_use]
    pub fn new(id: TaskId, draft: NewTask, timestamp: Timestamp) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            completed: false,
            due_date: draft.due_date,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }
}

/// A validated request to create a task, before the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Trimmed title.
    pub title: String,
    /// Description, empty when omitted.
    pub description: String,
    /// Optional deadline.
    pub due_date: Option<DueDate>,
}

impl NewTask {
    /// Creates a draft with only a title.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            due_date: None,
        }
    }

    /// Returns the draft with the given description.
    #[must_use]
    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self
        }
    }

    /// Returns the draft with the given due date.
    #[must_use]
    pub fn with_due_date(self, due_date: DueDate) -> Self {
        Self {
            due_date: Some(due_date),
            ..self
        }
    }
}

/// A validated partial update.
///
/// `None` leaves a field untouched. For `due_date`, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// Replacement title, already trimmed and validated.
    pub title: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement completion flag.
    pub completed: Option<bool>,
    /// Replacement due date; `Some(None)` removes it.
    pub due_date: Option<Option<DueDate>>,
}

impl TaskPatch {
    /// Creates a patch that only sets the completion flag.
    #[must_use]
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Returns `true` if the patch touches no field.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.completed.is_none()
            && self.due_date.is_none()
    }

    /// Applies the patch to `task`, refreshing `updated_at` unconditionally.
    ///
    /// `id` and `created_at` are never touched.
    #[must_use]
    pub fn apply(self, task: Task, now: Timestamp) -> Task {
        Task {
            title: self.title.unwrap_or(task.title),
            description: self.description.unwrap_or(task.description),
            completed: self.completed.unwrap_or(task.completed),
            due_date: self.due_date.unwrap_or(task.due_date),
            updated_at: now,
            ..task
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(seconds: i64) -> Timestamp {
        Timestamp::from_datetime(Utc.timestamp_opt(seconds, 0).unwrap())
    }

    fn sample_task() -> Task {
        Task::new(
            TaskId::generate(),
            NewTask::titled("Buy milk").with_description("two litres"),
            at(1_700_000_000),
        )
    }

    // -------------------------------------------------------------------------
    // TaskId Tests
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_task_id_parse_round_trips_display() {
        let id = TaskId::generate();
        assert_eq!(TaskId::parse(&id.to_string()), Some(id));
    }

    #[rstest]
    #[case("")]
    #[case("not-a-uuid")]
    #[case("64b7f0c2e4b0a1a2b3c4d5e6")]
    #[case("123")]
    fn test_task_id_parse_rejects_malformed(#[case] raw: &str) {
        assert!(TaskId::parse(raw).is_none());
    }

    #[rstest]
    fn test_task_id_generate_unique() {
        assert_ne!(TaskId::generate(), TaskId::generate());
    }

    // -------------------------------------------------------------------------
    // Timestamp / DueDate Tests
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_timestamp_formats_with_millis_and_z() {
        assert_eq!(at(0).to_rfc3339(), "1970-01-01T00:00:00.000Z");
    }

    #[rstest]
    fn test_due_date_parses_calendar_date_as_midnight_utc() {
        let due: DueDate = "2025-03-14".parse().unwrap();
        assert_eq!(due.to_rfc3339(), "2025-03-14T00:00:00.000Z");
    }

    #[rstest]
    fn test_due_date_parses_rfc3339_with_offset() {
        let due: DueDate = "2025-03-14T10:00:00+02:00".parse().unwrap();
        assert_eq!(due.to_rfc3339(), "2025-03-14T08:00:00.000Z");
    }

    #[rstest]
    #[case("tomorrow")]
    #[case("2025-13-01")]
    #[case("14/03/2025")]
    fn test_due_date_rejects_garbage(#[case] raw: &str) {
        let error = raw.parse::<DueDate>().unwrap_err();
        assert_eq!(error, DueDateParseError(raw.to_string()));
    }

    // -------------------------------------------------------------------------
    // Task / TaskPatch Tests
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_task_new_starts_open_with_equal_timestamps() {
        let task = sample_task();

        assert!(!task.completed);
        assert_eq!(task.created_at, task.updated_at);
        assert_eq!(task.description, "two litres");
        assert!(task.due_date.is_none());
    }

    #[rstest]
    fn test_patch_completed_changes_only_completed_and_updated_at() {
        let task = sample_task();
        let updated = TaskPatch::completed(true).apply(task.clone(), at(1_700_000_100));

        assert!(updated.completed);
        assert_eq!(updated.updated_at, at(1_700_000_100));
        assert_eq!(updated.id, task.id);
        assert_eq!(updated.title, task.title);
        assert_eq!(updated.description, task.description);
        assert_eq!(updated.created_at, task.created_at);
    }

    #[rstest]
    fn test_empty_patch_still_refreshes_updated_at() {
        let task = sample_task();
        let patch = TaskPatch::default();
        assert!(patch.is_empty());

        let updated = patch.apply(task.clone(), at(1_700_000_500));

        assert_eq!(updated.updated_at, at(1_700_000_500));
        assert_eq!(updated.title, task.title);
    }

    #[rstest]
    fn test_patch_can_clear_due_date() {
        let due: DueDate = "2025-01-01".parse().unwrap();
        let task = Task::new(
            TaskId::generate(),
            NewTask::titled("Pay rent").with_due_date(due),
            at(10),
        );

        let patch = TaskPatch {
            due_date: Some(None),
            ..TaskPatch::default()
        };
        let updated = patch.apply(task, at(20));

        assert!(updated.due_date.is_none());
    }
}
