//! Field validation for task input.
//!
//! These are the only business rules in the system. The route layer calls
//! [`validate_new_task`] before invoking the service, and the service calls
//! the same functions again before every write, so both sites share one
//! definition of a valid task.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::task::{DueDate, NewTask, TaskPatch};

/// Maximum title length, counted in characters after trimming.
pub const TITLE_MAX_CHARS: usize = 200;

const TITLE_REQUIRED: &str = "Title is required";
const TITLE_TOO_LONG: &str = "Title must not exceed 200 characters";
const DUE_DATE_INVALID: &str = "Due date must be a valid date";

// =============================================================================
// Error Types
// =============================================================================

/// Field-level error for validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the field that failed validation (wire name).
    pub field: String,
    /// Error message for this field.
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// One or more field errors collected from a single input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation failed ({} field error(s))", errors.len())]
pub struct ValidationError {
    /// Field-level errors, in field order.
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub const fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Creates a validation error with a single field error.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![FieldError::new(field, message)])
    }
}

// =============================================================================
// Raw Inputs
// =============================================================================

/// Unvalidated fields of a create request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTaskInput {
    /// Title as sent by the client, possibly missing or blank.
    pub title: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Optional due date text; blank means none.
    pub due_date: Option<String>,
}

impl CreateTaskInput {
    /// Creates an input with only a title.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

/// Unvalidated fields of an update request.
///
/// Only the documented mutable fields exist here; anything else a client
/// sends is dropped before reaching this type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskInput {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement completion flag.
    pub completed: Option<bool>,
    /// `Some(None)` clears the due date; `Some(Some(text))` replaces it.
    pub due_date: Option<Option<String>>,
}

// =============================================================================
// Validators
// =============================================================================

/// Validates a task title.
///
/// # Validation Rules
///
/// - Title must be present and non-empty after trimming
/// - Title must not exceed 200 characters after trimming
///
/// # Errors
///
/// Returns a [`FieldError`] on `title` when either rule fails.
pub fn validate_title(title: Option<&str>) -> Result<String, FieldError> {
    let title = title.map(str::trim).unwrap_or_default();

    if title.is_empty() {
        return Err(FieldError::new("title", TITLE_REQUIRED));
    }

    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(FieldError::new("title", TITLE_TOO_LONG));
    }

    Ok(title.to_string())
}

/// Validates an optional due date.
///
/// Missing and blank values both mean "no due date".
///
/// # Errors
///
/// Returns a [`FieldError`] on `dueDate` when the text is neither a calendar
/// date nor an RFC 3339 timestamp.
pub fn validate_due_date(raw: Option<&str>) -> Result<Option<DueDate>, FieldError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text
            .parse::<DueDate>()
            .map(Some)
            .map_err(|_| FieldError::new("dueDate", DUE_DATE_INVALID)),
    }
}

/// Validates a create request, collecting every field error.
///
/// # Errors
///
/// Returns [`ValidationError`] with one entry per failing field.
pub fn validate_new_task(input: &CreateTaskInput) -> Result<NewTask, ValidationError> {
    let title = validate_title(input.title.as_deref());
    let due_date = validate_due_date(input.due_date.as_deref());

    match (title, due_date) {
        (Ok(title), Ok(due_date)) => Ok(NewTask {
            title,
            description: input.description.clone().unwrap_or_default(),
            due_date,
        }),
        (title, due_date) => Err(ValidationError::new(
            [title.err(), due_date.err()].into_iter().flatten().collect(),
        )),
    }
}

/// Validates a partial update, checking only the fields that are present.
///
/// # Errors
///
/// Returns [`ValidationError`] with one entry per failing field.
pub fn validate_patch(input: &UpdateTaskInput) -> Result<TaskPatch, ValidationError> {
    let title = input
        .title
        .as_deref()
        .map(|title| validate_title(Some(title)))
        .transpose();
    let due_date = input
        .due_date
        .as_ref()
        .map(|due_date| validate_due_date(due_date.as_deref()))
        .transpose();

    match (title, due_date) {
        (Ok(title), Ok(due_date)) => Ok(TaskPatch {
            title,
            description: input.description.clone(),
            completed: input.completed,
            due_date,
        }),
        (title, due_date) => Err(ValidationError::new(
            [title.err(), due_date.err()].into_iter().flatten().collect(),
        )),
    }
}

// =============================================================================
// Tests
// =============================================================================
