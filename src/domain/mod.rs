//! Domain module for task management.
//!
//! This module contains the task entity, its value objects and the pure
//! validator shared by the route layer and the service layer.

pub mod task;
pub mod validation;

pub use task::{DueDate, DueDateParseError, NewTask, Task, TaskId, TaskPatch, Timestamp};
pub use validation::{
    CreateTaskInput, FieldError, TITLE_MAX_CHARS, UpdateTaskInput, ValidationError,
    validate_due_date, validate_new_task, validate_patch, validate_title,
};
