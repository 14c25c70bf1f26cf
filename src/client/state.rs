//! Task board view state.
//!
//! [`ClientState`] is an immutable snapshot. Each user action or request
//! outcome is a transition that consumes the snapshot and returns the next
//! one; nothing here performs I/O.

use chrono::{DateTime, FixedOffset};

use crate::api::{CreateTaskRequest, TaskResponse, UpdateTaskRequest};

const TITLE_REQUIRED: &str = "Title is required";

/// The active screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Task list.
    #[default]
    List,
    /// New-task form.
    CreateForm,
    /// Informational page.
    About,
}

/// Text buffer behind the create form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    /// Title as typed.
    pub title: String,
    /// Description as typed.
    pub description: String,
    /// Due date as typed (`YYYY-MM-DD`), empty for none.
    pub due_date: String,
}

impl TaskForm {
    /// Creates a form with only a title filled in.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Inline edit buffer for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    /// Id of the task being edited.
    pub task_id: String,
    /// Title as typed.
    pub title: String,
    /// Description as typed.
    pub description: String,
    /// Due date as typed (`YYYY-MM-DD`), empty for none.
    pub due_date: String,
}

impl EditBuffer {
    /// Opens a buffer prefilled from `task`.
    ///
    /// The due date is cut to its calendar date.
    #[must_use]
    pub fn for_task(task: &TaskResponse) -> Self {
        let due_date = task
            .due_date
            .as_deref()
            .map(|due| due.chars().take(10).collect())
            .unwrap_or_default();

        Self {
            task_id: task.id.clone(),
            title: task.title.clone(),
            description: task.description.clone(),
            due_date,
        }
    }

    /// Builds the update request this buffer submits.
    ///
    /// A blank due date clears the stored one.
    #[must_use]
    pub fn to_request(&self) -> UpdateTaskRequest {
        let due_date = self.due_date.trim();

        UpdateTaskRequest {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            completed: None,
            due_date: Some((!due_date.is_empty()).then(|| due_date.to_string())),
        }
    }
}

/// Snapshot of the whole client view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientState {
    /// Active screen.
    pub screen: Screen,
    /// Tasks from the last successful fetch, plus local edits since.
    pub tasks: Vec<TaskResponse>,
    /// Whether the list fetch is in flight.
    pub loading: bool,
    /// Create form buffer.
    pub form: TaskForm,
    /// At most one open inline edit.
    pub editing: Option<EditBuffer>,
    /// The single current error message.
    pub error: Option<String>,
}

impl ClientState {
    /// Creates the initial, empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks in display order: newest `createdAt` first.
    #[must_use]
    pub fn visible_tasks(&self) -> Vec<&TaskResponse> {
        let mut tasks: Vec<&TaskResponse> = self.tasks.iter().collect();
        tasks.sort_by(|left, right| {
            created_at(right)
                .cmp(&created_at(left))
                .then_with(|| right.created_at.cmp(&left.created_at))
        });
        tasks
    }

    /// Returns the task with `id`, if present locally.
    #[must_use]
    pub fn task(&self, id: &str) -> Option<&TaskResponse> {
        self.tasks.iter().find(|task| task.id == id)
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Switches screens.
    #[must_use]
    pub fn navigate(self, screen: Screen) -> Self {
        Self { screen, ..self }
    }

    // -------------------------------------------------------------------------
    // Request lifecycle
    // -------------------------------------------------------------------------

    /// A list fetch started.
    #[must_use]
    pub fn refresh_started(self) -> Self {
        Self {
            loading: true,
            error: None,
            ..self
        }
    }

    /// A list fetch succeeded; local tasks are replaced wholesale.
    #[must_use]
    pub fn refresh_succeeded(self, tasks: Vec<TaskResponse>) -> Self {
        Self {
            tasks,
            loading: false,
            ..self
        }
    }

    /// A list fetch failed.
    #[must_use]
    pub fn refresh_failed(self, message: impl Into<String>) -> Self {
        Self {
            loading: false,
            error: Some(message.into()),
            ..self
        }
    }

    /// Any other request started.
    #[must_use]
    pub fn request_started(self) -> Self {
        Self { error: None, ..self }
    }

    /// Any other request failed. Only the error message changes.
    #[must_use]
    pub fn request_failed(self, message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..self
        }
    }

    // -------------------------------------------------------------------------
    // Create
    // -------------------------------------------------------------------------

    /// Replaces the create form buffer.
    #[must_use]
    pub fn edit_create_form(self, form: TaskForm) -> Self {
        Self { form, ..self }
    }

    /// Validates the create form.
    ///
    /// Returns the request to send, or `None` with the error set when the
    /// title is blank.
    #[must_use]
    pub fn prepare_create(self) -> (Self, Option<CreateTaskRequest>) {
        if self.form.title.trim().is_empty() {
            return (self.request_failed(TITLE_REQUIRED), None);
        }

        let due_date = self.form.due_date.trim();
        let request = CreateTaskRequest {
            title: Some(self.form.title.clone()),
            description: Some(self.form.description.clone()),
            due_date: (!due_date.is_empty()).then(|| due_date.to_string()),
        };

        (self.request_started(), Some(request))
    }

    /// A create succeeded: prepend, reset the form, back to the list.
    #[must_use]
    pub fn create_succeeded(self, task: TaskResponse) -> Self {
        let tasks = std::iter::once(task).chain(self.tasks).collect();

        Self {
            tasks,
            form: TaskForm::default(),
            screen: Screen::List,
            ..self
        }
    }

    // -------------------------------------------------------------------------
    // Toggle / edit
    // -------------------------------------------------------------------------

    /// Builds the update that flips `completed` on task `id`.
    #[must_use]
    pub fn toggle_request(&self, id: &str) -> Option<UpdateTaskRequest> {
        self.task(id)
            .map(|task| UpdateTaskRequest::completed(!task.completed))
    }

    /// A toggle succeeded; the one record is replaced.
    #[must_use]
    pub fn toggle_succeeded(self, task: TaskResponse) -> Self {
        self.replace_task(task)
    }

    /// Opens the inline editor for `id`, replacing any open buffer.
    #[must_use]
    pub fn start_edit(self, id: &str) -> Self {
        let Some(buffer) = self.task(id).map(EditBuffer::for_task) else {
            return self;
        };

        Self {
            editing: Some(buffer),
            ..self
        }
    }

    /// Replaces the open edit buffer. Ignored when no edit is open.
    #[must_use]
    pub fn edit_buffer(self, buffer: EditBuffer) -> Self {
        if self.editing.is_none() {
            return self;
        }

        Self {
            editing: Some(buffer),
            ..self
        }
    }

    /// Closes the editor without sending anything.
    #[must_use]
    pub fn cancel_edit(self) -> Self {
        Self {
            editing: None,
            ..self
        }
    }

    /// Returns the task id and request for the open edit, if any.
    #[must_use]
    pub fn prepare_edit(&self) -> Option<(String, UpdateTaskRequest)> {
        self.editing
            .as_ref()
            .map(|buffer| (buffer.task_id.clone(), buffer.to_request()))
    }

    /// An edit succeeded; the record is replaced and the editor closed.
    #[must_use]
    pub fn edit_succeeded(self, task: TaskResponse) -> Self {
        Self {
            editing: None,
            ..self.replace_task(task)
        }
    }

    // -------------------------------------------------------------------------
    // Delete
    // -------------------------------------------------------------------------

    /// A delete succeeded; the record is removed.
    #[must_use]
    pub fn delete_succeeded(self, id: &str) -> Self {
        let tasks = self.tasks.into_iter().filter(|task| task.id != id).collect();
        let editing = self.editing.filter(|buffer| buffer.task_id != id);

        Self {
            tasks,
            editing,
            ..self
        }
    }

    fn replace_task(self, updated: TaskResponse) -> Self {
        let tasks = self
            .tasks
            .into_iter()
            .map(|task| {
                if task.id == updated.id {
                    updated.clone()
                } else {
                    task
                }
            })
            .collect();

        Self { tasks, ..self }
    }
}

fn created_at(task: &TaskResponse) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(&task.created_at).ok()
}

// =============================================================================
// Tests
// =============================================================================
