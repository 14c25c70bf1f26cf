//! Task board client: an immutable view-state model plus the HTTP calls that
//! drive it.
//!
//! # Example
//!
//! ```ignore
//! use todo_api::client::{ClientState, TaskApiClient, board};
//!
//! let api = TaskApiClient::new("http://localhost:5000");
//! let state = board::load(&api, ClientState::new()).await;
//! for task in state.visible_tasks() {
//!     println!("{} {}", if task.completed { "[x]" } else { "[ ]" }, task.title);
//! }
//! ```

pub mod api;
pub mod board;
pub mod state;

pub use api::{ClientError, ClientResult, TaskApiClient};
pub use state::{ClientState, EditBuffer, Screen, TaskForm};
