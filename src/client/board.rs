//! User actions on the task board.
//!
//! Each action takes the current snapshot, performs at most one request and
//! returns the next snapshot. Request failures only set the error message.

use super::api::TaskApiClient;
use super::state::ClientState;

/// Fetches the full list and replaces local tasks.
pub async fn load(api: &TaskApiClient, state: ClientState) -> ClientState {
    let state = state.refresh_started();

    match api.list_tasks().await {
        Ok(tasks) => state.refresh_succeeded(tasks),
        Err(error) => {
            tracing::warn!(%error, "Task list fetch failed");
            state.refresh_failed(error.message())
        }
    }
}

/// Submits the create form. A blank title never reaches the server.
pub async fn submit_create(api: &TaskApiClient, state: ClientState) -> ClientState {
    let (state, request) = state.prepare_create();
    let Some(request) = request else {
        return state;
    };

    match api.create_task(&request).await {
        Ok(task) => state.create_succeeded(task),
        Err(error) => state.request_failed(error.message()),
    }
}

/// Flips `completed` on one task.
pub async fn toggle_complete(api: &TaskApiClient, state: ClientState, id: &str) -> ClientState {
    let Some(request) = state.toggle_request(id) else {
        return state;
    };
    let state = state.request_started();

    match api.update_task(id, &request).await {
        Ok(task) => state.toggle_succeeded(task),
        Err(error) => state.request_failed(error.message()),
    }
}

/// Submits the open inline edit, if any.
pub async fn submit_edit(api: &TaskApiClient, state: ClientState) -> ClientState {
    let Some((id, request)) = state.prepare_edit() else {
        return state;
    };
    let state = state.request_started();

    match api.update_task(&id, &request).await {
        Ok(task) => state.edit_succeeded(task),
        Err(error) => state.request_failed(error.message()),
    }
}

/// Deletes a task after `confirm` approves it. A declined confirmation sends nothing.
pub async fn delete(
    api: &TaskApiClient,
    state: ClientState,
    id: &str,
    confirm: impl FnOnce(&str) -> bool,
) -> ClientState {
    if !confirm(id) {
        return state;
    }
    let state = state.request_started();

    match api.delete_task(id).await {
        Ok(_) => state.delete_succeeded(id),
        Err(error) => state.request_failed(error.message()),
    }
}
