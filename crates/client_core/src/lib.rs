use std::sync::Arc;

use shared::{
    domain::{FilterMode, SortMode, Todo, TodoId},
    protocol::{TodoDraft, TodoPatch},
    validate::{validate_draft, validate_patch, ValidationError},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, warn};

pub mod store;
pub mod view;

pub use store::{HttpTodoStore, StoreError, TodoStore};
pub use view::visible_todos;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// User-visible outcome of a controller operation. Wording lives here rather
/// than in the UI so every front end reports the same thing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Notification {
    fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Which dialog the UI currently shows. `Edit` doubles as the active
/// selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ActiveDialog {
    #[default]
    None,
    Add,
    Edit(Todo),
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    SnapshotReplaced(Vec<Todo>),
    LoadingChanged(bool),
    DialogChanged(ActiveDialog),
    Notice(Notification),
}

#[derive(Debug, Default)]
struct ControllerState {
    todos: Vec<Todo>,
    loading: bool,
    active_dialog: ActiveDialog,
    filter: FilterMode,
    sort: SortMode,
}

/// Owns the cached snapshot and reconciles it with the remote store after
/// every mutation: each successful write is followed by a full re-fetch, so
/// the snapshot is replaced wholesale and never patched in place. Overlapping
/// mutations are not serialized; if two refreshes interleave, the one that
/// resolves last wins. Store failures never escape: they surface as one error
/// notification and leave the snapshot at its pre-operation value.
pub struct TodoListController {
    store: Arc<dyn TodoStore>,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<ControllerEvent>,
}

impl TodoListController {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            store,
            inner: Mutex::new(ControllerState::default()),
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: ControllerEvent) {
        // Nobody listening is fine; the CLI runs without subscribers.
        let _ = self.events.send(event);
    }

    fn notify(&self, notification: Notification) {
        self.emit(ControllerEvent::Notice(notification));
    }

    async fn set_loading(&self, loading: bool) {
        let mut state = self.inner.lock().await;
        if state.loading != loading {
            state.loading = loading;
            drop(state);
            self.emit(ControllerEvent::LoadingChanged(loading));
        }
    }

    async fn set_dialog(&self, dialog: ActiveDialog) {
        let mut state = self.inner.lock().await;
        if state.active_dialog != dialog {
            state.active_dialog = dialog.clone();
            drop(state);
            self.emit(ControllerEvent::DialogChanged(dialog));
        }
    }

    /// Fetches the full collection and swaps it in. On failure the previous
    /// snapshot is kept and one error notification goes out. The lock is held
    /// only around the swap, never across the round trip.
    async fn refresh(&self) {
        match self.store.list().await {
            Ok(todos) => {
                debug!(count = todos.len(), "snapshot replaced");
                let mut state = self.inner.lock().await;
                state.todos = todos.clone();
                drop(state);
                self.emit(ControllerEvent::SnapshotReplaced(todos));
            }
            Err(err) => {
                error!("failed to load todos: {err}");
                self.notify(Notification::error(
                    "Error loading todos",
                    "Please try again later",
                ));
            }
        }
        self.set_loading(false).await;
    }

    /// Startup fetch: shows the loading state until the first round trip
    /// settles, successfully or not.
    pub async fn load(&self) {
        self.set_loading(true).await;
        self.refresh().await;
    }

    /// Validates and creates. Validation failures are returned to the form
    /// layer before any network traffic; store failures keep the Add dialog
    /// open and surface one error notification.
    pub async fn add_todo(&self, draft: TodoDraft) -> Result<(), ValidationError> {
        validate_draft(&draft)?;

        match self.store.create(&draft).await {
            Ok(created) => {
                debug!(todo_id = %created.id, "todo created");
                self.refresh().await;
                self.set_dialog(ActiveDialog::None).await;
                self.notify(Notification::info(
                    "Todo created",
                    "Your new todo has been created successfully",
                ));
            }
            Err(err) => {
                error!("failed to create todo: {err}");
                self.notify(Notification::error(
                    "Error creating todo",
                    "Please try again later",
                ));
            }
        }
        Ok(())
    }

    /// Applies the patch to the currently selected todo. Without an active
    /// selection this is a no-op. On success the selection is cleared, which
    /// closes the Edit dialog; on failure both stay put.
    pub async fn save_edit(&self, patch: TodoPatch) -> Result<(), ValidationError> {
        validate_patch(&patch)?;

        let Some(selected) = self.selected_todo().await else {
            warn!("save_edit invoked without an active selection");
            return Ok(());
        };

        match self.store.update(&selected.id, &patch).await {
            Ok(updated) => {
                debug!(todo_id = %updated.id, "todo updated");
                self.refresh().await;
                self.set_dialog(ActiveDialog::None).await;
                self.notify(Notification::info(
                    "Todo updated",
                    "Your todo has been updated successfully",
                ));
            }
            Err(err) => {
                error!(todo_id = %selected.id, "failed to update todo: {err}");
                self.notify(Notification::error(
                    "Error updating todo",
                    "Please try again later",
                ));
            }
        }
        Ok(())
    }

    /// Deletes by id. A selection pointing at the deleted record is cleared,
    /// closing any open detail dialog.
    pub async fn delete_todo(&self, id: TodoId) {
        match self.store.delete(&id).await {
            Ok(()) => {
                debug!(todo_id = %id, "todo deleted");
                self.refresh().await;
                let selected_deleted = matches!(
                    &self.inner.lock().await.active_dialog,
                    ActiveDialog::Edit(todo) if todo.id == id
                );
                if selected_deleted {
                    self.set_dialog(ActiveDialog::None).await;
                }
                self.notify(Notification::info(
                    "Todo deleted",
                    "Your todo has been deleted successfully",
                ));
            }
            Err(err) => {
                error!(todo_id = %id, "failed to delete todo: {err}");
                self.notify(Notification::error(
                    "Error deleting todo",
                    "Please try again later",
                ));
            }
        }
    }

    /// Flips completion relative to `currently_completed` and reports the new
    /// state. Exactly one notification per toggle.
    pub async fn toggle_completed(&self, id: TodoId, currently_completed: bool) {
        let completed = !currently_completed;
        match self.store.set_completed(&id, completed).await {
            Ok(_) => {
                self.refresh().await;
                let (title, state_label) = if completed {
                    ("Todo completed", "completed")
                } else {
                    ("Todo uncompleted", "active")
                };
                self.notify(Notification::info(
                    title,
                    format!("Todo has been marked as {state_label}"),
                ));
            }
            Err(err) => {
                error!(todo_id = %id, "failed to toggle todo: {err}");
                self.notify(Notification::error(
                    "Error updating todo",
                    "Please try again later",
                ));
            }
        }
    }

    pub async fn open_add_dialog(&self) {
        self.set_dialog(ActiveDialog::Add).await;
    }

    pub async fn open_edit_dialog(&self, todo: Todo) {
        self.set_dialog(ActiveDialog::Edit(todo)).await;
    }

    pub async fn close_dialog(&self) {
        self.set_dialog(ActiveDialog::None).await;
    }

    pub async fn set_filter(&self, filter: FilterMode) {
        self.inner.lock().await.filter = filter;
    }

    pub async fn set_sort(&self, sort: SortMode) {
        self.inner.lock().await.sort = sort;
    }

    /// The displayed sequence: snapshot run through the list transformer.
    /// Pure read, no network.
    pub async fn visible(&self) -> Vec<Todo> {
        let state = self.inner.lock().await;
        visible_todos(&state.todos, state.filter, state.sort)
    }

    pub async fn snapshot(&self) -> Vec<Todo> {
        self.inner.lock().await.todos.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.lock().await.loading
    }

    pub async fn active_dialog(&self) -> ActiveDialog {
        self.inner.lock().await.active_dialog.clone()
    }

    pub async fn selected_todo(&self) -> Option<Todo> {
        match &self.inner.lock().await.active_dialog {
            ActiveDialog::Edit(todo) => Some(todo.clone()),
            _ => None,
        }
    }

    pub async fn filter(&self) -> FilterMode {
        self.inner.lock().await.filter
    }

    pub async fn sort(&self) -> SortMode {
        self.inner.lock().await.sort
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
