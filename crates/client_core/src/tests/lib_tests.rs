use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};

use super::*;

/// Scripted store double: server-assigned ids and timestamps, per-operation
/// failure switches, and a call log for asserting what hit the network path.
struct TestStore {
    todos: Mutex<Vec<Todo>>,
    next_seq: AtomicU64,
    calls: Mutex<Vec<&'static str>>,
    fail_list: AtomicBool,
    fail_create: AtomicBool,
    fail_update: AtomicBool,
    fail_delete: AtomicBool,
}

impl TestStore {
    fn empty() -> Self {
        Self {
            todos: Mutex::new(Vec::new()),
            next_seq: AtomicU64::new(1),
            calls: Mutex::new(Vec::new()),
            fail_list: AtomicBool::new(false),
            fail_create: AtomicBool::new(false),
            fail_update: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
        }
    }

    async fn seeded(titles: &[&str]) -> Arc<Self> {
        let store = Arc::new(Self::empty());
        for title in titles {
            store
                .create(&TodoDraft::new(*title, None))
                .await
                .expect("seed");
        }
        store.calls.lock().await.clear();
        store
    }

    fn stamp(&self, seq: u64) -> (TodoId, chrono::DateTime<Utc>) {
        let created_at =
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + Duration::minutes(seq as i64);
        (TodoId(format!("todo-{seq}")), created_at)
    }

    async fn record(&self, call: &'static str) {
        self.calls.lock().await.push(call);
    }

    async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    fn injected() -> StoreError {
        StoreError::Rejected {
            status: 500,
            message: "injected failure".to_string(),
        }
    }
}

#[async_trait]
impl TodoStore for TestStore {
    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        self.record("list").await;
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        let mut todos = self.todos.lock().await.clone();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(todos)
    }

    async fn create(&self, draft: &TodoDraft) -> Result<Todo, StoreError> {
        self.record("create").await;
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let (id, created_at) = self.stamp(seq);
        let todo = Todo {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            completed: false,
            created_at,
            owner: "user-1".to_string(),
        };
        self.todos.lock().await.push(todo.clone());
        Ok(todo)
    }

    async fn update(&self, id: &TodoId, patch: &TodoPatch) -> Result<Todo, StoreError> {
        self.record("update").await;
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        let mut todos = self.todos.lock().await;
        let todo = todos
            .iter_mut()
            .find(|todo| &todo.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        if let Some(title) = &patch.title {
            todo.title = title.clone();
        }
        if let Some(description) = &patch.description {
            todo.description = Some(description.clone());
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }
        Ok(todo.clone())
    }

    async fn delete(&self, id: &TodoId) -> Result<(), StoreError> {
        self.record("delete").await;
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        let mut todos = self.todos.lock().await;
        let before = todos.len();
        todos.retain(|todo| &todo.id != id);
        if todos.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }
}

fn drain_notices(rx: &mut broadcast::Receiver<ControllerEvent>) -> Vec<Notification> {
    let mut notices = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let ControllerEvent::Notice(notice) = event {
            notices.push(notice);
        }
    }
    notices
}

#[tokio::test]
async fn initial_load_populates_snapshot_and_clears_loading() {
    let store = TestStore::seeded(&["first", "second"]).await;
    let controller = TodoListController::new(store);

    controller.load().await;

    assert_eq!(controller.snapshot().await.len(), 2);
    assert!(!controller.is_loading().await);
}

#[tokio::test]
async fn failed_initial_load_leaves_snapshot_empty_and_reports_once() {
    let store = Arc::new(TestStore::empty());
    store.fail_list.store(true, Ordering::SeqCst);
    let controller = TodoListController::new(store);
    let mut rx = controller.subscribe_events();

    controller.load().await;

    assert!(controller.snapshot().await.is_empty());
    assert!(!controller.is_loading().await);
    let notices = drain_notices(&mut rx);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].severity, Severity::Error);
    assert_eq!(notices[0].title, "Error loading todos");
}

#[tokio::test]
async fn created_todo_shows_up_in_next_snapshot_with_server_fields() {
    let store = Arc::new(TestStore::empty());
    let controller = TodoListController::new(store);
    controller.open_add_dialog().await;
    let mut rx = controller.subscribe_events();

    controller
        .add_todo(TodoDraft::new("Buy milk", None))
        .await
        .expect("valid draft");

    let snapshot = controller.snapshot().await;
    let matches: Vec<_> = snapshot
        .iter()
        .filter(|todo| todo.title == "Buy milk")
        .collect();
    assert_eq!(matches.len(), 1);
    assert!(!matches[0].completed);
    assert!(!matches[0].id.0.is_empty());

    assert_eq!(controller.active_dialog().await, ActiveDialog::None);
    let notices = drain_notices(&mut rx);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].severity, Severity::Info);
    assert_eq!(notices[0].title, "Todo created");
}

#[tokio::test]
async fn empty_title_is_rejected_before_any_store_call() {
    let store = Arc::new(TestStore::empty());
    let controller = TodoListController::new(Arc::clone(&store) as Arc<dyn TodoStore>);
    let mut rx = controller.subscribe_events();

    let err = controller
        .add_todo(TodoDraft::new("   ", None))
        .await
        .expect_err("must be rejected");

    assert_eq!(err.field_message("title"), Some("Title is required"));
    assert_eq!(store.call_count().await, 0);
    assert!(drain_notices(&mut rx).is_empty());
}

#[tokio::test]
async fn add_failure_keeps_dialog_open_and_reports_once() {
    let store = Arc::new(TestStore::empty());
    store.fail_create.store(true, Ordering::SeqCst);
    let controller = TodoListController::new(Arc::clone(&store) as Arc<dyn TodoStore>);
    controller.open_add_dialog().await;
    let mut rx = controller.subscribe_events();

    controller
        .add_todo(TodoDraft::new("Buy milk", None))
        .await
        .expect("draft itself is valid");

    assert_eq!(controller.active_dialog().await, ActiveDialog::Add);
    assert!(controller.snapshot().await.is_empty());
    let notices = drain_notices(&mut rx);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].severity, Severity::Error);
}

#[tokio::test]
async fn toggling_twice_restores_completion_and_notifies_each_state() {
    let store = TestStore::seeded(&["water plants"]).await;
    let controller = TodoListController::new(Arc::clone(&store) as Arc<dyn TodoStore>);
    controller.load().await;
    let target = controller.snapshot().await.remove(0);
    assert!(!target.completed);
    let mut rx = controller.subscribe_events();

    controller.toggle_completed(target.id.clone(), false).await;
    assert!(controller.snapshot().await[0].completed);
    let notices = drain_notices(&mut rx);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].title, "Todo completed");

    controller.toggle_completed(target.id.clone(), true).await;
    assert!(!controller.snapshot().await[0].completed);
    let notices = drain_notices(&mut rx);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].title, "Todo uncompleted");
    assert!(notices[0].message.contains("active"));
}

#[tokio::test]
async fn deleting_selected_todo_clears_selection_and_snapshot_entry() {
    let store = TestStore::seeded(&["obsolete"]).await;
    let controller = TodoListController::new(store);
    controller.load().await;
    let target = controller.snapshot().await.remove(0);
    controller.open_edit_dialog(target.clone()).await;

    controller.delete_todo(target.id.clone()).await;

    assert_eq!(controller.active_dialog().await, ActiveDialog::None);
    assert!(controller.snapshot().await.is_empty());
}

#[tokio::test]
async fn deleting_unrelated_todo_keeps_selection() {
    let store = TestStore::seeded(&["keep me", "drop me"]).await;
    let controller = TodoListController::new(store);
    controller.load().await;
    let snapshot = controller.snapshot().await;
    let kept = snapshot
        .iter()
        .find(|todo| todo.title == "keep me")
        .expect("seeded")
        .clone();
    let dropped = snapshot
        .iter()
        .find(|todo| todo.title == "drop me")
        .expect("seeded")
        .clone();
    controller.open_edit_dialog(kept.clone()).await;

    controller.delete_todo(dropped.id).await;

    assert_eq!(controller.active_dialog().await, ActiveDialog::Edit(kept));
}

#[tokio::test]
async fn failing_update_leaves_list_and_selection_unchanged() {
    let store = TestStore::seeded(&["original title"]).await;
    let controller = TodoListController::new(Arc::clone(&store) as Arc<dyn TodoStore>);
    controller.load().await;
    let target = controller.snapshot().await.remove(0);
    controller.open_edit_dialog(target.clone()).await;
    store.fail_update.store(true, Ordering::SeqCst);
    let mut rx = controller.subscribe_events();

    controller
        .save_edit(TodoPatch {
            title: Some("renamed".to_string()),
            ..TodoPatch::default()
        })
        .await
        .expect("patch is valid");

    assert_eq!(controller.snapshot().await[0].title, "original title");
    assert_eq!(controller.active_dialog().await, ActiveDialog::Edit(target));
    let notices = drain_notices(&mut rx);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].severity, Severity::Error);
}

#[tokio::test]
async fn successful_edit_refreshes_and_closes_the_dialog() {
    let store = TestStore::seeded(&["original title"]).await;
    let controller = TodoListController::new(store);
    controller.load().await;
    let target = controller.snapshot().await.remove(0);
    controller.open_edit_dialog(target).await;

    controller
        .save_edit(TodoPatch {
            title: Some("renamed".to_string()),
            description: Some("with notes".to_string()),
            ..TodoPatch::default()
        })
        .await
        .expect("patch is valid");

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot[0].title, "renamed");
    assert_eq!(snapshot[0].description.as_deref(), Some("with notes"));
    assert_eq!(controller.active_dialog().await, ActiveDialog::None);
}

#[tokio::test]
async fn blanked_title_patch_never_reaches_the_store() {
    let store = TestStore::seeded(&["original title"]).await;
    let controller = TodoListController::new(Arc::clone(&store) as Arc<dyn TodoStore>);
    controller.load().await;
    let target = controller.snapshot().await.remove(0);
    controller.open_edit_dialog(target).await;
    let calls_before = store.call_count().await;

    let err = controller
        .save_edit(TodoPatch {
            title: Some(String::new()),
            ..TodoPatch::default()
        })
        .await
        .expect_err("blank title must fail validation");

    assert_eq!(err.field_message("title"), Some("Title is required"));
    assert_eq!(store.call_count().await, calls_before);
}

#[tokio::test]
async fn save_edit_without_selection_is_a_noop() {
    let store = Arc::new(TestStore::empty());
    let controller = TodoListController::new(Arc::clone(&store) as Arc<dyn TodoStore>);

    controller
        .save_edit(TodoPatch::completed(true))
        .await
        .expect("no-op");

    assert_eq!(store.call_count().await, 0);
}

#[tokio::test]
async fn refresh_replaces_the_snapshot_wholesale() {
    let store = TestStore::seeded(&["mine"]).await;
    let controller = TodoListController::new(Arc::clone(&store) as Arc<dyn TodoStore>);
    controller.load().await;
    assert_eq!(controller.snapshot().await.len(), 1);

    // A row that appeared remotely shows up after the next mutation's
    // refresh, because the snapshot is never patched incrementally.
    store
        .create(&TodoDraft::new("someone else's write", None))
        .await
        .expect("direct insert");
    let mine = controller.snapshot().await.remove(0);
    controller.toggle_completed(mine.id, false).await;

    assert_eq!(controller.snapshot().await.len(), 2);
}

#[tokio::test]
async fn view_derivation_uses_current_filter_and_sort_without_network() {
    let store = TestStore::seeded(&["banana", "Apple", "apple"]).await;
    let controller = TodoListController::new(Arc::clone(&store) as Arc<dyn TodoStore>);
    controller.load().await;
    let first = controller.snapshot().await.remove(0);
    controller.toggle_completed(first.id, false).await;
    let calls_before = store.call_count().await;

    controller.set_filter(FilterMode::Active).await;
    controller.set_sort(SortMode::Title).await;
    let visible = controller.visible().await;

    assert_eq!(store.call_count().await, calls_before);
    assert!(visible.iter().all(|todo| !todo.completed));
    let titles: Vec<&str> = visible.iter().map(|todo| todo.title.as_str()).collect();
    let mut sorted = titles.clone();
    sorted.sort();
    assert_eq!(titles, sorted);
}
