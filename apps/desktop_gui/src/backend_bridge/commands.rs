//! Backend commands queued from UI to backend worker.

use shared::{
    domain::{FilterMode, SortMode, Todo, TodoId},
    protocol::{TodoDraft, TodoPatch},
};

pub enum BackendCommand {
    Refresh,
    AddTodo {
        draft: TodoDraft,
    },
    SaveEdit {
        patch: TodoPatch,
    },
    DeleteTodo {
        id: TodoId,
    },
    ToggleCompleted {
        id: TodoId,
        currently_completed: bool,
    },
    OpenAddDialog,
    OpenEditDialog {
        todo: Todo,
    },
    CloseDialog,
    SetFilter {
        filter: FilterMode,
    },
    SetSort {
        sort: SortMode,
    },
}
