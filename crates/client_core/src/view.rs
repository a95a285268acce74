//! Pure derivation of the displayed list from the cached snapshot.

use shared::domain::{FilterMode, SortMode, Todo};

/// Computes the filtered, sorted view over the snapshot. Performs no I/O and
/// never mutates its input; ties keep their relative input order (`sort_by`
/// is stable). Title ordering is case-sensitive byte-wise, so "Apple" sorts
/// before "apple" before "banana".
pub fn visible_todos(todos: &[Todo], filter: FilterMode, sort: SortMode) -> Vec<Todo> {
    let mut result: Vec<Todo> = todos
        .iter()
        .filter(|todo| match filter {
            FilterMode::All => true,
            FilterMode::Active => !todo.completed,
            FilterMode::Completed => todo.completed,
        })
        .cloned()
        .collect();

    match sort {
        SortMode::Newest => result.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortMode::Oldest => result.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortMode::Title => result.sort_by(|a, b| a.title.cmp(&b.title)),
    }

    result
}
