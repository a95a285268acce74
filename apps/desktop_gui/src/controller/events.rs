//! Events flowing from the backend worker back to the UI thread.

use client_core::{ActiveDialog, Notification};
use shared::{domain::Todo, validate::ValidationError};

pub enum UiEvent {
    /// The worker thread came up and issued the initial fetch.
    BackendReady,
    SnapshotReplaced(Vec<Todo>),
    LoadingChanged(bool),
    DialogChanged(ActiveDialog),
    Notice(Notification),
    /// A submitted form was rejected before any network traffic; the dialog
    /// stays open and shows the field errors.
    FormRejected(ValidationError),
    /// The worker could not start at all (bad runtime, bad server URL).
    BackendFailed(String),
}
