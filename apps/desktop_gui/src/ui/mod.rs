//! UI layer for the desktop GUI: app shell, list rows, and dialogs.

pub mod app;

pub use app::TodoGuiApp;
