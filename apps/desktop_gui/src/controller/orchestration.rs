//! Command orchestration helpers from UI actions to the backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut Option<String>,
) {
    let cmd_name = match &cmd {
        BackendCommand::Refresh => "refresh",
        BackendCommand::AddTodo { .. } => "add_todo",
        BackendCommand::SaveEdit { .. } => "save_edit",
        BackendCommand::DeleteTodo { .. } => "delete_todo",
        BackendCommand::ToggleCompleted { .. } => "toggle_completed",
        BackendCommand::OpenAddDialog => "open_add_dialog",
        BackendCommand::OpenEditDialog { .. } => "open_edit_dialog",
        BackendCommand::CloseDialog => "close_dialog",
        BackendCommand::SetFilter { .. } => "set_filter",
        BackendCommand::SetSort { .. } => "set_sort",
    };

    match cmd_tx.try_send(cmd) {
        Ok(()) => tracing::debug!(command = cmd_name, "queued ui->backend command"),
        Err(TrySendError::Full(_)) => {
            *status = Some("Command queue is full; please retry".to_string());
        }
        Err(TrySendError::Disconnected(_)) => {
            *status = Some(
                "Backend worker disconnected; restart the application".to_string(),
            );
        }
    }
}
