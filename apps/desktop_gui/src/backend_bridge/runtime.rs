//! Backend worker: a dedicated thread owning a tokio runtime and the
//! list controller. Commands arrive over a bounded channel; controller
//! events are forwarded back to the UI thread.

use std::{sync::Arc, thread};

use crossbeam_channel::{Receiver, Sender};

use client_core::{ControllerEvent, HttpTodoStore, TodoListController};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub server_url: String,
    pub access_token: Option<String>,
}

pub fn spawn_backend_thread(
    config: StoreConfig,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!("failed to build backend runtime: {err}");
                let _ = ui_tx.try_send(UiEvent::BackendFailed(format!(
                    "failed to build backend runtime: {err}"
                )));
                return;
            }
        };

        runtime.block_on(async move {
            let store = match HttpTodoStore::new(&config.server_url, config.access_token) {
                Ok(store) => store,
                Err(err) => {
                    tracing::error!("rejected server url '{}': {err}", config.server_url);
                    let _ = ui_tx.try_send(UiEvent::BackendFailed(format!(
                        "cannot use server url '{}': {err}",
                        config.server_url
                    )));
                    return;
                }
            };

            let controller = Arc::new(TodoListController::new(Arc::new(store)));
            let mut events = controller.subscribe_events();

            // Forwarder: controller broadcast -> UI channel. Lagged receivers
            // only ever skip intermediate snapshots; the next event catches up.
            let forward_tx = ui_tx.clone();
            tokio::spawn(async move {
                loop {
                    match events.recv().await {
                        Ok(event) => {
                            let mapped = match event {
                                ControllerEvent::SnapshotReplaced(todos) => {
                                    UiEvent::SnapshotReplaced(todos)
                                }
                                ControllerEvent::LoadingChanged(loading) => {
                                    UiEvent::LoadingChanged(loading)
                                }
                                ControllerEvent::DialogChanged(dialog) => {
                                    UiEvent::DialogChanged(dialog)
                                }
                                ControllerEvent::Notice(notice) => UiEvent::Notice(notice),
                            };
                            if forward_tx.send(mapped).is_err() {
                                return;
                            }
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "ui event forwarder lagged");
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => return,
                    }
                }
            });

            let _ = ui_tx.try_send(UiEvent::BackendReady);
            controller.load().await;

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Refresh => controller.load().await,
                    BackendCommand::AddTodo { draft } => {
                        if let Err(rejection) = controller.add_todo(draft).await {
                            let _ = ui_tx.try_send(UiEvent::FormRejected(rejection));
                        }
                    }
                    BackendCommand::SaveEdit { patch } => {
                        if let Err(rejection) = controller.save_edit(patch).await {
                            let _ = ui_tx.try_send(UiEvent::FormRejected(rejection));
                        }
                    }
                    BackendCommand::DeleteTodo { id } => controller.delete_todo(id).await,
                    BackendCommand::ToggleCompleted {
                        id,
                        currently_completed,
                    } => {
                        controller.toggle_completed(id, currently_completed).await;
                    }
                    BackendCommand::OpenAddDialog => controller.open_add_dialog().await,
                    BackendCommand::OpenEditDialog { todo } => {
                        controller.open_edit_dialog(todo).await;
                    }
                    BackendCommand::CloseDialog => controller.close_dialog().await,
                    BackendCommand::SetFilter { filter } => controller.set_filter(filter).await,
                    BackendCommand::SetSort { sort } => controller.set_sort(sort).await,
                }
            }
            tracing::debug!("ui command channel closed; backend worker exiting");
        });
    });
}
