use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use backend_bridge::runtime::{spawn_backend_thread, StoreConfig};
use controller::events::UiEvent;
use ui::TodoGuiApp;

#[derive(Parser, Debug)]
#[command(name = "todo-gui", about = "Desktop front end for the todo store")]
struct Args {
    /// Remote store base URL; falls back to TODO_SERVER_URL.
    #[arg(long)]
    server_url: Option<String>,
    /// Session token; falls back to TODO_ACCESS_TOKEN.
    #[arg(long)]
    access_token: Option<String>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = StoreConfig {
        server_url: args
            .server_url
            .or_else(|| std::env::var("TODO_SERVER_URL").ok())
            .unwrap_or_else(|| "http://127.0.0.1:8443".to_string()),
        access_token: args
            .access_token
            .or_else(|| std::env::var("TODO_ACCESS_TOKEN").ok()),
    };

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    spawn_backend_thread(config, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Todos")
            .with_inner_size([520.0, 700.0])
            .with_min_inner_size([420.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Todos",
        options,
        Box::new(|_cc| Ok(Box::new(TodoGuiApp::new(cmd_tx, ui_rx)))),
    )
}
