use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    ControllerEvent, HttpTodoStore, Notification, Severity, TodoListController,
};
use shared::{
    domain::{FilterMode, SortMode, Todo, TodoId},
    protocol::{TodoDraft, TodoPatch},
};
use tokio::sync::broadcast;

#[derive(Parser, Debug)]
#[command(name = "todo", about = "Command-line front end for the todo store")]
struct Args {
    /// Remote store base URL; falls back to TODO_SERVER_URL.
    #[arg(long)]
    server_url: Option<String>,
    /// Session token; falls back to TODO_ACCESS_TOKEN.
    #[arg(long)]
    access_token: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print todos through the same filter/sort view the GUI shows.
    List {
        #[arg(long, default_value = "all")]
        filter: FilterMode,
        #[arg(long, default_value = "newest")]
        sort: SortMode,
    },
    /// Create a todo.
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Update title and/or description of an existing todo.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Mark a todo as completed.
    Done { id: String },
    /// Mark a todo as active again.
    Undone { id: String },
    /// Delete a todo.
    Rm { id: String },
}

fn print_rows(todos: &[Todo]) {
    if todos.is_empty() {
        println!("No todos found.");
        return;
    }
    for todo in todos {
        let mark = if todo.completed { 'x' } else { ' ' };
        let description = todo
            .description
            .as_deref()
            .map(|text| format!(" - {text}"))
            .unwrap_or_default();
        println!(
            "[{mark}] {}  ({}, {}){description}",
            todo.title,
            todo.id,
            todo.created_at.format("%Y-%m-%d %H:%M")
        );
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

/// The snapshot is the source for id lookups; ids are opaque, so only exact
/// matches count.
fn find_todo(todos: &[Todo], id: &str) -> Result<Todo> {
    todos
        .iter()
        .find(|todo| todo.id.0 == id)
        .cloned()
        .with_context(|| format!("no todo with id '{id}'"))
}

/// `done`/`undone` are one-directional, not blind toggles: asking for the
/// state the todo is already in is an error, never a flip back.
fn current_completion_for(todo: &Todo, mark_done: bool) -> Result<bool> {
    match (todo.completed, mark_done) {
        (true, true) => bail!("todo '{}' is already completed", todo.id),
        (false, false) => bail!("todo '{}' is already active", todo.id),
        (current, _) => Ok(current),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let server_url = args
        .server_url
        .or_else(|| std::env::var("TODO_SERVER_URL").ok())
        .context("pass --server-url or set TODO_SERVER_URL")?;
    let access_token = args
        .access_token
        .or_else(|| std::env::var("TODO_ACCESS_TOKEN").ok());

    let store = HttpTodoStore::new(&server_url, access_token)?;
    let controller = TodoListController::new(Arc::new(store));
    let mut events = controller.subscribe_events();

    controller.load().await;
    let load_notices = drain_notices(&mut events);
    if let Some(failure) = load_notices
        .iter()
        .find(|notice| notice.severity == Severity::Error)
    {
        bail!("{}: {}", failure.title, failure.message);
    }

    match args.command {
        Command::List { filter, sort } => {
            controller.set_filter(filter).await;
            controller.set_sort(sort).await;
            print_rows(&controller.visible().await);
        }
        Command::Add { title, description } => {
            if let Err(err) = controller
                .add_todo(TodoDraft::new(title, description))
                .await
            {
                bail!("invalid todo: {err}");
            }
        }
        Command::Edit {
            id,
            title,
            description,
        } => {
            let target = find_todo(&controller.snapshot().await, &id)?;
            controller.open_edit_dialog(target).await;
            let patch = TodoPatch {
                title,
                description,
                ..TodoPatch::default()
            };
            if patch.is_empty() {
                bail!("nothing to change; pass --title and/or --description");
            }
            if let Err(err) = controller.save_edit(patch).await {
                bail!("invalid update: {err}");
            }
        }
        Command::Done { id } => {
            let target = find_todo(&controller.snapshot().await, &id)?;
            let current = current_completion_for(&target, true)?;
            controller.toggle_completed(target.id, current).await;
        }
        Command::Undone { id } => {
            let target = find_todo(&controller.snapshot().await, &id)?;
            let current = current_completion_for(&target, false)?;
            controller.toggle_completed(target.id, current).await;
        }
        Command::Rm { id } => {
            controller.delete_todo(TodoId(id)).await;
        }
    }

    for notice in drain_notices(&mut events) {
        match notice.severity {
            Severity::Info => println!("{}: {}", notice.title, notice.message),
            Severity::Error => bail!("{}: {}", notice.title, notice.message),
        }
    }

    Ok(())
}
