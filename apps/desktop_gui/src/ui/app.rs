//! The egui application: renders the cached snapshot through the list
//! transformer and queues every mutation to the backend worker.

use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use client_core::{visible_todos, ActiveDialog, Notification, Severity};
use shared::{
    domain::{FilterMode, SortMode, Todo},
    protocol::{TodoDraft, TodoPatch},
    validate::{validate_draft, validate_patch, ValidationError},
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::controller::orchestration::dispatch_backend_command;

fn filter_label(filter: FilterMode) -> &'static str {
    match filter {
        FilterMode::All => "All",
        FilterMode::Active => "Active",
        FilterMode::Completed => "Completed",
    }
}

fn sort_label(sort: SortMode) -> &'static str {
    match sort {
        SortMode::Newest => "Newest first",
        SortMode::Oldest => "Oldest first",
        SortMode::Title => "By title",
    }
}

fn theme_visuals(dark_mode: bool) -> egui::Visuals {
    if dark_mode {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    }
}

fn empty_state_text(filter: FilterMode, snapshot_empty: bool) -> &'static str {
    if snapshot_empty {
        return "No todos yet. Add your first one!";
    }
    match filter {
        FilterMode::All => "No todos yet. Add your first one!",
        FilterMode::Active => "No active todos.",
        FilterMode::Completed => "No completed todos.",
    }
}

#[derive(Default, Clone)]
struct TodoForm {
    title: String,
    description: String,
}

impl TodoForm {
    fn from_todo(todo: &Todo) -> Self {
        Self {
            title: todo.title.clone(),
            description: todo.description.clone().unwrap_or_default(),
        }
    }

    fn draft(&self) -> TodoDraft {
        let description = match self.description.trim() {
            "" => None,
            text => Some(text.to_string()),
        };
        TodoDraft::new(self.title.clone(), description)
    }

    fn patch(&self) -> TodoPatch {
        TodoPatch {
            title: Some(self.title.clone()),
            description: Some(self.description.trim().to_string()),
            completed: None,
        }
    }
}

pub struct TodoGuiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    todos: Vec<Todo>,
    loading: bool,
    filter: FilterMode,
    sort: SortMode,

    dialog: ActiveDialog,
    add_form: TodoForm,
    edit_form: TodoForm,
    form_errors: Option<ValidationError>,

    banner: Option<Notification>,
    queue_status: Option<String>,
    backend_failure: Option<String>,
    dark_mode: bool,
}

impl TodoGuiApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            todos: Vec::new(),
            loading: true,
            filter: FilterMode::default(),
            sort: SortMode::default(),
            dialog: ActiveDialog::None,
            add_form: TodoForm::default(),
            edit_form: TodoForm::default(),
            form_errors: None,
            banner: None,
            queue_status: None,
            backend_failure: None,
            dark_mode: true,
        }
    }

    fn dispatch(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.queue_status);
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::BackendReady => {
                    self.backend_failure = None;
                }
                UiEvent::SnapshotReplaced(todos) => {
                    self.todos = todos;
                }
                UiEvent::LoadingChanged(loading) => {
                    self.loading = loading;
                }
                UiEvent::DialogChanged(dialog) => {
                    self.form_errors = None;
                    match &dialog {
                        ActiveDialog::Add => self.add_form = TodoForm::default(),
                        ActiveDialog::Edit(todo) => self.edit_form = TodoForm::from_todo(todo),
                        ActiveDialog::None => {}
                    }
                    self.dialog = dialog;
                }
                UiEvent::Notice(notice) => {
                    self.banner = Some(notice);
                }
                UiEvent::FormRejected(rejection) => {
                    self.form_errors = Some(rejection);
                }
                UiEvent::BackendFailed(message) => {
                    self.backend_failure = Some(message);
                    self.loading = false;
                }
            }
        }
    }

    fn submit_add(&mut self) {
        let draft = self.add_form.draft();
        if let Err(rejection) = validate_draft(&draft) {
            self.form_errors = Some(rejection);
            return;
        }
        self.form_errors = None;
        self.dispatch(BackendCommand::AddTodo { draft });
    }

    fn submit_edit(&mut self) {
        let patch = self.edit_form.patch();
        if let Err(rejection) = validate_patch(&patch) {
            self.form_errors = Some(rejection);
            return;
        }
        self.form_errors = None;
        self.dispatch(BackendCommand::SaveEdit { patch });
    }

    fn show_banner(&mut self, ui: &mut egui::Ui) {
        let Some(banner) = self.banner.clone() else {
            return;
        };
        let (fill, stroke) = match banner.severity {
            Severity::Error => (
                egui::Color32::from_rgb(111, 53, 53),
                egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
            ),
            Severity::Info => (
                egui::Color32::from_rgb(43, 77, 52),
                egui::Stroke::new(1.0, egui::Color32::from_rgb(88, 142, 102)),
            ),
        };

        egui::Frame::NONE
            .fill(fill)
            .stroke(stroke)
            .corner_radius(8.0)
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.label(
                        egui::RichText::new(&banner.title)
                            .strong()
                            .color(egui::Color32::WHITE),
                    );
                    ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Dismiss").clicked() {
                            self.banner = None;
                        }
                    });
                });
            });
    }

    fn show_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Todos");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("➕ Add todo").clicked() {
                    self.dispatch(BackendCommand::OpenAddDialog);
                }
                if ui.button("⟳").on_hover_text("Reload from server").clicked() {
                    self.dispatch(BackendCommand::Refresh);
                }
                let theme_icon = if self.dark_mode { "☀" } else { "🌙" };
                if ui
                    .button(theme_icon)
                    .on_hover_text("Switch theme")
                    .clicked()
                {
                    self.dark_mode = !self.dark_mode;
                    ui.ctx().set_visuals(theme_visuals(self.dark_mode));
                }
            });
        });

        ui.horizontal(|ui| {
            ui.label("Show");
            let mut filter = self.filter;
            egui::ComboBox::from_id_salt("filter_mode")
                .selected_text(filter_label(filter))
                .show_ui(ui, |ui| {
                    for mode in [FilterMode::All, FilterMode::Active, FilterMode::Completed] {
                        ui.selectable_value(&mut filter, mode, filter_label(mode));
                    }
                });
            if filter != self.filter {
                self.filter = filter;
                self.dispatch(BackendCommand::SetFilter { filter });
            }

            ui.label("Sort");
            let mut sort = self.sort;
            egui::ComboBox::from_id_salt("sort_mode")
                .selected_text(sort_label(sort))
                .show_ui(ui, |ui| {
                    for mode in [SortMode::Newest, SortMode::Oldest, SortMode::Title] {
                        ui.selectable_value(&mut sort, mode, sort_label(mode));
                    }
                });
            if sort != self.sort {
                self.sort = sort;
                self.dispatch(BackendCommand::SetSort { sort });
            }

            let defaults = self.filter == FilterMode::default() && self.sort == SortMode::default();
            if !defaults && ui.button("Reset view").clicked() {
                self.filter = FilterMode::default();
                self.sort = SortMode::default();
                self.dispatch(BackendCommand::SetFilter {
                    filter: self.filter,
                });
                self.dispatch(BackendCommand::SetSort { sort: self.sort });
            }

            if let Some(status) = &self.queue_status {
                ui.label(egui::RichText::new(status).weak());
            }
        });
    }

    fn show_row(&mut self, ui: &mut egui::Ui, todo: &Todo) {
        egui::Frame::group(ui.style())
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let mut completed = todo.completed;
                    if ui.checkbox(&mut completed, "").changed() {
                        self.dispatch(BackendCommand::ToggleCompleted {
                            id: todo.id.clone(),
                            currently_completed: todo.completed,
                        });
                    }

                    ui.vertical(|ui| {
                        let title = if todo.completed {
                            egui::RichText::new(&todo.title).strikethrough().weak()
                        } else {
                            egui::RichText::new(&todo.title).strong()
                        };
                        ui.label(title);
                        if let Some(description) = &todo.description {
                            if !description.is_empty() {
                                ui.label(egui::RichText::new(description).weak());
                            }
                        }
                        ui.small(todo.created_at.format("%b %-d, %Y %H:%M").to_string());
                    });

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("🗑").on_hover_text("Delete todo").clicked() {
                            self.dispatch(BackendCommand::DeleteTodo {
                                id: todo.id.clone(),
                            });
                        }
                        if ui.button("Edit").clicked() {
                            self.dispatch(BackendCommand::OpenEditDialog { todo: todo.clone() });
                        }
                    });
                });
            });
    }

    fn field_error(&self, field: &str) -> Option<&str> {
        self.form_errors
            .as_ref()
            .and_then(|errors| errors.field_message(field))
    }

    fn form_fields(
        form: &mut TodoForm,
        title_error: Option<String>,
        ui: &mut egui::Ui,
    ) {
        ui.label("Title");
        ui.add(
            egui::TextEdit::singleline(&mut form.title)
                .hint_text("What needs doing?")
                .desired_width(f32::INFINITY),
        );
        if let Some(message) = title_error {
            ui.label(egui::RichText::new(message).color(egui::Color32::LIGHT_RED));
        }

        ui.add_space(6.0);
        ui.label("Description");
        ui.add(
            egui::TextEdit::multiline(&mut form.description)
                .hint_text("Optional details")
                .desired_rows(3)
                .desired_width(f32::INFINITY),
        );
    }

    fn show_add_dialog(&mut self, ctx: &egui::Context) {
        let mut open = true;
        let mut submitted = false;
        let mut cancelled = false;
        let title_error = self.field_error("title").map(str::to_string);

        egui::Window::new("Add todo")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                Self::form_fields(&mut self.add_form, title_error, ui);
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    submitted = ui.button("Create").clicked();
                    cancelled = ui.button("Cancel").clicked();
                });
            });

        if submitted {
            self.submit_add();
        }
        if cancelled || !open {
            self.dispatch(BackendCommand::CloseDialog);
        }
    }

    fn show_edit_dialog(&mut self, ctx: &egui::Context, target: &Todo) {
        let mut open = true;
        let mut submitted = false;
        let mut cancelled = false;
        let mut deleted = false;
        let title_error = self.field_error("title").map(str::to_string);

        egui::Window::new("Todo details")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                Self::form_fields(&mut self.edit_form, title_error, ui);
                ui.add_space(4.0);
                ui.small(format!(
                    "Created {}",
                    target.created_at.format("%b %-d, %Y %H:%M")
                ));
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    submitted = ui.button("Save").clicked();
                    cancelled = ui.button("Cancel").clicked();
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        deleted = ui.button("🗑 Delete").clicked();
                    });
                });
            });

        if submitted {
            self.submit_edit();
        }
        if deleted {
            self.dispatch(BackendCommand::DeleteTodo {
                id: target.id.clone(),
            });
        }
        if cancelled || !open {
            self.dispatch(BackendCommand::CloseDialog);
        }
    }

    fn show_backend_failure(&self, ctx: &egui::Context, message: &str) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(40.0);
            ui.vertical_centered(|ui| {
                ui.heading("Backend unavailable");
                ui.add_space(8.0);
                ui.label(message);
                ui.add_space(8.0);
                ui.weak("Fix the server settings and restart the application.");
            });
        });
    }
}

impl eframe::App for TodoGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        // Backend events arrive off-thread; poll even when idle.
        ctx.request_repaint_after(Duration::from_millis(200));

        if let Some(message) = self.backend_failure.clone() {
            self.show_backend_failure(ctx, &message);
            return;
        }

        egui::TopBottomPanel::top("toolbar")
            .frame(
                egui::Frame::NONE
                    .fill(ctx.style().visuals.panel_fill)
                    .inner_margin(egui::Margin::symmetric(12, 10)),
            )
            .show(ctx, |ui| {
                self.show_toolbar(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_banner(ui);

            if self.loading {
                ui.add_space(24.0);
                ui.vertical_centered(|ui| {
                    ui.spinner();
                    ui.label("Loading todos…");
                });
                return;
            }

            let visible = visible_todos(&self.todos, self.filter, self.sort);
            if visible.is_empty() {
                ui.add_space(24.0);
                ui.vertical_centered(|ui| {
                    ui.weak(empty_state_text(self.filter, self.todos.is_empty()));
                });
                return;
            }

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for todo in &visible {
                        self.show_row(ui, todo);
                        ui.add_space(4.0);
                    }
                });
        });

        match self.dialog.clone() {
            ActiveDialog::Add => self.show_add_dialog(ctx),
            ActiveDialog::Edit(target) => self.show_edit_dialog(ctx, &target),
            ActiveDialog::None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shared::domain::TodoId;

    fn sample_todo(completed: bool) -> Todo {
        Todo {
            id: TodoId::from("t-1"),
            title: "Water plants".to_string(),
            description: Some("  balcony only  ".to_string()),
            completed,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            owner: "user-1".to_string(),
        }
    }

    #[test]
    fn theme_toggle_switches_between_dark_and_light_visuals() {
        assert!(theme_visuals(true).dark_mode);
        assert!(!theme_visuals(false).dark_mode);
    }

    #[test]
    fn empty_state_prefers_the_onboarding_text_when_nothing_exists() {
        assert_eq!(
            empty_state_text(FilterMode::Completed, true),
            "No todos yet. Add your first one!"
        );
        assert_eq!(
            empty_state_text(FilterMode::Completed, false),
            "No completed todos."
        );
        assert_eq!(empty_state_text(FilterMode::Active, false), "No active todos.");
    }

    #[test]
    fn edit_form_round_trips_the_selected_todo() {
        let form = TodoForm::from_todo(&sample_todo(false));
        assert_eq!(form.title, "Water plants");

        let patch = form.patch();
        assert_eq!(patch.title.as_deref(), Some("Water plants"));
        assert_eq!(patch.description.as_deref(), Some("balcony only"));
        assert_eq!(patch.completed, None);
    }

    #[test]
    fn blank_description_becomes_absent_in_the_draft() {
        let form = TodoForm {
            title: "Buy milk".to_string(),
            description: "   ".to_string(),
        };
        let draft = form.draft();
        assert_eq!(draft.title, "Buy milk");
        assert_eq!(draft.description, None);
    }
}
