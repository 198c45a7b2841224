// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use eframe::egui;
use rfd::FileDialog;

use pv_string_tracker::daily_log::log_key;
use pv_string_tracker::export;
use pv_string_tracker::notes::{EditOutcome, EditorKey, NoteId};
use pv_string_tracker::site::GeometryKind;
use pv_string_tracker::transform::ScreenRect;
use pv_string_tracker::{
    Command, DailyLogStore, Editor, EditorConfig, FileLogStore, InteractionMode, MemoryLogStore,
    Point, PointerButton, Site, SiteReader,
};

use crate::log_panel::{LogPanel, LogPanelAction, LogSubmission};
use crate::render::{self, Drawable};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

const CONFIG_KEY: &str = "pv_string_tracker_config";

/// File loading state
#[derive(Debug, Clone, Default)]
enum LoadingState {
    #[default]
    Idle,
    Loading {
        file_name: String,
        start_time: Instant,
        show_progress: bool,
    },
}

/// File loading result message
#[derive(Debug)]
enum LoadingMessage {
    SiteLoaded(Box<Result<Site, String>>, Vec<PathBuf>),
}

fn open_log_store(config: &EditorConfig, fingerprint: &str) -> Box<dyn DailyLogStore> {
    match FileLogStore::open(config.log_dir(), &log_key(fingerprint)) {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("[WARN] Daily log store unavailable ({e}), keeping entries in memory");
            Box::new(MemoryLogStore::new())
        }
    }
}

fn to_point(pos: egui::Pos2) -> Point {
    Point::new(pos.x as f64, pos.y as f64)
}

fn to_button(button: egui::PointerButton) -> Option<PointerButton> {
    match button {
        egui::PointerButton::Primary => Some(PointerButton::Primary),
        egui::PointerButton::Secondary => Some(PointerButton::Secondary),
        egui::PointerButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

pub struct TrackerApp {
    editor: Editor,
    log_store: Box<dyn DailyLogStore>,
    log_panel: LogPanel,
    site_paths: Vec<PathBuf>,
    error_message: Option<String>,
    success_message: Option<String>,
    show_log_panel: bool,
    show_boundaries: bool,
    show_markers: bool,
    show_labels: bool,
    // Note editor buffer, bound to the note it was opened for
    note_draft: String,
    editing_note: Option<NoteId>,
    // Async loading state
    loading_state: LoadingState,
    loading_receiver: Option<mpsc::Receiver<LoadingMessage>>,
}

impl TrackerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, paths: Vec<PathBuf>) -> Self {
        let config: EditorConfig = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, CONFIG_KEY))
            .unwrap_or_default();

        let mut app = Self {
            editor: Editor::new(config),
            log_store: Box::new(MemoryLogStore::new()),
            log_panel: LogPanel::new(),
            site_paths: Vec::new(),
            error_message: None,
            success_message: None,
            show_log_panel: true,
            show_boundaries: true,
            show_markers: true,
            show_labels: true,
            note_draft: String::new(),
            editing_note: None,
            loading_state: LoadingState::Idle,
            loading_receiver: None,
        };

        if !paths.is_empty() {
            app.start_site_loading(paths);
        }
        app
    }

    fn is_busy(&self) -> bool {
        matches!(self.loading_state, LoadingState::Loading { .. })
    }

    fn check_loading_progress(&mut self, ctx: &egui::Context) {
        // Check if we need to show progress bar (after 500ms)
        if let LoadingState::Loading {
            start_time,
            show_progress,
            ..
        } = &mut self.loading_state
        {
            if !*show_progress && start_time.elapsed() >= Duration::from_millis(500) {
                *show_progress = true;
            }
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        if let Some(receiver) = &self.loading_receiver {
            match receiver.try_recv() {
                Ok(LoadingMessage::SiteLoaded(result, paths)) => {
                    self.loading_state = LoadingState::Idle;
                    self.loading_receiver = None;
                    match *result {
                        Ok(site) => self.apply_site(site, paths),
                        Err(error) => self.error_message = Some(error),
                    }
                    ctx.request_repaint();
                }
                Err(mpsc::TryRecvError::Empty) => {}
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.loading_state = LoadingState::Idle;
                    self.loading_receiver = None;
                    self.error_message = Some("Site loading was interrupted".to_string());
                    ctx.request_repaint();
                }
            }
        }
    }

    fn apply_site(&mut self, site: Site, paths: Vec<PathBuf>) {
        let interactive = self.editor.load(&site);
        if interactive == 0 {
            self.error_message = Some(format!(
                "None of the {} panels in the site has usable geometry",
                site.panels.len()
            ));
        }
        self.log_store = open_log_store(self.editor.config(), &site.fingerprint);
        self.site_paths = paths;
        self.editing_note = None;
        self.note_draft.clear();
    }

    fn start_site_loading(&mut self, paths: Vec<PathBuf>) {
        let file_name = paths
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect::<Vec<_>>()
            .join(", ");

        self.loading_state = LoadingState::Loading {
            file_name,
            start_time: Instant::now(),
            show_progress: false,
        };

        let (tx, rx) = mpsc::channel();
        self.loading_receiver = Some(rx);

        thread::spawn(move || {
            let reader = SiteReader::new();
            let result = reader
                .read(&paths)
                .map_err(|e| format!("Failed to load site: {e}"));
            let _ = tx.send(LoadingMessage::SiteLoaded(Box::new(result), paths));
        });
    }

    fn site_basename(&self) -> String {
        self.site_paths
            .first()
            .and_then(|p| Path::new(p).file_stem())
            .and_then(|s| s.to_str())
            .map(|s| format!("{s}_daily_log"))
            .unwrap_or_else(|| "daily_log".to_string())
    }

    fn handle_open_site(&mut self) {
        if let Some(paths) = FileDialog::new()
            .add_filter("GeoJSON files", &["geojson", "json"])
            .pick_files()
        {
            if !paths.is_empty() {
                self.start_site_loading(paths);
            }
        }
    }

    fn handle_export_csv(&mut self) {
        let records = self.log_store.records();
        if records.is_empty() {
            self.error_message = Some("The daily log is empty".to_string());
            return;
        }
        let default_filename = format!("{}.csv", self.site_basename());
        if let Some(file_path) = FileDialog::new()
            .set_file_name(&default_filename)
            .add_filter("CSV files", &["csv"])
            .save_file()
        {
            match export::export_daily_log_to_csv(records, &file_path.to_string_lossy()) {
                Ok(()) => {
                    self.success_message = Some(format!(
                        "Successfully exported {} daily log entries to CSV file: {}",
                        records.len(),
                        file_path.display()
                    ));
                }
                Err(e) => {
                    self.error_message = Some(format!("Failed to export CSV: {e}"));
                }
            }
        }
    }

    fn handle_submit(&mut self, submission: LogSubmission) {
        match self.editor.submit_daily_log(
            self.log_store.as_mut(),
            submission.date,
            &submission.subcontractor,
            submission.workers,
        ) {
            Ok(record) => {
                self.success_message = Some(format!(
                    "Logged {} installed panel ends for {}",
                    record.installed_panels, record.date
                ));
            }
            Err(e) => {
                log::error!("[FAIL] Daily log submission failed: {e}");
                self.error_message = Some(format!("Failed to save daily log entry: {e}"));
            }
        }
    }

    fn handle_reset_log(&mut self) {
        match self.log_store.reset_log() {
            Ok(()) => log::info!("[INFO] Daily log reset"),
            Err(e) => self.error_message = Some(format!("Failed to reset daily log: {e}")),
        }
    }

    fn render_menu_bar(&mut self, ui: &mut egui::Ui) {
        let loaded = !self.editor.is_loading();
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui
                    .add_enabled(!self.is_busy(), egui::Button::new("Open Site..."))
                    .clicked()
                {
                    self.handle_open_site();
                    ui.close_menu();
                }

                ui.separator();

                if ui
                    .add_enabled(
                        !self.log_store.records().is_empty(),
                        egui::Button::new("Export Daily Log to CSV"),
                    )
                    .clicked()
                {
                    self.handle_export_csv();
                    ui.close_menu();
                }

                ui.separator();

                if ui.button("Exit").clicked() {
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("Edit", |ui| {
                if ui
                    .add_enabled(self.editor.can_undo(), egui::Button::new("Undo (Ctrl+Z)"))
                    .clicked()
                {
                    self.editor.command(Command::Undo);
                    ui.close_menu();
                }
                if ui
                    .add_enabled(self.editor.can_redo(), egui::Button::new("Redo (Ctrl+Y)"))
                    .clicked()
                {
                    self.editor.command(Command::Redo);
                    ui.close_menu();
                }
                ui.separator();
                if ui
                    .add_enabled(
                        !self.editor.notes().selected().is_empty(),
                        egui::Button::new("Delete Selected Notes"),
                    )
                    .clicked()
                {
                    self.editor.command(Command::DeleteSelectedNotes);
                    ui.close_menu();
                }
            });

            ui.menu_button("View", |ui| {
                if ui
                    .add_enabled(loaded, egui::Button::new("Fit to View (F)"))
                    .clicked()
                {
                    self.editor.command(Command::FitView);
                    ui.close_menu();
                }
                let mut note_mode = self.editor.note_mode();
                if ui.checkbox(&mut note_mode, "Note Mode (N)").clicked() {
                    self.editor.set_note_mode(note_mode);
                }
                ui.separator();
                ui.checkbox(&mut self.show_boundaries, "Show Boundaries");
                ui.checkbox(&mut self.show_markers, "Show Markers");
                ui.checkbox(&mut self.show_labels, "Show Labels");
                ui.separator();
                ui.checkbox(&mut self.show_log_panel, "Show Daily Log Panel");
            });
        });
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() || self.editor.notes().editor().is_some() {
            return;
        }
        let commands = ctx.input(|i| {
            let mut commands = Vec::new();
            let command = i.modifiers.command;
            if command
                && (i.key_pressed(egui::Key::Y)
                    || (i.modifiers.shift && i.key_pressed(egui::Key::Z)))
            {
                commands.push(Command::Redo);
            } else if command && i.key_pressed(egui::Key::Z) {
                commands.push(Command::Undo);
            }
            if i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace) {
                commands.push(Command::DeleteSelectedNotes);
            }
            if i.key_pressed(egui::Key::Escape) {
                commands.push(Command::Cancel);
            }
            if !command && i.key_pressed(egui::Key::N) {
                commands.push(Command::ToggleNoteMode);
            }
            if !command && i.key_pressed(egui::Key::F) {
                commands.push(Command::FitView);
            }
            commands
        });
        for command in commands {
            self.editor.command(command);
        }
    }

    fn render_visualization(&mut self, ui: &mut egui::Ui) {
        let available_size = ui.available_size();
        let (response, painter) =
            ui.allocate_painter(available_size, egui::Sense::click_and_drag());
        let rect = response.rect;

        painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(18, 22, 28));

        if self.editor.is_loading() {
            let message = if self.is_busy() {
                "Loading site geometry..."
            } else {
                "No site loaded. Use File > Open Site."
            };
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                message,
                egui::FontId::proportional(18.0),
                egui::Color32::GRAY,
            );
            return;
        }

        self.editor.set_screen_rect(ScreenRect::new(
            rect.left() as f64,
            rect.top() as f64,
            rect.width() as f64,
            rect.height() as f64,
        ));

        if !self.is_busy() {
            self.handle_pointer(ui, &response);
        }

        let transform = self.editor.screen_transform();
        let painter = painter.with_clip_rect(rect);

        let visible = |kind: GeometryKind| match kind {
            GeometryKind::Panel => true,
            GeometryKind::Boundary => self.show_boundaries,
            GeometryKind::Marker => self.show_markers,
            GeometryKind::Label => self.show_labels,
        };

        let overlays: Vec<Drawable<'_>> = self.editor.overlays().iter().map(Drawable::from).collect();
        for drawable in overlays.iter().filter(|d| d.kind() == GeometryKind::Boundary) {
            if visible(drawable.kind()) {
                drawable.draw(&painter, &transform);
            }
        }

        let states = self.editor.states();
        for shape in self.editor.panels() {
            Drawable::Panel {
                shape,
                state: states.get(shape.id),
            }
            .draw(&painter, &transform);
        }

        for drawable in overlays.iter().filter(|d| d.kind() != GeometryKind::Boundary) {
            if visible(drawable.kind()) {
                drawable.draw(&painter, &transform);
            }
        }

        let notes = self.editor.notes();
        for note in notes.notes() {
            render::draw_note(&painter, &transform, note, notes.is_selected(note.id));
        }

        if let Some((selection, action)) = self.editor.selection_rect() {
            render::draw_selection(&painter, &transform, &selection, action);
        }

        if matches!(self.editor.mode(), InteractionMode::Panning { .. }) {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
        } else if self.editor.note_mode() && response.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
        }
    }

    /// Forward raw pointer events to the editor. Presses must start on the
    /// canvas; moves and releases are forwarded so drags can leave it.
    fn handle_pointer(&mut self, ui: &egui::Ui, response: &egui::Response) {
        let (events, time) = ui.input(|i| (i.events.clone(), i.time));
        let over_canvas = response.contains_pointer();

        for event in events {
            match event {
                egui::Event::PointerMoved(pos) => self.editor.pointer_move(to_point(pos)),
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed,
                    ..
                } => {
                    let Some(button) = to_button(button) else {
                        continue;
                    };
                    if pressed {
                        if over_canvas {
                            self.editor.pointer_down(to_point(pos), button);
                        }
                    } else {
                        self.editor.pointer_up(to_point(pos), time);
                    }
                }
                _ => {}
            }
        }

        if response.hovered() {
            let scroll_delta = ui.input(|i| i.raw_scroll_delta.y);
            if scroll_delta != 0.0 {
                if let Some(hover_pos) = response.hover_pos() {
                    self.editor.wheel(to_point(hover_pos), scroll_delta as f64);
                }
            }
        }
    }

    fn render_note_editor(&mut self, ctx: &egui::Context) {
        let Some(note_id) = self.editor.notes().editor().map(|e| e.note_id) else {
            self.editing_note = None;
            return;
        };
        let just_opened = self.editing_note != Some(note_id);
        if just_opened {
            self.editing_note = Some(note_id);
            self.note_draft = self.editor.notes().draft().unwrap_or_default().to_string();
        }

        egui::Window::new(format!("Note #{note_id}"))
            .collapsible(false)
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| {
                // Plain Enter saves; Shift+Enter falls through to the text field.
                let shift = ui.input(|i| i.modifiers.shift);
                let enter =
                    !shift && ui.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Enter));
                let escape =
                    ui.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Escape));

                let text = ui.add(
                    egui::TextEdit::multiline(&mut self.note_draft)
                        .desired_rows(4)
                        .desired_width(f32::INFINITY)
                        .hint_text("Note text"),
                );
                if just_opened {
                    text.request_focus();
                }
                if text.changed() {
                    self.editor.notes_mut().set_draft(self.note_draft.clone());
                }

                ui.label("Enter to save, Shift+Enter for a new line, Esc to cancel");
                ui.separator();

                let mut outcome = None;
                if enter {
                    outcome = Some(
                        self.editor
                            .notes_mut()
                            .handle_editor_key(EditorKey::Enter { shift: false }),
                    );
                } else if escape {
                    outcome = Some(self.editor.notes_mut().handle_editor_key(EditorKey::Escape));
                }

                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        self.editor.notes_mut().commit_edit();
                        outcome = Some(EditOutcome::Committed);
                    }
                    if ui.button("Cancel").clicked() {
                        self.editor.notes_mut().cancel_edit();
                        outcome = Some(EditOutcome::Cancelled);
                    }
                    if ui.button("Delete").clicked() {
                        self.editor.notes_mut().delete(note_id);
                        outcome = Some(EditOutcome::Committed);
                    }
                });

                if let Some(outcome) = outcome {
                    log::debug!("Note {note_id} editor closed: {outcome:?}");
                    self.editing_note = None;
                }
            });
    }

    fn render_status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let mode = match self.editor.mode() {
                InteractionMode::Idle => "Idle",
                InteractionMode::Panning { .. } => "Panning",
                InteractionMode::BoxSelecting { .. } => "Selecting",
                InteractionMode::NoteDragging { .. } => "Moving note",
            };
            ui.label(format!("Mode: {mode}"));
            ui.separator();
            if self.editor.note_mode() {
                ui.colored_label(egui::Color32::from_rgb(255, 214, 79), "Note mode");
                ui.separator();
            }
            let (index, len) = self.editor.history_position();
            ui.label(format!("History: {} / {}", index, len.saturating_sub(1)));
            ui.separator();
            ui.label(format!(
                "Zoom: {:.0}%",
                self.editor.config().canvas_width / self.editor.view_box().width * 100.0
            ));
            ui.separator();
            ui.label(format!("Notes: {}", self.editor.notes().len()));
            if self.editor.is_dirty() {
                ui.separator();
                ui.label("Unlogged changes");
            }
        });
    }
}

impl eframe::App for TrackerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check loading progress and handle async messages
        self.check_loading_progress(ctx);
        if let Some(error) = &self.error_message.clone() {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.colored_label(egui::Color32::from_rgb(244, 67, 54), error);
                    ui.separator();
                    ui.horizontal(|ui| {
                        ui.allocate_space(egui::Vec2::new(ui.available_width() / 2.0 - 25.0, 0.0));
                        if ui.button("OK").clicked() {
                            self.error_message = None;
                        }
                    });
                });
        }

        if let Some(success) = &self.success_message.clone() {
            egui::Window::new("Success")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.colored_label(egui::Color32::from_rgb(76, 175, 80), success);
                    ui.separator();
                    ui.horizontal(|ui| {
                        ui.allocate_space(egui::Vec2::new(ui.available_width() / 2.0 - 25.0, 0.0));
                        if ui.button("OK").clicked() {
                            self.success_message = None;
                        }
                    });
                });
        }

        self.render_note_editor(ctx);
        self.handle_shortcuts(ctx);

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.render_menu_bar(ui);
        });

        // Show progress bar if loading and show_progress is true
        if let LoadingState::Loading {
            file_name,
            start_time,
            show_progress,
        } = &self.loading_state
        {
            if *show_progress {
                egui::TopBottomPanel::top("loading_bar").show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(format!("Loading site: {file_name}"));
                        ui.label(format!("({:.1}s)", start_time.elapsed().as_secs_f32()));
                    });
                });
            }
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.render_status_bar(ui);
        });

        if self.show_log_panel {
            let mut action = None;
            egui::SidePanel::left("log_panel")
                .resizable(true)
                .default_width(320.0)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical()
                        .auto_shrink([false, true])
                        .show(ui, |ui| {
                            action = self.log_panel.render(
                                ui,
                                self.editor.progress(),
                                self.log_store.records(),
                                !self.editor.is_loading(),
                                self.editor.is_dirty(),
                            );
                        });
                });
            match action {
                Some(LogPanelAction::Submit(submission)) => self.handle_submit(submission),
                Some(LogPanelAction::Export) => self.handle_export_csv(),
                Some(LogPanelAction::Reset) => self.handle_reset_log(),
                None => {}
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Site Map");
            self.render_visualization(ui);
        });
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, CONFIG_KEY, self.editor.config());
    }
}
