// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use eframe::egui;
use egui_extras::{Column, TableBuilder};

use pv_string_tracker::export::daily_log_rows;
use pv_string_tracker::{DailyLogRecord, LogDate, Progress, ProgressCounter};

/// Validated daily-log submission from the form.
#[derive(Debug, Clone, PartialEq)]
pub struct LogSubmission {
    pub date: LogDate,
    pub subcontractor: String,
    pub workers: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogPanelAction {
    Submit(LogSubmission),
    Export,
    Reset,
}

pub struct LogPanel {
    date: String,
    subcontractor: String,
    workers: u32,
    form_error: Option<String>,
    confirm_reset: bool,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            date: LogDate::today().to_string(),
            subcontractor: String::new(),
            workers: 1,
            form_error: None,
            confirm_reset: false,
        }
    }

    fn validate(&self) -> Result<LogSubmission, String> {
        let date: LogDate = self
            .date
            .parse()
            .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", self.date.trim()))?;
        let subcontractor = self.subcontractor.trim();
        if subcontractor.is_empty() {
            return Err("Subcontractor is required".to_string());
        }
        Ok(LogSubmission {
            date,
            subcontractor: subcontractor.to_string(),
            workers: self.workers,
        })
    }

    /// Draw the progress summary, the submission form and the history table.
    pub fn render(
        &mut self,
        ui: &mut egui::Ui,
        progress: Progress,
        records: &[DailyLogRecord],
        enabled: bool,
        dirty: bool,
    ) -> Option<LogPanelAction> {
        let mut action = None;

        ui.heading("Progress");
        render_counter(ui, "MC4 installed", progress.mc4);
        render_counter(ui, "Terminated", progress.termination);
        if dirty {
            ui.colored_label(
                egui::Color32::from_rgb(255, 152, 0),
                "Changes since the last log entry",
            );
        }

        ui.separator();
        ui.heading("Daily Log");

        ui.add_enabled_ui(enabled, |ui| {
            egui::Grid::new("daily_log_form")
                .num_columns(2)
                .spacing([8.0, 4.0])
                .show(ui, |ui| {
                    ui.label("Date:");
                    ui.add(egui::TextEdit::singleline(&mut self.date).hint_text("YYYY-MM-DD"));
                    ui.end_row();

                    ui.label("Subcontractor:");
                    ui.text_edit_singleline(&mut self.subcontractor);
                    ui.end_row();

                    ui.label("Workers:");
                    ui.add(egui::DragValue::new(&mut self.workers).range(0..=500));
                    ui.end_row();
                });

            ui.horizontal(|ui| {
                if ui.button("Submit Entry").clicked() {
                    match self.validate() {
                        Ok(submission) => {
                            self.form_error = None;
                            action = Some(LogPanelAction::Submit(submission));
                        }
                        Err(message) => self.form_error = Some(message),
                    }
                }
                if ui
                    .add_enabled(!records.is_empty(), egui::Button::new("Export CSV"))
                    .clicked()
                {
                    action = Some(LogPanelAction::Export);
                }
            });
        });

        if let Some(message) = &self.form_error {
            ui.colored_label(egui::Color32::from_rgb(244, 67, 54), message);
        }

        ui.separator();
        ui.label(format!("Entries: {}", records.len()));

        if !records.is_empty() {
            render_history(ui, records);

            ui.horizontal(|ui| {
                if self.confirm_reset {
                    ui.label("Delete all entries?");
                    if ui.button("Yes").clicked() {
                        self.confirm_reset = false;
                        action = Some(LogPanelAction::Reset);
                    }
                    if ui.button("No").clicked() {
                        self.confirm_reset = false;
                    }
                } else if ui.button("Reset Log").clicked() {
                    self.confirm_reset = true;
                }
            });
        }

        action
    }
}

impl Default for LogPanel {
    fn default() -> Self {
        Self::new()
    }
}

fn render_counter(ui: &mut egui::Ui, title: &str, counter: ProgressCounter) {
    ui.label(format!(
        "{title}: {} / {} ({} remaining)",
        counter.completed,
        counter.total,
        counter.remaining()
    ));
    ui.add(
        egui::ProgressBar::new(counter.percent() / 100.0)
            .show_percentage()
            .desired_width(ui.available_width()),
    );
}

fn render_history(ui: &mut egui::Ui, records: &[DailyLogRecord]) {
    let rows = daily_log_rows(records);

    TableBuilder::new(ui)
        .striped(true)
        .resizable(false)
        .max_scroll_height(240.0)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::exact(80.0))
        .column(Column::exact(55.0))
        .column(Column::exact(45.0))
        .column(Column::remainder().at_least(80.0))
        .column(Column::exact(35.0))
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Date");
            });
            header.col(|ui| {
                ui.strong("Panels");
            });
            header.col(|ui| {
                ui.strong("+/-");
            });
            header.col(|ui| {
                ui.strong("Subcontractor");
            });
            header.col(|ui| {
                ui.strong("Crew");
            });
        })
        .body(|mut body| {
            for row in &rows {
                body.row(18.0, |mut table_row| {
                    table_row.col(|ui| {
                        ui.monospace(&row.date);
                    });
                    table_row.col(|ui| {
                        ui.label(row.installed_panels.to_string());
                    });
                    table_row.col(|ui| {
                        ui.label(format!("{:+}", row.daily_increase));
                    });
                    table_row.col(|ui| {
                        ui.label(&row.subcontractor);
                    });
                    table_row.col(|ui| {
                        ui.label(row.workers.to_string());
                    });
                });
            }
        });
}
