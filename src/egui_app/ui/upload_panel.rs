use eframe::egui::{self, RichText, Ui};

use super::{EguiApp, show_phase};
use crate::egui_app::state::StatusTone;
use crate::types::{DatasetStats, DatasetSummary};

/// Preview rows shown below the upload summary.
const PREVIEW_ROWS: usize = 10;

impl EguiApp {
    pub(super) fn render_upload_panel(&mut self, ui: &mut Ui) {
        ui.heading("Upload dataset");
        ui.label("Choose or drop a CSV file with employee experience and salary columns.");
        ui.add_space(8.0);

        let uploading = self.controller.upload_stage().upload.is_loading();
        let mut upload_clicked = false;
        ui.horizontal(|ui| {
            if ui.button("Choose CSV...").clicked() {
                self.pick_csv();
            }
            match &self.forms.selected_file {
                Some(path) => ui.label(path.display().to_string()),
                None => ui.weak("No file selected"),
            };
            upload_clicked = ui
                .add_enabled(
                    !uploading && self.forms.selected_file.is_some(),
                    egui::Button::new("Upload"),
                )
                .clicked();
        });
        if upload_clicked {
            if let Some(path) = self.forms.selected_file.clone() {
                self.upload(path);
            }
        }
        ui.add_space(8.0);

        if let Some(summary) = show_phase(ui, &self.controller.upload_stage().upload, "Uploading...")
        {
            render_summary(ui, summary);
        }

        if !self.controller.gate_flags().has_dataset {
            return;
        }
        ui.add_space(12.0);
        ui.separator();
        let stats_loading = self.controller.upload_stage().stats.is_loading();
        let mut stats_clicked = false;
        ui.horizontal(|ui| {
            ui.label(RichText::new("Column statistics").strong());
            stats_clicked = ui
                .add_enabled(!stats_loading, egui::Button::new("Load"))
                .clicked();
        });
        if stats_clicked && self.controller.refresh_dataset_stats() {
            self.status
                .set("Loading column statistics...", StatusTone::Busy);
        }
        if let Some(stats) = show_phase(ui, &self.controller.upload_stage().stats, "Loading...") {
            render_stats(ui, stats);
        }
    }
}

fn render_summary(ui: &mut Ui, summary: &DatasetSummary) {
    if !summary.message.is_empty() {
        ui.label(&summary.message);
    }
    ui.label(format!(
        "{}: {} rows, {} columns",
        summary.file_name, summary.row_count, summary.column_count
    ));
    if summary.preview.is_empty() {
        return;
    }
    ui.add_space(6.0);
    egui::ScrollArea::horizontal()
        .id_salt("preview_scroll")
        .show(ui, |ui| {
            egui::Grid::new("dataset_preview")
                .striped(true)
                .show(ui, |ui| {
                    for column in &summary.column_names {
                        ui.label(RichText::new(column).strong());
                    }
                    ui.end_row();
                    for row in 0..summary.preview.len().min(PREVIEW_ROWS) {
                        for column in &summary.column_names {
                            ui.label(summary.preview_cell(row, column).to_string());
                        }
                        ui.end_row();
                    }
                });
        });
}

fn render_stats(ui: &mut Ui, stats: &DatasetStats) {
    egui::Grid::new("dataset_stats").striped(true).show(ui, |ui| {
        ui.label("Rows");
        ui.label(stats.total_rows.to_string());
        ui.end_row();
        ui.label("Columns");
        ui.label(stats.total_columns.to_string());
        ui.end_row();
        ui.label("Numeric");
        ui.label(stats.numeric_columns.join(", "));
        ui.end_row();
        ui.label("Categorical");
        ui.label(stats.categorical_columns.join(", "));
        ui.end_row();
    });
    let missing = stats
        .missing_values
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(column, count)| format!("{column}: {count}"))
        .collect::<Vec<_>>();
    if missing.is_empty() {
        ui.weak("No missing values");
    } else {
        ui.label(format!("Missing values - {}", missing.join(", ")));
    }
}
