use std::collections::BTreeMap;

use eframe::egui::{self, RichText, Ui};

use super::{ERROR_TEXT, EguiApp, format_salary, show_phase};
use crate::egui_app::state::StatusTone;
use crate::types::{BenchmarkResult, ExportFormat, InsightsSummary, Transfer};

impl EguiApp {
    pub(super) fn render_insights_panel(&mut self, ui: &mut Ui) {
        let loading = self.controller.insights_stage().summary.is_loading();
        let mut refresh = false;
        ui.horizontal(|ui| {
            ui.heading("HR insights");
            refresh = ui
                .add_enabled(!loading, egui::Button::new("Refresh"))
                .clicked();
        });
        if refresh && self.controller.refresh_insights() {
            self.status.set("Loading insights...", StatusTone::Busy);
        }
        ui.add_space(8.0);
        if let Some(summary) = show_phase(
            ui,
            &self.controller.insights_stage().summary,
            "Loading insights...",
        ) {
            render_summary(ui, summary);
        }

        ui.add_space(12.0);
        ui.separator();
        self.render_benchmark(ui);

        ui.add_space(12.0);
        ui.separator();
        self.render_transfers(ui);
    }

    fn render_benchmark(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Salary benchmark").strong());
        let busy = self.controller.insights_stage().benchmark.is_loading();
        let mut requested = false;
        ui.horizontal(|ui| {
            ui.label("Years of experience");
            ui.add(
                egui::TextEdit::singleline(&mut self.forms.benchmark_experience)
                    .desired_width(80.0),
            );
            requested = ui
                .add_enabled(!busy, egui::Button::new("Benchmark"))
                .clicked();
        });
        if requested {
            let result = self
                .controller
                .request_benchmark(&self.forms.benchmark_experience);
            self.report_trigger(result, "Loading benchmark...");
        }
        if let Some(benchmark) = show_phase(
            ui,
            &self.controller.insights_stage().benchmark,
            "Loading benchmark...",
        ) {
            render_benchmark(ui, benchmark);
        }
    }

    fn render_transfers(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Reports").strong());
        let has_model = self.controller.gate_flags().has_trained_model;
        let mut export = None;
        let mut download = false;
        ui.horizontal(|ui| {
            for format in [ExportFormat::Csv, ExportFormat::Excel] {
                if ui.button(format!("Export {}", format.label())).clicked() {
                    export = Some(format);
                }
            }
            download = ui
                .add_enabled(has_model, egui::Button::new("Download model"))
                .on_disabled_hover_text("Train a model first")
                .clicked();
        });
        if let Some(format) = export {
            if self.controller.export_report(format) {
                self.report_last_transfer();
            }
        }
        if download {
            match self.controller.download_model() {
                Ok(_) => self.report_last_transfer(),
                Err(err) => self.status.set(err.to_string(), StatusTone::Warning),
            }
        }
        if let Some(record) = &self.controller.insights_stage().last_transfer {
            match &record.error {
                Some(message) => {
                    ui.label(RichText::new(message).color(ERROR_TEXT));
                }
                None => {
                    ui.weak(format!("{} opened in your browser", transfer_label(&record.transfer)));
                }
            }
        }
    }

    fn report_last_transfer(&mut self) {
        let Some(record) = self.controller.insights_stage().last_transfer.clone() else {
            return;
        };
        let label = transfer_label(&record.transfer);
        match record.error {
            Some(message) => self.status.set(format!("{label} failed: {message}"), StatusTone::Error),
            None => self.status.set(format!("{label} started"), StatusTone::Info),
        }
    }
}

fn transfer_label(transfer: &Transfer) -> String {
    match transfer {
        Transfer::Export(format) => format!("{} export", format.label()),
        Transfer::ModelDownload => "Model download".to_string(),
    }
}

fn render_summary(ui: &mut Ui, summary: &InsightsSummary) {
    egui::Grid::new("insights_summary").striped(true).show(ui, |ui| {
        ui.label("Average salary");
        ui.label(format_salary(summary.average_salary));
        ui.end_row();
        ui.label("Median salary");
        ui.label(format_salary(summary.median_salary));
        ui.end_row();
        ui.label("Employees");
        ui.label(summary.total_employees.to_string());
        ui.end_row();
    });
    render_salary_table(ui, "insights_percentiles", "Percentiles", &summary.percentiles);
    if let Some(buckets) = &summary.salary_by_experience_bucket {
        render_salary_table(ui, "insights_buckets", "Average salary by experience", buckets);
    }
}

fn render_salary_table(ui: &mut Ui, id: &str, title: &str, values: &BTreeMap<String, f64>) {
    if values.is_empty() {
        return;
    }
    ui.add_space(6.0);
    ui.label(RichText::new(title).strong());
    egui::Grid::new(id).striped(true).show(ui, |ui| {
        for (label, value) in values {
            ui.label(label);
            ui.label(format_salary(*value));
            ui.end_row();
        }
    });
}

fn render_benchmark(ui: &mut Ui, benchmark: &BenchmarkResult) {
    ui.label(format!(
        "{} employees with about {} years of experience",
        benchmark.sample_size, benchmark.experience
    ));
    egui::Grid::new("benchmark").striped(true).show(ui, |ui| {
        for (label, value) in [
            ("Average", benchmark.average_salary),
            ("Median", benchmark.median_salary),
            ("Minimum", benchmark.min_salary),
            ("Maximum", benchmark.max_salary),
        ] {
            ui.label(label);
            ui.label(format_salary(value));
            ui.end_row();
        }
    });
}
