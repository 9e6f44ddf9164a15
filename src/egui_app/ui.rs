//! egui renderer for the salary workflow.

mod charts_panel;
mod insights_panel;
mod prediction_panel;
mod status_bar;
mod tabs;
mod training_panel;
mod upload_panel;

use std::path::{Path, PathBuf};
use std::time::Duration;

use eframe::egui::{self, Color32, RichText, Ui};

use super::charts::ChartTextures;
use super::state::{FormState, StatusBarState, StatusTone};
use crate::config::{self, AppConfig, StartupConfig};
use crate::validation::ClientValidationError;
use crate::workflow::{PipelineStage, StagePhase, WorkflowController};

const REPAINT_WHILE_BUSY: Duration = Duration::from_millis(100);
const ERROR_TEXT: Color32 = Color32::from_rgb(230, 90, 75);

/// Renders the workflow and forwards user actions to the controller.
pub struct EguiApp {
    controller: WorkflowController,
    config: AppConfig,
    /// False after a startup fallback; the file on disk is left untouched.
    config_writable: bool,
    forms: FormState,
    status: StatusBarState,
    charts: ChartTextures,
}

impl EguiApp {
    pub fn new(controller: WorkflowController, startup: StartupConfig) -> Self {
        let StartupConfig { config, writable } = startup;
        let forms = FormState::new(&config.training);
        Self {
            controller,
            config,
            config_writable: writable,
            forms,
            status: StatusBarState::idle(),
            charts: ChartTextures::default(),
        }
    }

    fn poll_jobs(&mut self) {
        for outcome in self.controller.poll_jobs() {
            self.status.apply_outcome(&outcome);
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|input| input.raw.dropped_files.clone());
        let Some(path) = dropped.into_iter().filter_map(|file| file.path).next() else {
            return;
        };
        self.forms.selected_file = Some(path.clone());
        self.upload(path);
    }

    fn pick_csv(&mut self) {
        let mut dialog = rfd::FileDialog::new().add_filter("CSV", &["csv"]);
        if let Some(dir) = self.config.ui.last_upload_dir.as_deref() {
            dialog = dialog.set_directory(dir);
        }
        let Some(path) = dialog.pick_file() else {
            return;
        };
        self.remember_upload_dir(&path);
        self.forms.selected_file = Some(path);
    }

    fn upload(&mut self, path: PathBuf) {
        let result = self.controller.trigger_upload(&path);
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.report_trigger(result, format!("Uploading {name}..."));
    }

    fn remember_upload_dir(&mut self, path: &Path) {
        let Some(dir) = path.parent() else {
            return;
        };
        if self.config.ui.last_upload_dir.as_deref() == Some(dir) {
            return;
        }
        self.config.ui.last_upload_dir = Some(dir.to_path_buf());
        if !self.config_writable {
            tracing::debug!("Config is read-only this launch; not saving upload folder");
            return;
        }
        if let Err(err) = config::save(&self.config) {
            tracing::warn!("Failed to save config: {err}");
        }
    }

    /// Surface what a controller trigger did in the status bar.
    fn report_trigger(
        &mut self,
        result: Result<bool, ClientValidationError>,
        busy_text: impl Into<String>,
    ) {
        match result {
            Ok(true) => self.status.set(busy_text, StatusTone::Busy),
            Ok(false) => {}
            Err(err) => self.status.set(err.to_string(), StatusTone::Warning),
        }
    }

    fn render_stage(&mut self, ui: &mut Ui) {
        match self.controller.current_stage() {
            PipelineStage::Upload => self.render_upload_panel(ui),
            PipelineStage::Visualize => self.render_charts_panel(ui),
            PipelineStage::Train => self.render_training_panel(ui),
            PipelineStage::Predict => self.render_prediction_panel(ui),
            PipelineStage::Insights => self.render_insights_panel(ui),
        }
    }
}

impl eframe::App for EguiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_jobs();
        self.handle_dropped_files(ctx);
        self.render_tabs(ctx);
        self.render_status(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_salt("stage_scroll")
                .show(ui, |ui| self.render_stage(ui));
        });
        if self.controller.is_busy() {
            ctx.request_repaint_after(REPAINT_WHILE_BUSY);
        }
    }
}

/// Spinner or error for a phase; the payload when it is ready.
fn show_phase<'a, T>(ui: &mut Ui, phase: &'a StagePhase<T>, loading_text: &str) -> Option<&'a T> {
    match phase {
        StagePhase::Idle => None,
        StagePhase::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(loading_text);
            });
            None
        }
        StagePhase::Failed(message) => {
            ui.label(RichText::new(message).color(ERROR_TEXT));
            None
        }
        StagePhase::Ready(value) => Some(value),
    }
}

/// `$1,234,567.89` style formatting.
fn format_salary(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}
