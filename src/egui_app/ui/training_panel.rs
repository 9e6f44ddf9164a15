use eframe::egui::{self, RichText, Ui};

use super::{EguiApp, show_phase};
use crate::egui_app::state::StatusTone;
use crate::types::{ModelInfo, ModelMetrics, TrainingResult};
use crate::validation::{MAX_TEST_FRACTION, MIN_TEST_FRACTION};

impl EguiApp {
    pub(super) fn render_training_panel(&mut self, ui: &mut Ui) {
        ui.heading("Train model");
        ui.add_space(8.0);
        self.render_algorithm_picker(ui);

        ui.horizontal(|ui| {
            ui.label("Test size");
            ui.add(
                egui::Slider::new(
                    &mut self.forms.test_fraction,
                    MIN_TEST_FRACTION..=MAX_TEST_FRACTION,
                )
                .step_by(0.05)
                .fixed_decimals(2),
            );
        });

        let training = self.controller.training_stage().result.is_loading();
        if ui
            .add_enabled(!training, egui::Button::new("Train model"))
            .clicked()
        {
            let result = self
                .controller
                .trigger_training(&self.forms.algorithm, self.forms.test_fraction);
            let busy = format!("Training {}...", self.forms.algorithm);
            self.report_trigger(result, busy);
        }
        ui.add_space(8.0);
        if let Some(result) =
            show_phase(ui, &self.controller.training_stage().result, "Training...")
        {
            render_training_result(ui, result);
        }

        ui.add_space(12.0);
        ui.separator();
        let info_loading = self.controller.training_stage().model_info.is_loading();
        let mut check_clicked = false;
        ui.horizontal(|ui| {
            ui.label(RichText::new("Service model").strong());
            check_clicked = ui
                .add_enabled(!info_loading, egui::Button::new("Check"))
                .clicked();
        });
        if check_clicked && self.controller.refresh_model_info() {
            self.status.set("Checking service model...", StatusTone::Busy);
        }
        match show_phase(ui, &self.controller.training_stage().model_info, "Checking...") {
            Some(ModelInfo::Untrained) => {
                ui.weak("The service has no trained model");
            }
            Some(ModelInfo::Trained {
                model_type,
                feature_names,
                metrics,
            }) => {
                ui.label(format!("{model_type} on {}", feature_names.join(", ")));
                if let Some(metrics) = metrics {
                    render_metrics(ui, "service_model_metrics", metrics);
                }
            }
            None => {}
        }
    }

    fn render_algorithm_picker(&mut self, ui: &mut Ui) {
        let stage = self.controller.training_stage();
        let loading = stage.algorithms.is_loading();
        let mut retry = false;
        match show_phase(ui, &stage.algorithms, "Loading algorithms...") {
            Some(algorithms) if algorithms.is_empty() => {
                ui.label("The service does not offer any algorithms.");
            }
            Some(algorithms) => {
                let selected = algorithms
                    .iter()
                    .find(|algorithm| algorithm.id == self.forms.algorithm)
                    .map(|algorithm| algorithm.name.clone())
                    .unwrap_or_else(|| self.forms.algorithm.clone());
                egui::ComboBox::from_label("Algorithm")
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        for algorithm in algorithms {
                            ui.selectable_value(
                                &mut self.forms.algorithm,
                                algorithm.id.clone(),
                                &algorithm.name,
                            )
                            .on_hover_text(&algorithm.description);
                        }
                    });
            }
            None => {
                ui.horizontal(|ui| {
                    ui.label("Algorithm");
                    ui.text_edit_singleline(&mut self.forms.algorithm);
                    retry = !loading && ui.button("Reload list").clicked();
                });
            }
        }
        if retry {
            self.controller.refresh_algorithms();
        }
    }
}

fn render_training_result(ui: &mut Ui, result: &TrainingResult) {
    if !result.message.is_empty() {
        ui.label(&result.message);
    }
    ui.label(format!(
        "{} trained in {:.2}s",
        result.algorithm, result.training_time_seconds
    ));
    render_metrics(ui, "training_metrics", &result.metrics);
    let Some(importance) = &result.feature_importance else {
        return;
    };
    let mut ranked = importance.iter().collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.1.total_cmp(a.1));
    ui.add_space(6.0);
    ui.label(RichText::new("Feature importance").strong());
    egui::Grid::new("feature_importance").striped(true).show(ui, |ui| {
        for (feature, weight) in ranked {
            ui.label(feature);
            ui.label(format!("{weight:.4}"));
            ui.end_row();
        }
    });
}

fn render_metrics(ui: &mut Ui, id: &str, metrics: &ModelMetrics) {
    egui::Grid::new(id).striped(true).show(ui, |ui| {
        ui.label("R²");
        ui.label(format!("{:.4}", metrics.r2_score));
        ui.end_row();
        ui.label("MAE");
        ui.label(super::format_salary(metrics.mean_absolute_error));
        ui.end_row();
        ui.label("RMSE");
        ui.label(super::format_salary(metrics.root_mean_squared_error));
        ui.end_row();
        if let Some(mse) = metrics.mean_squared_error {
            ui.label("MSE");
            ui.label(format!("{mse:.2}"));
            ui.end_row();
        }
    });
}
