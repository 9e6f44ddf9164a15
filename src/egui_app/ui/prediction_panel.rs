use eframe::egui::{self, RichText, Ui};

use super::{EguiApp, format_salary, show_phase};
use crate::types::PredictionOutcome;

impl EguiApp {
    pub(super) fn render_prediction_panel(&mut self, ui: &mut Ui) {
        ui.heading("Predict salaries");
        ui.add_space(8.0);
        let busy = self.controller.prediction_stage().outcome.is_loading();

        let mut single = false;
        ui.horizontal(|ui| {
            ui.label("Years of experience");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.forms.single_experience).desired_width(80.0),
            );
            let submitted =
                response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));
            single = ui.add_enabled(!busy, egui::Button::new("Predict")).clicked()
                || (submitted && !busy);
        });
        if single {
            let result = self
                .controller
                .predict_single(&self.forms.single_experience);
            self.report_trigger(result, "Predicting...");
        }

        let mut batch = false;
        ui.horizontal(|ui| {
            ui.label("Batch (comma separated)");
            ui.text_edit_singleline(&mut self.forms.batch_experiences);
            batch = ui
                .add_enabled(!busy, egui::Button::new("Predict batch"))
                .clicked();
        });
        if batch {
            let result = self
                .controller
                .predict_batch(&self.forms.batch_experiences);
            self.report_trigger(result, "Predicting batch...");
        }
        ui.add_space(8.0);

        let Some(outcome) =
            show_phase(ui, &self.controller.prediction_stage().outcome, "Predicting...")
        else {
            return;
        };
        if let PredictionOutcome::Single(prediction) = outcome {
            ui.label(
                RichText::new(format!(
                    "Predicted salary for {} years: {}",
                    prediction.experience,
                    format_salary(prediction.predicted_salary)
                ))
                .strong(),
            );
            return;
        }
        egui::Grid::new("batch_predictions")
            .striped(true)
            .show(ui, |ui| {
                ui.label(RichText::new("Experience").strong());
                ui.label(RichText::new("Predicted salary").strong());
                ui.end_row();
                for prediction in outcome.predictions() {
                    ui.label(format!("{} years", prediction.experience));
                    ui.label(format_salary(prediction.predicted_salary));
                    ui.end_row();
                }
            });
    }
}
