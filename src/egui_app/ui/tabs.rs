use eframe::egui::{self, RichText};

use super::EguiApp;
use crate::workflow::PipelineStage;

impl EguiApp {
    /// Stage tabs; gated stages are shown but disabled.
    pub(super) fn render_tabs(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("stage_tabs").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("Salarycast").strong());
                ui.separator();
                let current = self.controller.current_stage();
                let gates = self.controller.gate_flags();
                let mut requested = None;
                for stage in PipelineStage::ALL {
                    let response = ui
                        .add_enabled_ui(gates.allows(stage), |ui| {
                            ui.selectable_label(stage == current, stage.label())
                        })
                        .inner;
                    let response = match stage {
                        PipelineStage::Predict => {
                            response.on_disabled_hover_text("Train a model first")
                        }
                        PipelineStage::Upload => response,
                        _ => response.on_disabled_hover_text("Upload a dataset first"),
                    };
                    if response.clicked() {
                        requested = Some(stage);
                    }
                }
                if let Some(stage) = requested {
                    self.controller.request_stage_change(stage);
                }
            });
        });
    }
}
