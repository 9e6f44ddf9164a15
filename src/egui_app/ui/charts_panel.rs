use eframe::egui::{self, RichText, Ui};

use super::{EguiApp, ERROR_TEXT, show_phase};
use crate::egui_app::charts;
use crate::egui_app::state::StatusTone;
use crate::types::{ChartImage, ChartKind};

const MAX_CHART_WIDTH: f32 = 720.0;

impl EguiApp {
    pub(super) fn render_charts_panel(&mut self, ui: &mut Ui) {
        let loading = self.controller.visualization_stage().charts.is_loading();
        let mut refresh = false;
        ui.horizontal(|ui| {
            ui.heading("Visualizations");
            refresh = ui
                .add_enabled(!loading, egui::Button::new("Refresh"))
                .clicked();
        });
        if refresh && self.controller.refresh_visualizations() {
            self.status.set("Rendering charts...", StatusTone::Busy);
        }
        ui.add_space(8.0);

        let phase = &self.controller.visualization_stage().charts;
        let Some(chart_set) = show_phase(ui, phase, "Rendering charts...") else {
            self.charts.retain(None);
            return;
        };
        self.charts.retain(Some(chart_set));
        let mut save_request = None;
        for kind in ChartKind::ALL {
            ui.label(RichText::new(kind.title()).strong());
            let Some(chart) = chart_set.get(&kind) else {
                ui.weak("Not available for this dataset");
                ui.add_space(12.0);
                continue;
            };
            match self.charts.texture(ui.ctx(), kind, chart) {
                Ok(texture) => {
                    let width = ui.available_width().min(MAX_CHART_WIDTH);
                    ui.add(egui::Image::new(texture).max_width(width));
                    if ui.button("Save PNG...").clicked() {
                        save_request = Some((kind, chart.clone()));
                    }
                }
                Err(message) => {
                    ui.label(RichText::new(message).color(ERROR_TEXT));
                }
            }
            ui.add_space(12.0);
        }
        if let Some((kind, chart)) = save_request {
            self.save_chart(kind, &chart);
        }
    }

    fn save_chart(&mut self, kind: ChartKind, chart: &ChartImage) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG image", &["png"])
            .set_file_name(format!("{}.png", kind.wire_key()))
            .save_file()
        else {
            return;
        };
        match charts::save_png(chart, &path) {
            Ok(()) => self.status.set(
                format!("Saved {} to {}", kind.title(), path.display()),
                StatusTone::Info,
            ),
            Err(err) => self.status.set(err.to_string(), StatusTone::Error),
        }
    }
}
