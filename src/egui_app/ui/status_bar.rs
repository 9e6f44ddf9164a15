use eframe::egui::{self, Color32, RichText};

use super::EguiApp;

impl EguiApp {
    pub(super) fn render_status(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            let (badge_label, badge_color) = self.status.badge();
            ui.horizontal(|ui| {
                ui.add_space(8.0);
                ui.painter().circle_filled(
                    ui.cursor().min + egui::vec2(6.0, 9.0),
                    6.0,
                    badge_color,
                );
                ui.add_space(16.0);
                ui.label(RichText::new(badge_label).color(Color32::WHITE));
                ui.separator();
                let response = ui.label(&self.status.text);
                if !self.status.log.is_empty() {
                    response.on_hover_text(self.status.log_text());
                }
                if self.controller.is_busy() {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.spinner();
                    });
                }
            });
        });
    }
}
