#![deny(missing_docs)]
#![deny(warnings)]

//! Entry point for the egui-based Salarycast client.
#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]
use std::sync::Arc;

use eframe::egui;
use salarycast::config;
use salarycast::egui_app::EguiApp;
use salarycast::gateway::HttpGateway;
use salarycast::logging;
use salarycast::workflow::WorkflowController;

const MIN_VIEWPORT_SIZE: egui::Vec2 = egui::vec2(720.0, 520.0);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }

    let startup = config::load_for_startup();
    let service = &startup.config.service;
    tracing::info!("Using salary service at {}", service.effective_base_url());

    let gateway = HttpGateway::new(service.effective_base_url(), service.timeouts());
    let controller =
        WorkflowController::new(Arc::new(gateway), startup.config.upload.max_file_bytes);

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([960.0, 720.0])
        .with_min_inner_size(MIN_VIEWPORT_SIZE)
        .with_drag_and_drop(true);
    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "Salarycast",
        native_options,
        Box::new(move |_cc| Ok(Box::new(EguiApp::new(controller, startup)))),
    )?;
    Ok(())
}
