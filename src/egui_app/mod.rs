//! egui front end for the salary workflow.

mod charts;
/// Form and status-bar state owned by the renderer.
pub mod state;
mod ui;

pub use ui::EguiApp;
