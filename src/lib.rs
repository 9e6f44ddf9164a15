//! Desktop client for a remote salary-prediction service.
/// Per-user application directories.
pub mod app_dirs;
/// Persistent TOML configuration.
pub mod config;
/// egui renderer.
pub mod egui_app;
/// Typed client for the remote service.
pub mod gateway;
/// Shared HTTP agent helpers.
pub mod http_client;
/// Tracing subscriber setup.
pub mod logging;
/// Client-side data model.
pub mod types;
/// Client-side input checks.
pub mod validation;
/// Stage navigation, gating and background jobs.
pub mod workflow;
