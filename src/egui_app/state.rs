//! UI-only state: form inputs and the status bar. Workflow state lives in
//! [`crate::workflow::WorkflowController`].

use std::path::PathBuf;

use egui::Color32;

use crate::config::TrainingDefaults;
use crate::workflow::JobOutcome;

/// Maximum number of lines kept in the status log.
const MAX_STATUS_LOG: usize = 50;

/// Text inputs backing the stage panels.
#[derive(Clone, Debug, PartialEq)]
pub struct FormState {
    /// Last file the user chose or dropped.
    pub selected_file: Option<PathBuf>,
    pub algorithm: String,
    pub test_fraction: f64,
    pub single_experience: String,
    pub batch_experiences: String,
    pub benchmark_experience: String,
}

impl FormState {
    pub fn new(defaults: &TrainingDefaults) -> Self {
        Self {
            selected_file: None,
            algorithm: defaults.default_algorithm.clone(),
            test_fraction: defaults.default_test_fraction,
            single_experience: String::new(),
            batch_experiences: String::new(),
            benchmark_experience: String::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTone {
    Idle,
    Busy,
    Info,
    Warning,
    Error,
}

pub(crate) fn status_badge(tone: StatusTone) -> (&'static str, Color32) {
    match tone {
        StatusTone::Idle => ("Idle", Color32::from_rgb(42, 42, 42)),
        StatusTone::Busy => ("Working", Color32::from_rgb(31, 139, 255)),
        StatusTone::Info => ("Info", Color32::from_rgb(64, 140, 112)),
        StatusTone::Warning => ("Warning", Color32::from_rgb(192, 138, 43)),
        StatusTone::Error => ("Error", Color32::from_rgb(192, 57, 43)),
    }
}

/// Status badge + text shown in the footer.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusBarState {
    pub text: String,
    pub tone: StatusTone,
    /// Rolling log, oldest first.
    pub log: Vec<String>,
}

impl StatusBarState {
    pub fn idle() -> Self {
        Self {
            text: "Upload a CSV file to get started".into(),
            tone: StatusTone::Idle,
            log: Vec::new(),
        }
    }

    pub fn set(&mut self, text: impl Into<String>, tone: StatusTone) {
        self.text = text.into();
        self.tone = tone;
        self.log.push(self.text.clone());
        if self.log.len() > MAX_STATUS_LOG {
            let excess = self.log.len() - MAX_STATUS_LOG;
            self.log.drain(..excess);
        }
    }

    /// Show a finished job: successes as info, failures as errors.
    pub fn apply_outcome(&mut self, outcome: &JobOutcome) {
        let label = outcome.task.label();
        match &outcome.result {
            Ok(summary) => self.set(format!("{label}: {summary}"), StatusTone::Info),
            Err(message) => self.set(format!("{label} failed: {message}"), StatusTone::Error),
        }
    }

    pub fn badge(&self) -> (&'static str, Color32) {
        status_badge(self.tone)
    }

    pub fn log_text(&self) -> String {
        self.log.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::WorkflowTask;

    #[test]
    fn log_is_bounded() {
        let mut status = StatusBarState::idle();
        for index in 0..(MAX_STATUS_LOG + 5) {
            status.set(format!("line {index}"), StatusTone::Info);
        }
        assert_eq!(status.log.len(), MAX_STATUS_LOG);
        assert_eq!(status.log[0], "line 5");
        assert_eq!(status.text, format!("line {}", MAX_STATUS_LOG + 4));
    }

    #[test]
    fn outcomes_pick_tone_from_result() {
        let mut status = StatusBarState::idle();
        status.apply_outcome(&JobOutcome {
            task: WorkflowTask::Training,
            result: Err("No data loaded".into()),
        });
        assert_eq!(status.tone, StatusTone::Error);
        assert_eq!(status.text, "Training failed: No data loaded");
        status.apply_outcome(&JobOutcome {
            task: WorkflowTask::Upload,
            result: Ok("Uploaded a.csv".into()),
        });
        assert_eq!(status.badge().0, "Info");
    }

    #[test]
    fn form_starts_from_training_defaults() {
        let form = FormState::new(&TrainingDefaults::default());
        assert_eq!(form.algorithm, "linear");
        assert_eq!(form.test_fraction, 0.2);
        assert!(form.batch_experiences.is_empty());
    }
}
