//! The gated salary workflow: stage state, navigation rules and background
//! gateway jobs.

mod controller;
mod jobs;
mod phase;
mod stage;
mod stages;

#[cfg(test)]
mod test_support;

pub use controller::{JobOutcome, WorkflowController, WorkflowTask};
pub use phase::StagePhase;
pub use stage::{GateFlags, PipelineStage};
pub use stages::{
    InsightsStage, PredictionStage, TrainingStage, TransferRecord, UploadStage,
    VisualizationStage,
};
