//! Per-stage state. Each stage owns its phases and nothing else.

use super::phase::StagePhase;
use crate::types::{
    AlgorithmInfo, BenchmarkResult, ChartSet, DatasetStats, DatasetSummary, InsightsSummary,
    ModelInfo, PredictionOutcome, Transfer, TrainingResult,
};

#[derive(Clone, Debug, Default)]
pub struct UploadStage {
    pub upload: StagePhase<DatasetSummary>,
    /// Column statistics, fetched on request.
    pub stats: StagePhase<DatasetStats>,
}

#[derive(Clone, Debug, Default)]
pub struct VisualizationStage {
    pub charts: StagePhase<ChartSet>,
}

impl VisualizationStage {
    pub(crate) fn reset(&mut self) {
        self.charts.reset();
    }
}

#[derive(Clone, Debug, Default)]
pub struct TrainingStage {
    pub algorithms: StagePhase<Vec<AlgorithmInfo>>,
    pub result: StagePhase<TrainingResult>,
    pub model_info: StagePhase<ModelInfo>,
}

impl TrainingStage {
    /// Catalog used to validate an algorithm choice, once it is known.
    pub fn advertised_algorithms(&self) -> Option<&[AlgorithmInfo]> {
        self.algorithms.ready().map(Vec::as_slice)
    }
}

#[derive(Clone, Debug, Default)]
pub struct PredictionStage {
    pub outcome: StagePhase<PredictionOutcome>,
}

/// A transfer handed to the OS, with the error if it could not be opened.
#[derive(Clone, Debug, PartialEq)]
pub struct TransferRecord {
    pub transfer: Transfer,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct InsightsStage {
    pub summary: StagePhase<InsightsSummary>,
    /// Guarded independently of `summary`.
    pub benchmark: StagePhase<BenchmarkResult>,
    pub last_transfer: Option<TransferRecord>,
}

impl InsightsStage {
    pub(crate) fn reset(&mut self) {
        self.summary.reset();
        self.benchmark.reset();
        self.last_transfer = None;
    }
}
