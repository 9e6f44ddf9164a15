use std::path::Path;
use std::sync::Arc;

use super::jobs::{JobMessage, JobPayload, WorkflowJobs};
use super::phase::StagePhase;
use super::stage::{GateFlags, PipelineStage};
use super::stages::{
    InsightsStage, PredictionStage, TrainingStage, TransferRecord, UploadStage,
    VisualizationStage,
};
use crate::gateway::{GatewayError, SalaryGateway};
use crate::types::{
    DatasetSummary, ExportFormat, ModelInfo, PredictionOutcome, PredictionQuery, Transfer,
    TrainingResult,
};
use crate::validation::{self, ClientValidationError, Experience, ExperienceBatch};

/// Background work the controller reports on when it finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkflowTask {
    Upload,
    DatasetStats,
    Visualizations,
    Algorithms,
    Training,
    ModelInfo,
    Prediction,
    Insights,
    Benchmark,
}

impl WorkflowTask {
    pub fn label(self) -> &'static str {
        match self {
            Self::Upload => "Upload",
            Self::DatasetStats => "Dataset statistics",
            Self::Visualizations => "Visualizations",
            Self::Algorithms => "Algorithm list",
            Self::Training => "Training",
            Self::ModelInfo => "Model info",
            Self::Prediction => "Prediction",
            Self::Insights => "Insights",
            Self::Benchmark => "Benchmark",
        }
    }
}

/// A completed job as seen by the UI: a short summary or the failure text.
#[derive(Clone, Debug, PartialEq)]
pub struct JobOutcome {
    pub task: WorkflowTask,
    pub result: Result<String, String>,
}

/// Owns the pipeline state and routes user actions to the stages.
///
/// All mutation happens on the thread that owns the controller; gateway
/// calls run on worker threads and are applied by [`Self::poll_jobs`].
pub struct WorkflowController {
    current_stage: PipelineStage,
    gates: GateFlags,
    dataset: Option<DatasetSummary>,
    /// Bumped on every committed upload; jobs carry the value they started with.
    epoch: u64,
    max_upload_bytes: u64,
    upload: UploadStage,
    visualization: VisualizationStage,
    training: TrainingStage,
    prediction: PredictionStage,
    insights: InsightsStage,
    jobs: WorkflowJobs,
    in_flight: usize,
}

impl WorkflowController {
    pub fn new(gateway: Arc<dyn SalaryGateway>, max_upload_bytes: u64) -> Self {
        Self {
            current_stage: PipelineStage::Upload,
            gates: GateFlags::default(),
            dataset: None,
            epoch: 0,
            max_upload_bytes,
            upload: UploadStage::default(),
            visualization: VisualizationStage::default(),
            training: TrainingStage::default(),
            prediction: PredictionStage::default(),
            insights: InsightsStage::default(),
            jobs: WorkflowJobs::new(gateway),
            in_flight: 0,
        }
    }

    pub fn current_stage(&self) -> PipelineStage {
        self.current_stage
    }

    pub fn gate_flags(&self) -> GateFlags {
        self.gates
    }

    /// The dataset committed by the last successful upload.
    pub fn dataset(&self) -> Option<&DatasetSummary> {
        self.dataset.as_ref()
    }

    pub fn upload_stage(&self) -> &UploadStage {
        &self.upload
    }

    pub fn visualization_stage(&self) -> &VisualizationStage {
        &self.visualization
    }

    pub fn training_stage(&self) -> &TrainingStage {
        &self.training
    }

    pub fn prediction_stage(&self) -> &PredictionStage {
        &self.prediction
    }

    pub fn insights_stage(&self) -> &InsightsStage {
        &self.insights
    }

    /// True while any gateway call has not been applied yet.
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    /// Move to `target` unless it is gated. Returns whether the move happened.
    pub fn request_stage_change(&mut self, target: PipelineStage) -> bool {
        if !self.gates.allows(target) {
            tracing::debug!("{} is locked ({:?})", target.label(), self.gates);
            return false;
        }
        self.navigate_to(target);
        true
    }

    /// Commit a freshly uploaded dataset and move to Visualize.
    pub fn on_upload_complete(&mut self, summary: DatasetSummary) {
        self.commit_dataset(summary);
        self.navigate_to(PipelineStage::Visualize);
    }

    /// Record a trained model and move to Predict.
    pub fn on_train_complete(&mut self, result: TrainingResult) {
        if self.record_training(result) {
            self.navigate_to(PipelineStage::Predict);
        }
    }

    /// Validate `path` and submit it. `Ok(false)` means an upload is already
    /// in flight.
    pub fn trigger_upload(&mut self, path: &Path) -> Result<bool, ClientValidationError> {
        if self.upload.upload.is_loading() {
            tracing::debug!("Upload already in progress; ignoring {}", path.display());
            return Ok(false);
        }
        let upload = validation::csv_upload(path, self.max_upload_bytes)?;
        self.upload.upload.begin();
        tracing::info!(
            "Uploading {} ({} bytes)",
            upload.file_name,
            upload.bytes.len()
        );
        self.dispatch(|jobs, epoch| jobs.begin_upload(epoch, upload));
        Ok(true)
    }

    pub fn refresh_dataset_stats(&mut self) -> bool {
        if !self.require_dataset("dataset statistics") {
            return false;
        }
        if !self.upload.stats.begin() {
            tracing::debug!("Dataset statistics already loading");
            return false;
        }
        self.dispatch(|jobs, epoch| jobs.begin_dataset_stats(epoch));
        true
    }

    pub fn refresh_visualizations(&mut self) -> bool {
        if !self.require_dataset("visualizations") {
            return false;
        }
        if !self.visualization.charts.begin() {
            tracing::debug!("Visualizations already loading");
            return false;
        }
        self.dispatch(|jobs, epoch| jobs.begin_visualizations(epoch));
        true
    }

    pub fn refresh_algorithms(&mut self) -> bool {
        if !self.training.algorithms.begin() {
            tracing::debug!("Algorithm list already loading");
            return false;
        }
        self.dispatch(|jobs, epoch| jobs.begin_algorithms(epoch));
        true
    }

    /// Validate and submit a training run. `Ok(false)` means training is
    /// locked or already in flight.
    pub fn trigger_training(
        &mut self,
        algorithm_id: &str,
        test_fraction: f64,
    ) -> Result<bool, ClientValidationError> {
        if !self.require_dataset("training") {
            return Ok(false);
        }
        if self.training.result.is_loading() {
            tracing::debug!("Training already in progress; ignoring trigger");
            return Ok(false);
        }
        let config = validation::training_config(
            algorithm_id,
            test_fraction,
            self.training.advertised_algorithms(),
        )?;
        self.training.result.begin();
        tracing::info!(
            "Training {} with test fraction {}",
            config.algorithm_id(),
            config.test_fraction()
        );
        self.dispatch(|jobs, epoch| jobs.begin_training(epoch, config));
        Ok(true)
    }

    pub fn refresh_model_info(&mut self) -> bool {
        if !self.training.model_info.begin() {
            tracing::debug!("Model info already loading");
            return false;
        }
        self.dispatch(|jobs, epoch| jobs.begin_model_info(epoch));
        true
    }

    pub fn predict_single(&mut self, input: &str) -> Result<bool, ClientValidationError> {
        if !self.prediction_ready() {
            return Ok(false);
        }
        let experience = Experience::parse(input)?;
        self.start_prediction(PredictionQuery::Single(experience));
        Ok(true)
    }

    /// Predict for comma-separated experiences; blank entries are dropped.
    pub fn predict_batch(&mut self, input: &str) -> Result<bool, ClientValidationError> {
        if !self.prediction_ready() {
            return Ok(false);
        }
        let batch = ExperienceBatch::parse(input)?;
        self.start_prediction(PredictionQuery::Batch(batch));
        Ok(true)
    }

    pub fn refresh_insights(&mut self) -> bool {
        if !self.require_dataset("insights") {
            return false;
        }
        if !self.insights.summary.begin() {
            tracing::debug!("Insights already loading");
            return false;
        }
        self.dispatch(|jobs, epoch| jobs.begin_insights(epoch));
        true
    }

    pub fn request_benchmark(&mut self, input: &str) -> Result<bool, ClientValidationError> {
        if !self.require_dataset("benchmark") {
            return Ok(false);
        }
        if self.insights.benchmark.is_loading() {
            tracing::debug!("Benchmark already loading");
            return Ok(false);
        }
        let experience = Experience::parse(input)?;
        self.insights.benchmark.begin();
        self.dispatch(|jobs, epoch| jobs.begin_benchmark(epoch, experience));
        Ok(true)
    }

    /// Hand the report export to the OS. Returns false when no dataset is
    /// loaded; the outcome is kept in [`InsightsStage::last_transfer`].
    pub fn export_report(&mut self, format: ExportFormat) -> bool {
        if !self.require_dataset("export") {
            return false;
        }
        let result = self.jobs.gateway().trigger_export(format);
        self.record_transfer(Transfer::Export(format), result);
        true
    }

    pub fn download_model(&mut self) -> Result<bool, ClientValidationError> {
        if !self.gates.has_trained_model {
            return Err(ClientValidationError::NoTrainedModel);
        }
        let result = self.jobs.gateway().trigger_model_download();
        self.record_transfer(Transfer::ModelDownload, result);
        Ok(true)
    }

    /// Apply every finished job. Call once per frame.
    pub fn poll_jobs(&mut self) -> Vec<JobOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(message) = self.jobs.try_recv_message() {
            self.in_flight = self.in_flight.saturating_sub(1);
            if let Some(outcome) = self.apply(message) {
                outcomes.push(outcome);
            }
        }
        outcomes
    }

    fn apply(&mut self, message: JobMessage) -> Option<JobOutcome> {
        let stale = message.epoch != self.epoch;
        match message.payload {
            JobPayload::Upload(result) => Some(self.finish_upload(result)),
            JobPayload::DatasetStats(result) => {
                if stale {
                    return self.discard(WorkflowTask::DatasetStats, message.epoch);
                }
                let outcome = report(WorkflowTask::DatasetStats, &result, |stats| {
                    format!(
                        "{} rows, {} numeric and {} categorical columns",
                        stats.total_rows,
                        stats.numeric_columns.len(),
                        stats.categorical_columns.len()
                    )
                });
                self.upload.stats.settle(result);
                Some(outcome)
            }
            JobPayload::Visualizations(result) => {
                if stale {
                    return self.discard(WorkflowTask::Visualizations, message.epoch);
                }
                let outcome = report(WorkflowTask::Visualizations, &result, |charts| {
                    format!("Loaded {} charts", charts.len())
                });
                self.visualization.charts.settle(result);
                Some(outcome)
            }
            JobPayload::Algorithms(result) => {
                let outcome = report(WorkflowTask::Algorithms, &result, |algorithms| {
                    format!("{} algorithms available", algorithms.len())
                });
                self.training.algorithms.settle(result);
                Some(outcome)
            }
            JobPayload::Training(result) => {
                if stale {
                    return self.discard(WorkflowTask::Training, message.epoch);
                }
                Some(self.finish_training(result))
            }
            JobPayload::ModelInfo(result) => {
                let outcome = report(WorkflowTask::ModelInfo, &result, |info| match info {
                    ModelInfo::Untrained => "No model trained on the service".to_string(),
                    ModelInfo::Trained { model_type, .. } => format!("Service model: {model_type}"),
                });
                self.training.model_info.settle(result);
                Some(outcome)
            }
            JobPayload::Prediction(result) => {
                let outcome = report(WorkflowTask::Prediction, &result, |outcome| match outcome {
                    PredictionOutcome::Single(prediction) => format!(
                        "{} years: {:.2}",
                        prediction.experience, prediction.predicted_salary
                    ),
                    PredictionOutcome::Batch(predictions) => {
                        format!("{} predictions", predictions.len())
                    }
                });
                self.prediction.outcome.settle(result);
                Some(outcome)
            }
            JobPayload::Insights(result) => {
                if stale {
                    return self.discard(WorkflowTask::Insights, message.epoch);
                }
                let outcome = report(WorkflowTask::Insights, &result, |summary| {
                    format!("{} employees summarised", summary.total_employees)
                });
                self.insights.summary.settle(result);
                Some(outcome)
            }
            JobPayload::Benchmark(result) => {
                if stale {
                    return self.discard(WorkflowTask::Benchmark, message.epoch);
                }
                let outcome = report(WorkflowTask::Benchmark, &result, |benchmark| {
                    format!(
                        "{} similar employees around {} years",
                        benchmark.sample_size, benchmark.experience
                    )
                });
                self.insights.benchmark.settle(result);
                Some(outcome)
            }
        }
    }

    fn finish_upload(&mut self, result: Result<DatasetSummary, GatewayError>) -> JobOutcome {
        let outcome = report(WorkflowTask::Upload, &result, |summary| {
            format!(
                "Uploaded {} ({} rows, {} columns)",
                summary.file_name, summary.row_count, summary.column_count
            )
        });
        match result {
            Ok(summary) if self.current_stage == PipelineStage::Upload => {
                self.on_upload_complete(summary)
            }
            Ok(summary) => {
                self.commit_dataset(summary);
                // The commit reset the stage on screen; refill it.
                self.run_entry_action(self.current_stage);
            }
            Err(err) => self.upload.upload.settle(Err(err)),
        }
        outcome
    }

    fn finish_training(&mut self, result: Result<TrainingResult, GatewayError>) -> JobOutcome {
        let outcome = report(WorkflowTask::Training, &result, |training| {
            format!(
                "Trained {} (R² {:.3}) in {:.2}s",
                training.algorithm, training.metrics.r2_score, training.training_time_seconds
            )
        });
        match result {
            Ok(training) if self.current_stage == PipelineStage::Train => {
                self.on_train_complete(training)
            }
            Ok(training) => {
                self.record_training(training);
            }
            Err(err) => self.training.result.settle(Err(err)),
        }
        outcome
    }

    fn commit_dataset(&mut self, summary: DatasetSummary) {
        self.epoch += 1;
        self.gates = GateFlags {
            has_dataset: true,
            has_trained_model: false,
        };
        self.upload.upload = StagePhase::Ready(summary.clone());
        self.upload.stats.reset();
        self.visualization.reset();
        self.insights.reset();
        if self.training.result.is_loading() {
            self.training.result.reset();
        }
        tracing::info!(
            "Dataset {} committed (epoch {})",
            summary.file_name,
            self.epoch
        );
        self.dataset = Some(summary);
    }

    fn record_training(&mut self, result: TrainingResult) -> bool {
        if !self.gates.has_dataset {
            tracing::warn!("Ignoring training result: no dataset loaded");
            return false;
        }
        self.gates.has_trained_model = true;
        self.training.result = StagePhase::Ready(result);
        self.training.model_info.reset();
        true
    }

    fn navigate_to(&mut self, target: PipelineStage) {
        if self.current_stage != target {
            tracing::info!(
                "Stage {} -> {}",
                self.current_stage.label(),
                target.label()
            );
            self.current_stage = target;
        }
        self.run_entry_action(target);
    }

    fn run_entry_action(&mut self, stage: PipelineStage) {
        match stage {
            PipelineStage::Visualize if self.visualization.charts.is_idle() => {
                self.refresh_visualizations();
            }
            PipelineStage::Train if self.training.algorithms.is_idle() => {
                self.refresh_algorithms();
            }
            PipelineStage::Insights if self.insights.summary.is_idle() => {
                self.refresh_insights();
            }
            _ => {}
        }
    }

    fn prediction_ready(&self) -> bool {
        if !self.gates.has_trained_model {
            tracing::debug!("Prediction requested without a trained model");
            return false;
        }
        if self.prediction.outcome.is_loading() {
            tracing::debug!("Prediction already in progress");
            return false;
        }
        true
    }

    fn start_prediction(&mut self, query: PredictionQuery) {
        self.prediction.outcome.begin();
        self.dispatch(|jobs, epoch| jobs.begin_prediction(epoch, query));
    }

    fn require_dataset(&self, what: &str) -> bool {
        if !self.gates.has_dataset {
            tracing::debug!("Ignoring {what} request: no dataset loaded");
        }
        self.gates.has_dataset
    }

    fn record_transfer(&mut self, transfer: Transfer, result: Result<(), GatewayError>) {
        let error = match result {
            Ok(()) => {
                tracing::info!("Dispatched {transfer:?}");
                None
            }
            Err(err) => {
                tracing::warn!("Failed to dispatch {transfer:?}: {err}");
                Some(err.message)
            }
        };
        self.insights.last_transfer = Some(TransferRecord { transfer, error });
    }

    fn discard(&self, task: WorkflowTask, epoch: u64) -> Option<JobOutcome> {
        tracing::warn!(
            "Discarding {} result from superseded dataset (epoch {epoch}, now {})",
            task.label(),
            self.epoch
        );
        None
    }

    fn dispatch(&mut self, start: impl FnOnce(&WorkflowJobs, u64)) {
        self.in_flight += 1;
        start(&self.jobs, self.epoch);
    }
}

fn report<T>(
    task: WorkflowTask,
    result: &Result<T, GatewayError>,
    describe: impl FnOnce(&T) -> String,
) -> JobOutcome {
    let result = match result {
        Ok(value) => {
            let summary = describe(value);
            tracing::info!("{} finished: {summary}", task.label());
            Ok(summary)
        }
        Err(err) => {
            tracing::warn!(
                "{} failed ({:?}, status {:?}): {}",
                task.label(),
                err.kind,
                err.status_code,
                err.message
            );
            Err(err.message.clone())
        }
    };
    JobOutcome { task, result }
}
