use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use crate::gateway::{GatewayError, SalaryGateway};
use crate::types::{
    AlgorithmInfo, BenchmarkResult, ChartSet, CsvUpload, DatasetStats, DatasetSummary,
    InsightsSummary, ModelInfo, PredictionOutcome, PredictionQuery, TrainingConfig,
    TrainingResult,
};
use crate::validation::Experience;

/// Completion of one background gateway call.
#[derive(Debug)]
pub(crate) struct JobMessage {
    /// Dataset epoch current when the job started.
    pub(crate) epoch: u64,
    pub(crate) payload: JobPayload,
}

#[derive(Debug)]
pub(crate) enum JobPayload {
    Upload(Result<DatasetSummary, GatewayError>),
    DatasetStats(Result<DatasetStats, GatewayError>),
    Visualizations(Result<ChartSet, GatewayError>),
    Algorithms(Result<Vec<AlgorithmInfo>, GatewayError>),
    Training(Result<TrainingResult, GatewayError>),
    ModelInfo(Result<ModelInfo, GatewayError>),
    Prediction(Result<PredictionOutcome, GatewayError>),
    Insights(Result<InsightsSummary, GatewayError>),
    Benchmark(Result<BenchmarkResult, GatewayError>),
}

/// Runs gateway calls on worker threads and funnels results back to the UI
/// thread.
pub(crate) struct WorkflowJobs {
    gateway: Arc<dyn SalaryGateway>,
    message_tx: Sender<JobMessage>,
    message_rx: Receiver<JobMessage>,
}

impl WorkflowJobs {
    pub(crate) fn new(gateway: Arc<dyn SalaryGateway>) -> Self {
        let (message_tx, message_rx) = mpsc::channel();
        Self {
            gateway,
            message_tx,
            message_rx,
        }
    }

    pub(crate) fn gateway(&self) -> &dyn SalaryGateway {
        self.gateway.as_ref()
    }

    pub(crate) fn try_recv_message(&self) -> Result<JobMessage, TryRecvError> {
        self.message_rx.try_recv()
    }

    pub(crate) fn begin_upload(&self, epoch: u64, upload: CsvUpload) {
        self.spawn(epoch, move |gateway| {
            JobPayload::Upload(gateway.upload_dataset(&upload))
        });
    }

    pub(crate) fn begin_dataset_stats(&self, epoch: u64) {
        self.spawn(epoch, |gateway| {
            JobPayload::DatasetStats(gateway.fetch_dataset_stats())
        });
    }

    pub(crate) fn begin_visualizations(&self, epoch: u64) {
        self.spawn(epoch, |gateway| {
            JobPayload::Visualizations(gateway.fetch_visualizations())
        });
    }

    pub(crate) fn begin_algorithms(&self, epoch: u64) {
        self.spawn(epoch, |gateway| JobPayload::Algorithms(gateway.list_algorithms()));
    }

    pub(crate) fn begin_training(&self, epoch: u64, config: TrainingConfig) {
        self.spawn(epoch, move |gateway| {
            JobPayload::Training(gateway.train_model(&config))
        });
    }

    pub(crate) fn begin_model_info(&self, epoch: u64) {
        self.spawn(epoch, |gateway| JobPayload::ModelInfo(gateway.fetch_model_info()));
    }

    pub(crate) fn begin_prediction(&self, epoch: u64, query: PredictionQuery) {
        self.spawn(epoch, move |gateway| {
            let outcome = match query {
                PredictionQuery::Single(experience) => gateway
                    .predict_single(experience)
                    .map(PredictionOutcome::Single),
                PredictionQuery::Batch(batch) => {
                    gateway.predict_batch(&batch).map(PredictionOutcome::Batch)
                }
            };
            JobPayload::Prediction(outcome)
        });
    }

    pub(crate) fn begin_insights(&self, epoch: u64) {
        self.spawn(epoch, |gateway| {
            JobPayload::Insights(gateway.fetch_insights_summary())
        });
    }

    pub(crate) fn begin_benchmark(&self, epoch: u64, experience: Experience) {
        self.spawn(epoch, move |gateway| {
            JobPayload::Benchmark(gateway.fetch_benchmark(experience))
        });
    }

    fn spawn<F>(&self, epoch: u64, work: F)
    where
        F: FnOnce(&dyn SalaryGateway) -> JobPayload + Send + 'static,
    {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.message_tx.clone();
        thread::spawn(move || {
            let payload = work(gateway.as_ref());
            let _ = tx.send(JobMessage { epoch, payload });
        });
    }
}
