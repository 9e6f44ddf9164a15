use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use super::*;
use crate::gateway::{GatewayError, SalaryGateway};
use crate::types::{
    AlgorithmInfo, BenchmarkResult, ChartImage, ChartKind, ChartSet, CsvUpload, DatasetStats,
    DatasetSummary, ExportFormat, InsightsSummary, ModelInfo, ModelMetrics, Prediction, Transfer,
    TrainingConfig, TrainingResult,
};
use crate::validation::{Experience, ExperienceBatch};

/// In-memory gateway that counts calls and can hold or fail them on demand.
#[derive(Default)]
pub(super) struct FakeGateway {
    calls: Mutex<BTreeMap<&'static str, usize>>,
    failures: Mutex<BTreeMap<&'static str, GatewayError>>,
    blocked: Mutex<BTreeSet<&'static str>>,
    unblocked: Condvar,
    batch_queries: Mutex<Vec<Vec<f64>>>,
    transfers: Mutex<Vec<Transfer>>,
    algorithms: Mutex<Option<Vec<AlgorithmInfo>>>,
}

impl FakeGateway {
    pub(super) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(super) fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    /// Make the next call to `method` fail with `error`.
    pub(super) fn fail_next(&self, method: &'static str, error: GatewayError) {
        self.failures.lock().unwrap().insert(method, error);
    }

    /// Hold calls to `method` until [`Self::release`].
    pub(super) fn block(&self, method: &'static str) {
        self.blocked.lock().unwrap().insert(method);
    }

    pub(super) fn release(&self, method: &'static str) {
        self.blocked.lock().unwrap().remove(method);
        self.unblocked.notify_all();
    }

    pub(super) fn set_algorithms(&self, ids: &[&str]) {
        *self.algorithms.lock().unwrap() = Some(
            ids.iter()
                .map(|id| AlgorithmInfo {
                    id: id.to_string(),
                    name: id.to_string(),
                    description: String::new(),
                })
                .collect(),
        );
    }

    pub(super) fn batch_queries(&self) -> Vec<Vec<f64>> {
        self.batch_queries.lock().unwrap().clone()
    }

    pub(super) fn transfers(&self) -> Vec<Transfer> {
        self.transfers.lock().unwrap().clone()
    }

    fn enter(&self, method: &'static str) -> Result<(), GatewayError> {
        *self.calls.lock().unwrap().entry(method).or_default() += 1;
        let mut blocked = self.blocked.lock().unwrap();
        while blocked.contains(method) {
            blocked = self.unblocked.wait(blocked).unwrap();
        }
        drop(blocked);
        match self.failures.lock().unwrap().remove(method) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

pub(super) fn salary_for(years: f64) -> f64 {
    30_000.0 + 5_000.0 * years
}

impl SalaryGateway for FakeGateway {
    fn upload_dataset(&self, upload: &CsvUpload) -> Result<DatasetSummary, GatewayError> {
        self.enter("upload_dataset")?;
        Ok(DatasetSummary {
            message: "File uploaded and processed successfully".into(),
            file_name: upload.file_name.clone(),
            row_count: 3,
            column_count: 2,
            column_names: vec!["YearsExperience".into(), "Salary".into()],
            preview: Vec::new(),
        })
    }

    fn fetch_dataset_stats(&self) -> Result<DatasetStats, GatewayError> {
        self.enter("fetch_dataset_stats")?;
        Ok(DatasetStats {
            total_rows: 3,
            total_columns: 2,
            missing_values: BTreeMap::new(),
            numeric_columns: vec!["YearsExperience".into(), "Salary".into()],
            categorical_columns: Vec::new(),
        })
    }

    fn fetch_visualizations(&self) -> Result<ChartSet, GatewayError> {
        self.enter("fetch_visualizations")?;
        Ok([ChartKind::Scatter, ChartKind::Heatmap]
            .into_iter()
            .map(|kind| {
                (
                    kind,
                    ChartImage {
                        reference: format!("data:image/png;base64,{}", kind.wire_key()),
                    },
                )
            })
            .collect())
    }

    fn list_algorithms(&self) -> Result<Vec<AlgorithmInfo>, GatewayError> {
        self.enter("list_algorithms")?;
        let configured = self.algorithms.lock().unwrap().clone();
        Ok(configured.unwrap_or_else(|| {
            ["linear", "random_forest"]
                .iter()
                .map(|id| AlgorithmInfo {
                    id: id.to_string(),
                    name: id.to_string(),
                    description: String::new(),
                })
                .collect()
        }))
    }

    fn train_model(&self, config: &TrainingConfig) -> Result<TrainingResult, GatewayError> {
        self.enter("train_model")?;
        Ok(TrainingResult {
            message: "Model trained successfully".into(),
            algorithm: config.algorithm_id().to_string(),
            metrics: ModelMetrics {
                r2_score: 0.95,
                mean_absolute_error: 1_000.0,
                root_mean_squared_error: 1_200.0,
                mean_squared_error: Some(1_440_000.0),
            },
            training_time_seconds: 0.01,
            feature_importance: None,
        })
    }

    fn fetch_model_info(&self) -> Result<ModelInfo, GatewayError> {
        self.enter("fetch_model_info")?;
        if self.calls("train_model") == 0 {
            return Ok(ModelInfo::Untrained);
        }
        Ok(ModelInfo::Trained {
            model_type: "linear".into(),
            feature_names: vec!["YearsExperience".into()],
            metrics: None,
        })
    }

    fn predict_single(&self, experience: Experience) -> Result<Prediction, GatewayError> {
        self.enter("predict_single")?;
        Ok(Prediction {
            experience: experience.years(),
            predicted_salary: salary_for(experience.years()),
        })
    }

    fn predict_batch(&self, batch: &ExperienceBatch) -> Result<Vec<Prediction>, GatewayError> {
        self.enter("predict_batch")?;
        self.batch_queries.lock().unwrap().push(batch.years());
        Ok(batch
            .years()
            .into_iter()
            .map(|years| Prediction {
                experience: years,
                predicted_salary: salary_for(years),
            })
            .collect())
    }

    fn fetch_insights_summary(&self) -> Result<InsightsSummary, GatewayError> {
        self.enter("fetch_insights_summary")?;
        Ok(InsightsSummary {
            average_salary: 55_000.0,
            median_salary: 52_000.0,
            total_employees: 3,
            percentiles: BTreeMap::from([("50th".to_string(), 52_000.0)]),
            salary_by_experience_bucket: None,
        })
    }

    fn fetch_benchmark(&self, experience: Experience) -> Result<BenchmarkResult, GatewayError> {
        self.enter("fetch_benchmark")?;
        let salary = salary_for(experience.years());
        Ok(BenchmarkResult {
            experience: experience.years(),
            average_salary: salary,
            median_salary: salary,
            min_salary: salary - 1_000.0,
            max_salary: salary + 1_000.0,
            sample_size: 2,
        })
    }

    fn trigger_export(&self, format: ExportFormat) -> Result<(), GatewayError> {
        self.enter("trigger_export")?;
        self.transfers.lock().unwrap().push(Transfer::Export(format));
        Ok(())
    }

    fn trigger_model_download(&self) -> Result<(), GatewayError> {
        self.enter("trigger_model_download")?;
        self.transfers.lock().unwrap().push(Transfer::ModelDownload);
        Ok(())
    }
}

/// A controller wired to a fresh fake, plus a directory of CSV fixtures.
pub(super) struct Harness {
    pub(super) controller: WorkflowController,
    pub(super) gateway: Arc<FakeGateway>,
    dir: tempfile::TempDir,
}

impl Harness {
    pub(super) fn new() -> Self {
        let gateway = FakeGateway::new();
        let shared: Arc<dyn SalaryGateway> = gateway.clone();
        Self {
            controller: WorkflowController::new(shared, 1024 * 1024),
            gateway,
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub(super) fn csv(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, "YearsExperience,Salary\n1,35000\n3,45000\n5,55000\n").unwrap();
        path
    }

    pub(super) fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Upload `name` and apply every resulting job.
    pub(super) fn upload(&mut self, name: &str) -> Vec<JobOutcome> {
        let path = self.csv(name);
        assert!(self.controller.trigger_upload(&path).unwrap());
        self.settle()
    }

    /// Upload and train with defaults, leaving the controller on Predict.
    pub(super) fn upload_and_train(&mut self) {
        self.upload("salaries.csv");
        assert!(self.controller.request_stage_change(PipelineStage::Train));
        self.settle();
        assert!(self.controller.trigger_training("linear", 0.2).unwrap());
        self.settle();
        assert_eq!(self.controller.current_stage(), PipelineStage::Predict);
    }

    pub(super) fn settle(&mut self) -> Vec<JobOutcome> {
        wait_for_idle(&mut self.controller)
    }
}

/// Poll until no job is in flight, collecting outcomes.
pub(super) fn wait_for_idle(controller: &mut WorkflowController) -> Vec<JobOutcome> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut outcomes = controller.poll_jobs();
    while controller.is_busy() {
        assert!(Instant::now() < deadline, "jobs did not finish in time");
        std::thread::sleep(Duration::from_millis(2));
        outcomes.extend(controller.poll_jobs());
    }
    outcomes
}

/// Poll until `done` holds for the controller.
pub(super) fn poll_until(
    controller: &mut WorkflowController,
    done: impl Fn(&WorkflowController) -> bool,
) -> Vec<JobOutcome> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut outcomes = controller.poll_jobs();
    while !done(controller) {
        assert!(Instant::now() < deadline, "condition not reached in time");
        std::thread::sleep(Duration::from_millis(2));
        outcomes.extend(controller.poll_jobs());
    }
    outcomes
}
