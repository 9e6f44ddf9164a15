//! Typed client for the salary-prediction REST service.
//!
//! [`SalaryGateway`] is the single seam between the workflow and the network.
//! Inputs are pre-validated types, so every precondition the service would
//! reject for shape reasons is already enforced before a call is made.

mod error;
mod http;
mod multipart;
pub(crate) mod wire;

pub use error::{GatewayError, GatewayErrorKind};
pub use http::{DEFAULT_BASE_URL, HttpGateway, UrlOpener};

use crate::types::{
    AlgorithmInfo, BenchmarkResult, ChartSet, CsvUpload, DatasetStats, DatasetSummary,
    ExportFormat, InsightsSummary, ModelInfo, Prediction, TrainingConfig, TrainingResult,
};
use crate::validation::{Experience, ExperienceBatch};

/// One method per remote operation. Implementations must be shareable across
/// worker threads.
pub trait SalaryGateway: Send + Sync {
    /// `POST /upload/csv`.
    fn upload_dataset(&self, upload: &CsvUpload) -> Result<DatasetSummary, GatewayError>;
    /// `GET /upload/stats`.
    fn fetch_dataset_stats(&self) -> Result<DatasetStats, GatewayError>;
    /// `GET /visualization/all`. Missing charts are simply absent.
    fn fetch_visualizations(&self) -> Result<ChartSet, GatewayError>;
    /// `GET /model/algorithms`. An empty list is a valid answer.
    fn list_algorithms(&self) -> Result<Vec<AlgorithmInfo>, GatewayError>;
    /// `POST /model/train`.
    fn train_model(&self, config: &TrainingConfig) -> Result<TrainingResult, GatewayError>;
    /// `GET /model/info`.
    fn fetch_model_info(&self) -> Result<ModelInfo, GatewayError>;
    /// `POST /prediction/single`.
    fn predict_single(&self, experience: Experience) -> Result<Prediction, GatewayError>;
    /// `POST /prediction/batch`. Results come back in query order.
    fn predict_batch(&self, batch: &ExperienceBatch) -> Result<Vec<Prediction>, GatewayError>;
    /// `GET /insights/summary`.
    fn fetch_insights_summary(&self) -> Result<InsightsSummary, GatewayError>;
    /// `GET /insights/benchmark?experience=`.
    fn fetch_benchmark(&self, experience: Experience) -> Result<BenchmarkResult, GatewayError>;
    /// Open `GET /insights/export/{format}` as an external transfer.
    ///
    /// Success means the transfer was dispatched, not that a file arrived.
    fn trigger_export(&self, format: ExportFormat) -> Result<(), GatewayError>;
    /// Open `GET /model/download` as an external transfer.
    fn trigger_model_download(&self) -> Result<(), GatewayError>;
}
