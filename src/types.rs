//! Client-side data model shared by the gateway and the workflow.
//!
//! Field names here are semantic; the snake_case wire shapes live in
//! `gateway::wire` and are converted at the gateway boundary only.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::validation::Experience;

/// A single preview cell as returned by the service.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// One preview row keyed by column name.
pub type PreviewRow = BTreeMap<String, CellValue>;

/// Shape and preview of the dataset committed by the last successful upload.
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetSummary {
    pub message: String,
    pub file_name: String,
    pub row_count: u64,
    pub column_count: u64,
    pub column_names: Vec<String>,
    pub preview: Vec<PreviewRow>,
}

impl DatasetSummary {
    /// Cell for `column` in preview row `row`, `Null` when absent.
    pub fn preview_cell(&self, row: usize, column: &str) -> &CellValue {
        const MISSING: &CellValue = &CellValue::Null;
        self.preview
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(MISSING)
    }
}

/// Column-level statistics of the committed dataset.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct DatasetStats {
    pub total_rows: u64,
    pub total_columns: u64,
    pub missing_values: BTreeMap<String, u64>,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
}

/// Charts the service can render for a dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChartKind {
    Scatter,
    Boxplot,
    Histogram,
    Heatmap,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Scatter,
        ChartKind::Boxplot,
        ChartKind::Histogram,
        ChartKind::Heatmap,
    ];

    /// Key used for this chart in the service payload.
    pub fn wire_key(self) -> &'static str {
        match self {
            Self::Scatter => "scatter",
            Self::Boxplot => "boxplot",
            Self::Histogram => "histogram",
            Self::Heatmap => "heatmap",
        }
    }

    pub fn from_wire_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.wire_key() == key)
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Scatter => "Experience vs. salary",
            Self::Boxplot => "Salary distribution (box plot)",
            Self::Histogram => "Salary histogram",
            Self::Heatmap => "Correlation heatmap",
        }
    }
}

/// Reference to a rendered chart: an inline data URI or a plain URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartImage {
    pub reference: String,
}

/// Rendered charts keyed by kind. Any subset may be absent.
pub type ChartSet = BTreeMap<ChartKind, ChartImage>;

/// A training algorithm advertised by the service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlgorithmInfo {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Hold-out metrics reported for a trained model.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelMetrics {
    pub r2_score: f64,
    pub mean_absolute_error: f64,
    pub root_mean_squared_error: f64,
    pub mean_squared_error: Option<f64>,
}

/// Outcome of one training run.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingResult {
    pub message: String,
    pub algorithm: String,
    pub metrics: ModelMetrics,
    pub training_time_seconds: f64,
    pub feature_importance: Option<BTreeMap<String, f64>>,
}

/// What the service reports about its current model.
#[derive(Clone, Debug, PartialEq)]
pub enum ModelInfo {
    Untrained,
    Trained {
        model_type: String,
        feature_names: Vec<String>,
        metrics: Option<ModelMetrics>,
    },
}

/// A predicted salary paired with the experience it was asked for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prediction {
    pub experience: f64,
    pub predicted_salary: f64,
}

/// Result of a single or batch prediction request.
#[derive(Clone, Debug, PartialEq)]
pub enum PredictionOutcome {
    Single(Prediction),
    /// Same order as the submitted experiences.
    Batch(Vec<Prediction>),
}

impl PredictionOutcome {
    pub fn predictions(&self) -> &[Prediction] {
        match self {
            Self::Single(prediction) => std::slice::from_ref(prediction),
            Self::Batch(predictions) => predictions,
        }
    }
}

/// Aggregate salary statistics over the committed dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct InsightsSummary {
    pub average_salary: f64,
    pub median_salary: f64,
    pub total_employees: u64,
    pub percentiles: BTreeMap<String, f64>,
    pub salary_by_experience_bucket: Option<BTreeMap<String, f64>>,
}

/// Salary benchmark for employees with similar experience.
#[derive(Clone, Debug, PartialEq)]
pub struct BenchmarkResult {
    pub experience: f64,
    pub average_salary: f64,
    pub median_salary: f64,
    pub min_salary: f64,
    pub max_salary: f64,
    pub sample_size: u64,
}

/// Report formats offered by the export endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Excel,
}

impl ExportFormat {
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "excel",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Excel => "Excel",
        }
    }
}

/// An out-of-band transfer that was handed to the OS.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transfer {
    Export(ExportFormat),
    ModelDownload,
}

/// A CSV file that passed client-side checks and is ready to submit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvUpload {
    pub path: PathBuf,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A validated training request.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingConfig {
    pub(crate) algorithm_id: String,
    pub(crate) test_fraction: f64,
}

impl TrainingConfig {
    pub fn algorithm_id(&self) -> &str {
        &self.algorithm_id
    }

    pub fn test_fraction(&self) -> f64 {
        self.test_fraction
    }
}

/// A validated prediction request.
#[derive(Clone, Debug, PartialEq)]
pub enum PredictionQuery {
    Single(Experience),
    Batch(crate::validation::ExperienceBatch),
}
