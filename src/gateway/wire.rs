//! snake_case wire shapes of the service and their conversion into the
//! client data model. Nothing outside the gateway sees these types.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::{
    AlgorithmInfo, BenchmarkResult, ChartImage, ChartKind, ChartSet, DatasetStats,
    DatasetSummary, InsightsSummary, ModelInfo, ModelMetrics, Prediction, PreviewRow,
    TrainingResult,
};

#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponseWire {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub filename: String,
    pub rows: u64,
    pub columns: u64,
    pub column_names: Vec<String>,
    #[serde(default)]
    pub preview: Vec<PreviewRow>,
}

impl UploadResponseWire {
    pub(crate) fn into_summary(self, uploaded_name: &str) -> Result<DatasetSummary, String> {
        let mut seen = BTreeSet::new();
        if let Some(duplicate) = self
            .column_names
            .iter()
            .find(|name| !seen.insert(name.as_str()))
        {
            return Err(format!("Duplicate column name '{duplicate}' in upload summary"));
        }
        let file_name = if self.filename.is_empty() {
            uploaded_name.to_string()
        } else {
            self.filename
        };
        Ok(DatasetSummary {
            message: self.message,
            file_name,
            row_count: self.rows,
            column_count: self.columns,
            column_names: self.column_names,
            preview: self.preview,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DatasetStatsWire {
    pub total_rows: u64,
    pub total_columns: u64,
    #[serde(default)]
    pub missing_values: BTreeMap<String, u64>,
    #[serde(default)]
    pub numeric_columns: Vec<String>,
    #[serde(default)]
    pub categorical_columns: Vec<String>,
}

impl From<DatasetStatsWire> for DatasetStats {
    fn from(wire: DatasetStatsWire) -> Self {
        Self {
            total_rows: wire.total_rows,
            total_columns: wire.total_columns,
            missing_values: wire.missing_values,
            numeric_columns: wire.numeric_columns,
            categorical_columns: wire.categorical_columns,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct VisualizationsWire {
    #[serde(default)]
    pub visualizations: BTreeMap<String, Option<String>>,
}

impl From<VisualizationsWire> for ChartSet {
    fn from(wire: VisualizationsWire) -> Self {
        wire.visualizations
            .into_iter()
            .filter_map(|(key, reference)| {
                let Some(kind) = ChartKind::from_wire_key(&key) else {
                    tracing::debug!("Ignoring unknown chart '{key}'");
                    return None;
                };
                let reference = reference.filter(|value| !value.trim().is_empty())?;
                Some((kind, ChartImage { reference }))
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlgorithmsWire {
    #[serde(default)]
    pub algorithms: Vec<AlgorithmWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlgorithmWire {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl From<AlgorithmsWire> for Vec<AlgorithmInfo> {
    fn from(wire: AlgorithmsWire) -> Self {
        wire.algorithms
            .into_iter()
            .map(|algorithm| AlgorithmInfo {
                name: if algorithm.name.is_empty() {
                    algorithm.id.clone()
                } else {
                    algorithm.name
                },
                id: algorithm.id,
                description: algorithm.description,
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TrainRequestWire<'a> {
    pub algorithm: &'a str,
    pub test_size: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MetricsWire {
    pub r2_score: f64,
    pub mae: f64,
    pub rmse: f64,
    #[serde(default)]
    pub mse: Option<f64>,
}

impl MetricsWire {
    fn into_metrics(self) -> Result<ModelMetrics, String> {
        if !(self.mae >= 0.0 && self.rmse >= 0.0) {
            return Err(format!(
                "Error metrics must be non-negative (mae={}, rmse={})",
                self.mae, self.rmse
            ));
        }
        Ok(ModelMetrics {
            r2_score: self.r2_score,
            mean_absolute_error: self.mae,
            root_mean_squared_error: self.rmse,
            mean_squared_error: self.mse,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrainResponseWire {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub algorithm: String,
    pub metrics: MetricsWire,
    pub training_time: f64,
    #[serde(default)]
    pub feature_importance: Option<BTreeMap<String, f64>>,
}

impl TrainResponseWire {
    pub(crate) fn into_result(self, requested: &str) -> Result<TrainingResult, String> {
        if !(self.training_time >= 0.0) {
            return Err(format!("Negative training time {}", self.training_time));
        }
        if let Some((feature, weight)) = self
            .feature_importance
            .iter()
            .flatten()
            .find(|(_, weight)| !(0.0..=1.0).contains(*weight))
        {
            return Err(format!(
                "Feature importance for '{feature}' is {weight}, outside [0, 1]"
            ));
        }
        Ok(TrainingResult {
            message: self.message,
            algorithm: if self.algorithm.is_empty() {
                requested.to_string()
            } else {
                self.algorithm
            },
            metrics: self.metrics.into_metrics()?,
            training_time_seconds: self.training_time,
            feature_importance: self.feature_importance,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModelInfoWire {
    pub status: String,
    #[serde(default)]
    pub model_type: Option<String>,
    #[serde(default)]
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub metrics: Option<MetricsWire>,
}

impl ModelInfoWire {
    pub(crate) fn into_info(self) -> Result<ModelInfo, String> {
        match self.status.as_str() {
            "no_model" => Ok(ModelInfo::Untrained),
            "trained" => Ok(ModelInfo::Trained {
                model_type: self.model_type.unwrap_or_default(),
                feature_names: self.feature_names,
                metrics: self.metrics.map(MetricsWire::into_metrics).transpose()?,
            }),
            other => Err(format!("Unknown model status '{other}'")),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PredictionRequestWire {
    pub experience: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchPredictionRequestWire {
    pub predictions: Vec<PredictionRequestWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PredictionWire {
    pub experience: f64,
    pub predicted_salary: f64,
}

impl From<PredictionWire> for Prediction {
    fn from(wire: PredictionWire) -> Self {
        Self {
            experience: wire.experience,
            predicted_salary: wire.predicted_salary,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BatchPredictionWire {
    pub predictions: Vec<PredictionWire>,
}

impl BatchPredictionWire {
    /// Convert, insisting that the service answered every query in order.
    pub(crate) fn into_predictions(self, queried: &[f64]) -> Result<Vec<Prediction>, String> {
        if self.predictions.len() != queried.len() {
            return Err(format!(
                "Expected {} predictions, service returned {}",
                queried.len(),
                self.predictions.len()
            ));
        }
        self.predictions
            .into_iter()
            .zip(queried)
            .enumerate()
            .map(|(index, (wire, &asked))| {
                if (wire.experience - asked).abs() > 1e-9 {
                    return Err(format!(
                        "Prediction {index} is for experience {} but {asked} was asked",
                        wire.experience
                    ));
                }
                Ok(Prediction::from(wire))
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct InsightsWire {
    pub average_salary: f64,
    pub median_salary: f64,
    pub total_employees: u64,
    #[serde(default)]
    pub percentiles: BTreeMap<String, f64>,
    #[serde(default)]
    pub salary_by_experience: Option<BTreeMap<String, f64>>,
}

impl From<InsightsWire> for InsightsSummary {
    fn from(wire: InsightsWire) -> Self {
        Self {
            average_salary: wire.average_salary,
            median_salary: wire.median_salary,
            total_employees: wire.total_employees,
            percentiles: wire.percentiles,
            salary_by_experience_bucket: wire
                .salary_by_experience
                .filter(|buckets| !buckets.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BenchmarkWire {
    pub experience: f64,
    pub average_salary: f64,
    pub median_salary: f64,
    pub min_salary: f64,
    pub max_salary: f64,
    pub sample_size: u64,
}

impl From<BenchmarkWire> for BenchmarkResult {
    fn from(wire: BenchmarkWire) -> Self {
        Self {
            experience: wire.experience,
            average_salary: wire.average_salary,
            median_salary: wire.median_salary,
            min_salary: wire.min_salary,
            max_salary: wire.max_salary,
            sample_size: wire.sample_size,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBodyWire {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Pull the human-readable failure detail out of an error body.
///
/// Handles `{"detail": "..."}` and request-validation lists
/// `{"detail": [{"msg": "..."}]}`.
pub(crate) fn service_detail(body: &str) -> Option<String> {
    let parsed: ErrorBodyWire = serde_json::from_str(body.trim()).ok()?;
    match parsed.detail? {
        serde_json::Value::String(detail) if !detail.trim().is_empty() => Some(detail),
        serde_json::Value::Array(items) => {
            let messages = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|msg| msg.as_str()))
                .collect::<Vec<_>>();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}
