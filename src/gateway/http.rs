//! [`SalaryGateway`] over HTTP using a shared `ureq` agent.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::multipart::MultipartBody;
use super::wire::{self, BatchPredictionRequestWire, PredictionRequestWire, TrainRequestWire};
use super::{GatewayError, SalaryGateway};
use crate::http_client::{self, Timeouts};
use crate::types::{
    AlgorithmInfo, BenchmarkResult, ChartSet, CsvUpload, DatasetStats, DatasetSummary,
    ExportFormat, InsightsSummary, ModelInfo, Prediction, TrainingConfig, TrainingResult,
};
use crate::validation::{Experience, ExperienceBatch};

/// Service root used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Chart payloads are base64 PNGs and can be large.
const MAX_RESPONSE_BYTES: usize = 32 * 1024 * 1024;
const MAX_ERROR_BYTES: usize = 64 * 1024;

/// Hands a URL to something outside the process (normally the OS browser).
pub type UrlOpener = Arc<dyn Fn(&str) -> std::io::Result<()> + Send + Sync>;

/// Production gateway talking to the REST service.
#[derive(Clone)]
pub struct HttpGateway {
    agent: ureq::Agent,
    base_url: String,
    opener: UrlOpener,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpGateway {
    pub fn new(base_url: &str, timeouts: Timeouts) -> Self {
        Self {
            agent: http_client::build_agent(timeouts),
            base_url: base_url.trim_end_matches('/').to_string(),
            opener: Arc::new(|url: &str| open::that(url)),
        }
    }

    /// Replace how side-channel transfers are opened.
    pub fn with_opener(mut self, opener: UrlOpener) -> Self {
        self.opener = opener;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<(u16, T), GatewayError> {
        tracing::debug!("GET {path}");
        let mut request = self.agent.get(&self.url(path)).set("Accept", "application/json");
        for (name, value) in query {
            request = request.query(name, value);
        }
        decode(request.call())
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(u16, T), GatewayError> {
        tracing::debug!("POST {path}");
        let request = self
            .agent
            .post(&self.url(path))
            .set("Accept", "application/json");
        decode(request.send_json(body))
    }

    fn open_transfer(&self, path: &str) -> Result<(), GatewayError> {
        let url = self.url(path);
        tracing::info!("Opening transfer {url}");
        (self.opener)(&url)
            .map_err(|err| GatewayError::network(format!("Could not open {url}: {err}")))
    }
}

impl SalaryGateway for HttpGateway {
    fn upload_dataset(&self, upload: &CsvUpload) -> Result<DatasetSummary, GatewayError> {
        tracing::debug!("POST /upload/csv ({} bytes)", upload.bytes.len());
        let body = MultipartBody::single_file("file", &upload.file_name, "text/csv", &upload.bytes);
        let request = self
            .agent
            .post(&self.url("/upload/csv"))
            .set("Accept", "application/json")
            .set("Content-Type", &body.content_type());
        let (status, wire): (u16, wire::UploadResponseWire) =
            decode(request.send_bytes(body.bytes()))?;
        wire.into_summary(&upload.file_name)
            .map_err(|message| malformed(status, message))
    }

    fn fetch_dataset_stats(&self) -> Result<DatasetStats, GatewayError> {
        let (_, wire): (_, wire::DatasetStatsWire) = self.get_json("/upload/stats", &[])?;
        Ok(wire.into())
    }

    fn fetch_visualizations(&self) -> Result<ChartSet, GatewayError> {
        let (_, wire): (_, wire::VisualizationsWire) =
            self.get_json("/visualization/all", &[])?;
        Ok(wire.into())
    }

    fn list_algorithms(&self) -> Result<Vec<AlgorithmInfo>, GatewayError> {
        let (_, wire): (_, wire::AlgorithmsWire) = self.get_json("/model/algorithms", &[])?;
        Ok(wire.into())
    }

    fn train_model(&self, config: &TrainingConfig) -> Result<TrainingResult, GatewayError> {
        let request = TrainRequestWire {
            algorithm: config.algorithm_id(),
            test_size: config.test_fraction(),
        };
        let (status, wire): (_, wire::TrainResponseWire) =
            self.post_json("/model/train", &request)?;
        wire.into_result(config.algorithm_id())
            .map_err(|message| malformed(status, message))
    }

    fn fetch_model_info(&self) -> Result<ModelInfo, GatewayError> {
        let (status, wire): (_, wire::ModelInfoWire) = self.get_json("/model/info", &[])?;
        wire.into_info().map_err(|message| malformed(status, message))
    }

    fn predict_single(&self, experience: Experience) -> Result<Prediction, GatewayError> {
        let request = PredictionRequestWire {
            experience: experience.years(),
        };
        let (_, wire): (_, wire::PredictionWire) =
            self.post_json("/prediction/single", &request)?;
        Ok(wire.into())
    }

    fn predict_batch(&self, batch: &ExperienceBatch) -> Result<Vec<Prediction>, GatewayError> {
        let queried = batch.years();
        let request = BatchPredictionRequestWire {
            predictions: queried
                .iter()
                .map(|&experience| PredictionRequestWire { experience })
                .collect(),
        };
        let (status, wire): (_, wire::BatchPredictionWire) =
            self.post_json("/prediction/batch", &request)?;
        wire.into_predictions(&queried)
            .map_err(|message| malformed(status, message))
    }

    fn fetch_insights_summary(&self) -> Result<InsightsSummary, GatewayError> {
        let (_, wire): (_, wire::InsightsWire) = self.get_json("/insights/summary", &[])?;
        Ok(wire.into())
    }

    fn fetch_benchmark(&self, experience: Experience) -> Result<BenchmarkResult, GatewayError> {
        let query = [("experience", experience.years().to_string())];
        let (_, wire): (_, wire::BenchmarkWire) = self.get_json("/insights/benchmark", &query)?;
        Ok(wire.into())
    }

    fn trigger_export(&self, format: ExportFormat) -> Result<(), GatewayError> {
        self.open_transfer(&format!("/insights/export/{}", format.path_segment()))
    }

    fn trigger_model_download(&self) -> Result<(), GatewayError> {
        self.open_transfer("/model/download")
    }
}

fn decode<T: DeserializeOwned>(
    result: Result<ureq::Response, ureq::Error>,
) -> Result<(u16, T), GatewayError> {
    match result {
        Ok(response) => {
            let status = response.status();
            let body = http_client::read_response_text(response, MAX_RESPONSE_BYTES)
                .map_err(|err| malformed(status, format!("Unreadable response: {err}")))?;
            let value = serde_json::from_str(&body)
                .map_err(|err| malformed(status, format!("Unexpected response: {err}")))?;
            Ok((status, value))
        }
        Err(ureq::Error::Status(code, response)) => {
            let body = http_client::read_response_text(response, MAX_ERROR_BYTES)
                .unwrap_or_default();
            let message = wire::service_detail(&body)
                .unwrap_or_else(|| format!("Service responded with HTTP {code}"));
            Err(GatewayError::service(Some(code), message))
        }
        Err(ureq::Error::Transport(err)) => Err(GatewayError::network(format!(
            "Could not reach the service: {err}"
        ))),
    }
}

fn malformed(status: u16, message: String) -> GatewayError {
    tracing::warn!("Malformed service response (HTTP {status}): {message}");
    GatewayError::service(Some(status), message)
}
