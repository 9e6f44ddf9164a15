//! Client-side validation of user input before anything reaches the network.
//!
//! Each validated type can only be built through a checking constructor, so
//! the gateway never sees input the service would reject for shape reasons.

use std::path::Path;

use thiserror::Error;

use crate::types::{AlgorithmInfo, CsvUpload, TrainingConfig};

/// Smallest hold-out fraction accepted for training.
pub const MIN_TEST_FRACTION: f64 = 0.1;
/// Largest hold-out fraction accepted for training.
pub const MAX_TEST_FRACTION: f64 = 0.5;

const CSV_EXTENSION: &str = ".csv";

/// Input problems the user can fix inline; never sent to the service.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ClientValidationError {
    #[error("Please select a file first")]
    NoFileSelected,
    #[error("Please upload a CSV file ({file_name} is not .csv)")]
    NotCsv { file_name: String },
    #[error("Could not read {file_name}: {message}")]
    Unreadable { file_name: String, message: String },
    #[error("{file_name} is {size} bytes; uploads are limited to {limit} bytes")]
    FileTooLarge {
        file_name: String,
        size: u64,
        limit: u64,
    },
    #[error("Test size must be between 0.1 and 0.5 (got {0})")]
    TestFractionOutOfRange(f64),
    #[error("Please choose an algorithm")]
    MissingAlgorithm,
    #[error("Algorithm '{0}' is not offered by the service")]
    UnknownAlgorithm(String),
    #[error("The service does not offer any training algorithms")]
    NoAlgorithmsAvailable,
    #[error("Please enter years of experience")]
    MissingExperience,
    #[error("'{0}' is not a number")]
    InvalidNumber(String),
    #[error("Experience must be a finite value of zero or more (got {0})")]
    InvalidExperience(f64),
    #[error("Please enter valid experience values")]
    EmptyBatch,
    #[error("Train a model before downloading it")]
    NoTrainedModel,
}

/// Years of experience: finite and non-negative.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Experience(f64);

impl Experience {
    pub fn new(years: f64) -> Result<Self, ClientValidationError> {
        if years.is_finite() && years >= 0.0 {
            Ok(Self(years))
        } else {
            Err(ClientValidationError::InvalidExperience(years))
        }
    }

    /// Parse a user-entered value such as `" 4.5 "`.
    pub fn parse(input: &str) -> Result<Self, ClientValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ClientValidationError::MissingExperience);
        }
        let years = trimmed
            .parse::<f64>()
            .map_err(|_| ClientValidationError::InvalidNumber(trimmed.to_string()))?;
        Self::new(years)
    }

    pub fn years(self) -> f64 {
        self.0
    }
}

/// A nonempty, ordered list of experiences for batch prediction.
#[derive(Clone, Debug, PartialEq)]
pub struct ExperienceBatch(Vec<Experience>);

impl ExperienceBatch {
    pub fn new(experiences: Vec<Experience>) -> Result<Self, ClientValidationError> {
        if experiences.is_empty() {
            return Err(ClientValidationError::EmptyBatch);
        }
        Ok(Self(experiences))
    }

    /// Parse comma-separated input, dropping blank entries.
    ///
    /// `"1, 2.5, , 5"` yields `[1, 2.5, 5]`; input holding only blanks and
    /// commas is an [`ClientValidationError::EmptyBatch`].
    pub fn parse(input: &str) -> Result<Self, ClientValidationError> {
        let experiences = input
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(Experience::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(experiences)
    }

    pub fn as_slice(&self) -> &[Experience] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn years(&self) -> Vec<f64> {
        self.0.iter().map(|experience| experience.years()).collect()
    }
}

/// Validate a training request against the advertised algorithm catalog.
///
/// `advertised` is `None` while the catalog is unknown (not loaded or failed);
/// the service then remains the authority on the algorithm id.
pub fn training_config(
    algorithm_id: &str,
    test_fraction: f64,
    advertised: Option<&[AlgorithmInfo]>,
) -> Result<TrainingConfig, ClientValidationError> {
    if !(MIN_TEST_FRACTION..=MAX_TEST_FRACTION).contains(&test_fraction) {
        return Err(ClientValidationError::TestFractionOutOfRange(test_fraction));
    }
    let algorithm_id = algorithm_id.trim();
    if let Some(catalog) = advertised {
        if catalog.is_empty() {
            return Err(ClientValidationError::NoAlgorithmsAvailable);
        }
        if !catalog.iter().any(|algorithm| algorithm.id == algorithm_id) {
            return Err(if algorithm_id.is_empty() {
                ClientValidationError::MissingAlgorithm
            } else {
                ClientValidationError::UnknownAlgorithm(algorithm_id.to_string())
            });
        }
    }
    if algorithm_id.is_empty() {
        return Err(ClientValidationError::MissingAlgorithm);
    }
    Ok(TrainingConfig {
        algorithm_id: algorithm_id.to_string(),
        test_fraction,
    })
}

/// Check and load a CSV file for upload.
pub fn csv_upload(path: &Path, max_bytes: u64) -> Result<CsvUpload, ClientValidationError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    if file_name.is_empty() {
        return Err(ClientValidationError::NoFileSelected);
    }
    if !file_name.ends_with(CSV_EXTENSION) {
        return Err(ClientValidationError::NotCsv { file_name });
    }
    let unreadable = |err: std::io::Error| ClientValidationError::Unreadable {
        file_name: file_name.clone(),
        message: err.to_string(),
    };
    let size = std::fs::metadata(path).map_err(unreadable)?.len();
    if size > max_bytes {
        return Err(ClientValidationError::FileTooLarge {
            file_name: file_name.clone(),
            size,
            limit: max_bytes,
        });
    }
    let bytes = std::fs::read(path).map_err(unreadable)?;
    Ok(CsvUpload {
        path: path.to_path_buf(),
        file_name,
        bytes,
    })
}
