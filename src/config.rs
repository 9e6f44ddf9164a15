//! Persistent application settings stored as `config.toml` in the app root.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs;
use crate::gateway::DEFAULT_BASE_URL;
use crate::http_client::Timeouts;
use crate::validation::{MAX_TEST_FRACTION, MIN_TEST_FRACTION};

/// Default filename used to store the app configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Environment variable that replaces `[service] base_url` for one launch.
pub const API_URL_ENV: &str = "SALARYCAST_API_URL";
/// Upload limit enforced by the service.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Everything the app persists between launches.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceSettings,
    #[serde(default)]
    pub upload: UploadSettings,
    #[serde(default)]
    pub training: TrainingDefaults,
    #[serde(default)]
    pub ui: UiSettings,
}

/// Where the salary service lives and how patient to be with it.
///
/// Config keys: `base_url`, `connect_timeout_secs`, `read_timeout_secs`,
/// `write_timeout_secs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_transfer_timeout")]
    pub read_timeout_secs: u64,
    #[serde(default = "default_transfer_timeout")]
    pub write_timeout_secs: u64,
    /// Launch-only replacement for `base_url`; never serialized.
    #[serde(skip)]
    base_url_override: Option<String>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_transfer_timeout(),
            write_timeout_secs: default_transfer_timeout(),
            base_url_override: None,
        }
    }
}

impl ServiceSettings {
    /// The URL to talk to: the launch override if set, else `base_url`.
    pub fn effective_base_url(&self) -> &str {
        self.base_url_override.as_deref().unwrap_or(&self.base_url)
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            connect: Duration::from_secs(self.connect_timeout_secs.max(1)),
            read: Duration::from_secs(self.read_timeout_secs.max(1)),
            write: Duration::from_secs(self.write_timeout_secs.max(1)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadSettings {
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

/// Initial values for the training form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingDefaults {
    #[serde(default = "default_algorithm")]
    pub default_algorithm: String,
    #[serde(default = "default_test_fraction")]
    pub default_test_fraction: f64,
}

impl Default for TrainingDefaults {
    fn default() -> Self {
        Self {
            default_algorithm: default_algorithm(),
            default_test_fraction: default_test_fraction(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UiSettings {
    /// Folder the CSV picker opens in.
    #[serde(default)]
    pub last_upload_dir: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config to TOML at {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
    #[error("Invalid service URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("No suitable config directory found")]
    NoConfigDir,
}

impl AppConfig {
    /// Clamp and tidy values that may have been hand-edited.
    pub fn normalized(mut self) -> Self {
        self.service.base_url = self.service.base_url.trim().trim_end_matches('/').to_string();
        let fraction = self.training.default_test_fraction;
        self.training.default_test_fraction = if fraction.is_finite() {
            fraction.clamp(MIN_TEST_FRACTION, MAX_TEST_FRACTION)
        } else {
            default_test_fraction()
        };
        if self.training.default_algorithm.trim().is_empty() {
            self.training.default_algorithm = default_algorithm();
        }
        if self.upload.max_file_bytes == 0 {
            self.upload.max_file_bytes = default_max_file_bytes();
        }
        self
    }

    /// Use `value` as the service URL for this launch only. The saved
    /// `base_url` is left alone.
    pub fn with_base_url_override(mut self, value: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(url) = value.map(str::trim).filter(|url| !url.is_empty()) {
            let url = url.trim_end_matches('/').to_string();
            validate_base_url(&url)?;
            tracing::info!("Using service URL from {API_URL_ENV}: {url}");
            self.service.base_url_override = Some(url);
        }
        Ok(self)
    }
}

/// Resolve the configuration file path, ensuring the parent directory exists.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(map_app_dir_error)?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Load configuration from disk, returning defaults if missing.
///
/// `SALARYCAST_API_URL` is applied on top but never written back.
pub fn load_or_default() -> Result<AppConfig, ConfigError> {
    let config = load_from(&config_path()?)?;
    let env_url = std::env::var(API_URL_ENV).ok();
    config.with_base_url_override(env_url.as_deref())
}

/// Config chosen at startup and whether it may be written back to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct StartupConfig {
    pub config: AppConfig,
    /// False when the file on disk could not be used; saving would clobber it.
    pub writable: bool,
}

/// Like [`load_or_default`], but never fails. A broken file or env URL falls
/// back to defaults and the result is marked read-only.
pub fn load_for_startup() -> StartupConfig {
    match load_or_default() {
        Ok(config) => StartupConfig {
            config,
            writable: true,
        },
        Err(err) => {
            tracing::warn!("Falling back to default config; settings will not be saved: {err}");
            StartupConfig {
                config: AppConfig::default(),
                writable: false,
            }
        }
    }
}

/// Load and validate the config at `path`; a missing file yields defaults.
pub fn load_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str::<AppConfig>(&text)
        .map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })?
        .normalized();
    validate_base_url(&config.service.base_url)?;
    Ok(config)
}

/// Persist configuration to disk, overwriting any previous contents.
pub fn save(config: &AppConfig) -> Result<(), ConfigError> {
    save_to_path(config, &config_path()?)
}

/// Save configuration to a specific path, creating parent directories as needed.
pub fn save_to_path(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let data = toml::to_string_pretty(config).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, data).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn validate_base_url(raw: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let parsed = url::Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme '{other}'"))),
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host".into()));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("query strings and fragments are not allowed".into()));
    }
    Ok(())
}

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => {
            ConfigError::CreateDir { path, source }
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_transfer_timeout() -> u64 {
    60
}

fn default_max_file_bytes() -> u64 {
    DEFAULT_MAX_FILE_BYTES
}

fn default_algorithm() -> String {
    "linear".to_string()
}

fn default_test_fraction() -> f64 {
    0.2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_dirs::ConfigBaseGuard;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = load_from(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.service.base_url, "http://localhost:8000/api");
        assert_eq!(config.upload.max_file_bytes, 10 * 1024 * 1024);
        assert_eq!(config.training.default_algorithm, "linear");
        assert_eq!(config.training.default_test_fraction, 0.2);
    }

    #[test]
    fn partial_file_is_normalized() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "[service]\nbase_url = \"https://hr.example.com/api/\"\n\n[training]\ndefault_test_fraction = 0.9\n",
        )
        .unwrap();
        let config = load_from(&path).unwrap();
        assert_eq!(config.service.base_url, "https://hr.example.com/api");
        assert_eq!(config.training.default_test_fraction, 0.5);
        assert_eq!(config.service.read_timeout_secs, 60);
    }

    #[test]
    fn rejects_non_http_base_url() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[service]\nbase_url = \"ftp://files.example.com\"\n").unwrap();
        assert!(matches!(
            load_from(&path).unwrap_err(),
            ConfigError::InvalidBaseUrl { .. }
        ));
    }

    #[test]
    fn malformed_toml_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[service\n").unwrap();
        match load_from(&path).unwrap_err() {
            ConfigError::ParseToml { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn save_then_load_under_app_root() {
        let base = tempdir().unwrap();
        let _guard = ConfigBaseGuard::set(base.path().to_path_buf());
        let mut config = AppConfig::default();
        config.ui.last_upload_dir = Some(PathBuf::from("/data/hr"));
        config.training.default_algorithm = "random_forest".into();
        save(&config).unwrap();

        let path = config_path().unwrap();
        assert!(path.starts_with(base.path()));
        assert_eq!(load_from(&path).unwrap(), config);
    }

    #[test]
    fn env_override_replaces_effective_url_only() {
        let config = AppConfig::default()
            .with_base_url_override(Some(" http://10.0.0.5:9000/api/ "))
            .unwrap();
        assert_eq!(config.service.effective_base_url(), "http://10.0.0.5:9000/api");
        assert_eq!(config.service.base_url, DEFAULT_BASE_URL);
        let unchanged = AppConfig::default().with_base_url_override(Some("")).unwrap();
        assert_eq!(unchanged.service.effective_base_url(), DEFAULT_BASE_URL);
        assert!(AppConfig::default()
            .with_base_url_override(Some("not a url"))
            .is_err());
    }

    #[test]
    fn saving_overridden_config_keeps_file_url() {
        let base = tempdir().unwrap();
        let _guard = ConfigBaseGuard::set(base.path().to_path_buf());
        let mut config = AppConfig::default()
            .with_base_url_override(Some("http://10.9.9.9:1234/api"))
            .unwrap();
        config.ui.last_upload_dir = Some(PathBuf::from("/data/hr"));
        save(&config).unwrap();

        let text = std::fs::read_to_string(config_path().unwrap()).unwrap();
        assert!(!text.contains("10.9.9.9"));
        let reloaded = load_from(&config_path().unwrap()).unwrap();
        assert_eq!(reloaded.service.base_url, DEFAULT_BASE_URL);
        assert_eq!(reloaded.ui.last_upload_dir, Some(PathBuf::from("/data/hr")));
    }

    #[test]
    fn broken_file_starts_read_only() {
        let base = tempdir().unwrap();
        let _guard = ConfigBaseGuard::set(base.path().to_path_buf());
        let path = config_path().unwrap();
        std::fs::write(&path, "[service\n").unwrap();

        let startup = load_for_startup();
        assert!(!startup.writable);
        assert_eq!(startup.config, AppConfig::default());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[service\n");
    }

    #[test]
    fn timeouts_never_zero() {
        let mut settings = ServiceSettings::default();
        settings.connect_timeout_secs = 0;
        assert_eq!(settings.timeouts().connect, Duration::from_secs(1));
        assert_eq!(settings.timeouts().read, Duration::from_secs(60));
    }
}
