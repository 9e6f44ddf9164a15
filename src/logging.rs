//! Tracing setup for salarycast.
//!
//! Every launch gets its own `salarycast_<timestamp>.log` next to the config
//! directory, mirrored to stdout. HTTP transport chatter is kept at `warn`
//! unless `RUST_LOG` asks for more.

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::OnceLock,
    time::SystemTime,
};

use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::app_dirs;

/// Directives used when `RUST_LOG` is unset or unparsable.
const DEFAULT_FILTER: &str = "info,salarycast=debug,ureq=warn,rustls=warn,egui_glow=warn";
/// Launch logs kept on disk; older ones are deleted at startup.
const KEEP_LAUNCH_LOGS: usize = 10;
const LOG_FILE_PREFIX: &str = "salarycast_";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("No data directory available for salarycast logs")]
    NoDataDir,
    #[error("Log directory {path} is unusable: {source}")]
    LogDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not create launch log {path}: {source}")]
    LaunchLog {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not timestamp the launch log: {0}")]
    Timestamp(time::error::Format),
    #[error("A tracing subscriber is already installed: {0}")]
    Subscriber(tracing::subscriber::SetGlobalDefaultError),
}

/// The file this launch writes to.
struct LaunchLog {
    dir: PathBuf,
    file_name: String,
}

impl LaunchLog {
    /// Create the launch file in `dir` so it exists before the first event.
    fn create(dir: &Path, started: OffsetDateTime) -> Result<Self, LoggingError> {
        let file_name = launch_log_name(started)?;
        let path = dir.join(&file_name);
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LoggingError::LaunchLog { path, source })?;
        Ok(Self {
            dir: dir.to_path_buf(),
            file_name,
        })
    }

    fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Install the stdout and launch-file subscriber.
///
/// Calling it again after a successful install does nothing. On error the
/// caller keeps running without file logging.
pub fn init() -> Result<(), LoggingError> {
    if LOG_GUARD.get().is_some() {
        return Ok(());
    }

    let dir = app_dirs::logs_dir().map_err(|err| match err {
        app_dirs::AppDirError::NoBaseDir => LoggingError::NoDataDir,
        app_dirs::AppDirError::CreateDir { path, source } => LoggingError::LogDir { path, source },
    })?;
    let launch = LaunchLog::create(&dir, now_local_or_utc())?;
    let (file_writer, guard) =
        tracing_appender::non_blocking(rolling::never(&launch.dir, &launch.file_name));

    let timer = event_timer();
    let subscriber = Registry::default()
        .with(env_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with(
            fmt::layer()
                .with_timer(timer.clone())
                .with_writer(std::io::stdout),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_timer(timer)
                .with_writer(file_writer),
        );
    tracing::subscriber::set_global_default(subscriber).map_err(LoggingError::Subscriber)?;
    let _ = LOG_GUARD.set(guard);

    tracing::info!("salarycast {} logging to {}", env!("CARGO_PKG_VERSION"), launch.path().display());
    match prune_launch_logs(&dir, KEEP_LAUNCH_LOGS) {
        Ok(0) => {}
        Ok(removed) => tracing::debug!("Removed {removed} old launch logs"),
        Err(err) => tracing::warn!("Could not prune old launch logs: {err}"),
    }
    Ok(())
}

/// Build the filter from `RUST_LOG` directives, falling back to
/// [`DEFAULT_FILTER`] when they are missing or invalid.
fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|raw| !raw.trim().is_empty())
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Delete the oldest `salarycast_*.log` files beyond `keep`. Other files in
/// the directory are never touched. Returns how many were removed.
fn prune_launch_logs(dir: &Path, keep: usize) -> Result<usize, LoggingError> {
    let dir_error = |source: std::io::Error| LoggingError::LogDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut launches = fs::read_dir(dir)
        .map_err(dir_error)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| is_launch_log(&entry.file_name().to_string_lossy()))
        .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_file()))
        .map(|entry| {
            let modified = entry
                .metadata()
                .and_then(|meta| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, entry.path())
        })
        .collect::<Vec<_>>();

    launches.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    let excess = launches.len().saturating_sub(keep);
    for (_, path) in launches.iter().take(excess) {
        fs::remove_file(path).map_err(dir_error)?;
    }
    Ok(excess)
}

fn is_launch_log(name: &str) -> bool {
    name.starts_with(LOG_FILE_PREFIX) && name.ends_with(".log")
}

fn launch_log_name(started: OffsetDateTime) -> Result<String, LoggingError> {
    const STAMP: &[FormatItem<'_>] =
        format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
    let stamp = started.format(STAMP).map_err(LoggingError::Timestamp)?;
    Ok(format!("{LOG_FILE_PREFIX}{stamp}.log"))
}

fn event_timer() -> fmt::time::OffsetTime<time::format_description::BorrowedFormatItem<'static>> {
    const EVENT: &[FormatItem<'static>] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    fmt::time::OffsetTime::new(offset, EVENT.into())
}

fn now_local_or_utc() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
