//! # Logging Utilities
//!
//! Logging infrastructure for cxxview using `tracing`.
//!
//! The decoders in `cxxview-core` only emit events; this module installs the
//! subscriber that prints them. Output goes to stderr, so anything a tool
//! prints on stdout (summaries, children) stays machine-readable.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cxxview_utils::init_logging;
//!
//! // Reads RUST_LOG, CXXVIEW_LOG_FORMAT and CXXVIEW_LOG_FILE
//! let _guard = init_logging().expect("Failed to initialize logging");
//! tracing::info!("Application started");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: level filter (e.g. `RUST_LOG=debug`, `RUST_LOG=cxxview_core=trace`)
//! - `CXXVIEW_LOG_FORMAT`: `pretty` or `json` (default: `pretty`)
//! - `CXXVIEW_LOG_FILE`: optional file that receives a copy of every event
//!   (a directory gets a dated `YYYY-MM-DD-cxxview.log` inside it)
//!
//! Keep the returned [`LogGuard`] alive for the life of the program: dropping
//! it flushes and closes the file writer.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, io};

use chrono::Utc;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format
pub const LOG_FORMAT_ENV: &str = "CXXVIEW_LOG_FORMAT";

/// Environment variable naming an additional log file
pub const LOG_FILE_ENV: &str = "CXXVIEW_LOG_FILE";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(s.to_owned())),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level (default)
    Warn,
    /// Info level
    Info,
    /// Debug level: every "no data" decision and its reason
    Debug,
    /// Trace level: every remote read
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::InvalidLevel(s.to_owned())),
        }
    }
}

/// Keeps the file writer alive; logging to the file stops when dropped
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug, Default)]
pub struct LogGuard
{
    _file: Option<WorkerGuard>,
}

/// Initialize logging from the environment
///
/// `RUST_LOG` filters events (default `warn`), `CXXVIEW_LOG_FORMAT` picks the
/// format and `CXXVIEW_LOG_FILE` adds a file copy.
///
/// ## Errors
///
/// - `InvalidFormat`: `CXXVIEW_LOG_FORMAT` is set to something unknown
/// - `InitializationFailed`: a global subscriber is already installed
pub fn init_logging() -> Result<LogGuard, LoggingError>
{
    let format = match env::var(LOG_FORMAT_ENV) {
        Ok(value) => value.parse()?,
        Err(_) => LogFormat::default(),
    };
    let file = env::var_os(LOG_FILE_ENV).map(PathBuf::from);
    init_logging_with(None, format, file.as_deref())
}

/// Initialize logging with an explicit level, format and optional file
///
/// A `level` of `Some` overrides `RUST_LOG` (a command line `--log-level`);
/// `None` falls back to `RUST_LOG` and then to `warn`.
///
/// ## Example
///
/// ```rust,no_run
/// use cxxview_utils::{init_logging_with, LogFormat, LogLevel};
///
/// let _guard = init_logging_with(Some(LogLevel::Debug), LogFormat::Json, None)
///     .expect("Failed to initialize logging");
/// ```
///
/// ## Errors
///
/// `InitializationFailed` if a global subscriber is already installed.
pub fn init_logging_with(level: Option<LogLevel>, format: LogFormat, file: Option<&Path>) -> Result<LogGuard, LoggingError>
{
    let filter = build_filter(level);

    let (file_writer, guard) = match file {
        Some(path) => {
            let (directory, name) = log_file_location(path);
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(directory, name));
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let result = match format {
        LogFormat::Pretty => {
            let console = fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(io::stderr)
                .with_filter(filter.clone());
            let file = file_writer.map(|writer| {
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(filter)
            });
            Registry::default().with(console).with(file).try_init()
        }
        LogFormat::Json => {
            let console = fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_current_span(true)
                .with_writer(io::stderr)
                .with_filter(filter.clone());
            let file = file_writer.map(|writer| {
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_current_span(true)
                    .with_writer(writer)
                    .with_filter(filter)
            });
            Registry::default().with(console).with(file).try_init()
        }
    };

    result.map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;
    Ok(LogGuard { _file: guard })
}

/// Split a log file path into directory and file name
///
/// A path naming an existing directory gets a dated file inside it,
/// `YYYY-MM-DD-cxxview.log`.
fn log_file_location(path: &Path) -> (PathBuf, OsString)
{
    if path.is_dir() {
        let today = Utc::now().format("%Y-%m-%d");
        return (path.to_path_buf(), OsString::from(format!("{today}-cxxview.log")));
    }
    let directory = path.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or(Path::new("."));
    (directory.to_path_buf(), path.file_name().unwrap_or_default().to_os_string())
}

fn build_filter(level: Option<LogLevel>) -> EnvFilter
{
    match level {
        Some(level) => EnvFilter::new(Level::from(level).to_string()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::WARN.to_string())),
    }
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}. Use 'pretty' or 'json'")]
    InvalidFormat(String),

    /// Invalid log level
    #[error("Invalid log level: {0}. Use 'error', 'warn', 'info', 'debug', or 'trace'")]
    InvalidLevel(String),

    /// Failed to install the global subscriber
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),
}
