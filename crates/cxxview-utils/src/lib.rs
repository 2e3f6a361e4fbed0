//! # cxxview Utilities
//!
//! Shared logging and configuration for cxxview tools.
//!
//! - [`logging`]: `tracing` subscriber setup (pretty or JSON, stderr, optional file)
//! - [`config`]: settings read from `CXXVIEW_*` environment variables

pub mod config;
pub mod logging;

pub use config::{ConfigError, Settings};
pub use logging::{init_logging, init_logging_with, LogFormat, LogGuard, LogLevel, LoggingError};
