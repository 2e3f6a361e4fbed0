//! # Configuration
//!
//! Environment-driven settings shared by cxxview tools.
//!
//! | variable | meaning | default |
//! |---|---|---|
//! | `CXXVIEW_MAX_STRING_SUMMARY_LEN` | characters rendered before a string is cut | `1024` |
//! | `CXXVIEW_SUMMARY_CAPPING` | `on`/`off`: whether strings are cut at all | `on` |
//! | `CXXVIEW_LOG_FORMAT` | `pretty` or `json` | `pretty` |
//! | `CXXVIEW_LOG_FILE` | file receiving a copy of the logs | unset |
//!
//! Command line flags are applied on top of these by the caller.

use std::env;
use std::path::PathBuf;

use cxxview_core::formatters::string_printer::DEFAULT_MAX_STRING_SUMMARY_LEN;
use cxxview_core::formatters::SummaryOptions;

use crate::logging::{LogFormat, LOG_FILE_ENV, LOG_FORMAT_ENV};

/// Environment variable for [`Settings::max_string_summary_len`]
pub const MAX_STRING_SUMMARY_LEN_ENV: &str = "CXXVIEW_MAX_STRING_SUMMARY_LEN";

/// Environment variable for [`Settings::summary_capping`]
pub const SUMMARY_CAPPING_ENV: &str = "CXXVIEW_SUMMARY_CAPPING";

/// Settings resolved from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings
{
    /// Cap on characters rendered in a string summary
    pub max_string_summary_len: usize,
    /// Whether the cap applies
    pub summary_capping: bool,
    /// Log output format
    pub log_format: LogFormat,
    /// Optional log file
    pub log_file: Option<PathBuf>,
}

impl Default for Settings
{
    fn default() -> Self
    {
        Self {
            max_string_summary_len: DEFAULT_MAX_STRING_SUMMARY_LEN,
            summary_capping: true,
            log_format: LogFormat::default(),
            log_file: None,
        }
    }
}

impl Settings
{
    /// Read settings from the process environment
    ///
    /// ## Errors
    ///
    /// `InvalidValue` if a variable is set to something that cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError>
    {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value
    ///
    /// ## Example
    ///
    /// ```rust
    /// use cxxview_utils::config::Settings;
    ///
    /// let settings = Settings::from_lookup(|name| {
    ///     (name == "CXXVIEW_MAX_STRING_SUMMARY_LEN").then(|| "64".to_owned())
    /// })
    /// .unwrap();
    /// assert_eq!(settings.max_string_summary_len, 64);
    /// assert!(settings.summary_capping);
    /// ```
    ///
    /// ## Errors
    ///
    /// `InvalidValue` if a variable is set to something that cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError>
    {
        let mut settings = Self::default();

        if let Some(value) = lookup(MAX_STRING_SUMMARY_LEN_ENV) {
            settings.max_string_summary_len = value
                .trim()
                .parse()
                .map_err(|err| ConfigError::invalid(MAX_STRING_SUMMARY_LEN_ENV, &value, err))?;
        }
        if let Some(value) = lookup(SUMMARY_CAPPING_ENV) {
            settings.summary_capping = parse_switch(&value)
                .ok_or_else(|| ConfigError::invalid(SUMMARY_CAPPING_ENV, &value, "expected on or off"))?;
        }
        if let Some(value) = lookup(LOG_FORMAT_ENV) {
            settings.log_format = value
                .parse()
                .map_err(|err| ConfigError::invalid(LOG_FORMAT_ENV, &value, err))?;
        }
        settings.log_file = lookup(LOG_FILE_ENV).filter(|path| !path.is_empty()).map(PathBuf::from);

        Ok(settings)
    }

    /// Options handed to the string summaries
    pub fn summary_options(&self) -> SummaryOptions
    {
        SummaryOptions {
            capping: self.summary_capping,
            max_string_len: self.max_string_summary_len,
        }
    }
}

fn parse_switch(value: &str) -> Option<bool>
{
    match value.trim().to_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError
{
    /// An environment variable holds an unusable value
    #[error("Invalid value {value:?} for {var}: {reason}")]
    InvalidValue
    {
        /// Variable name
        var: &'static str,
        /// Value found
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

impl ConfigError
{
    fn invalid(var: &'static str, value: &str, reason: impl ToString) -> Self
    {
        ConfigError::InvalidValue {
            var,
            value: value.to_owned(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests
{
    use std::collections::HashMap;

    use super::*;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError>
    {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults()
    {
        let settings = settings(&[]).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.summary_options(), SummaryOptions::default());
    }

    #[test]
    fn test_overrides()
    {
        let settings = settings(&[
            (MAX_STRING_SUMMARY_LEN_ENV, " 16 "),
            (SUMMARY_CAPPING_ENV, "off"),
            (LOG_FORMAT_ENV, "json"),
            (LOG_FILE_ENV, "/tmp/cxxview.log"),
        ])
        .unwrap();

        assert_eq!(settings.max_string_summary_len, 16);
        assert!(!settings.summary_capping);
        assert_eq!(settings.log_format, LogFormat::Json);
        assert_eq!(settings.log_file, Some(PathBuf::from("/tmp/cxxview.log")));

        let options = settings.summary_options();
        assert!(!options.capping);
        assert_eq!(options.max_string_len, 16);
    }

    #[test]
    fn test_empty_log_file_is_ignored()
    {
        assert_eq!(settings(&[(LOG_FILE_ENV, "")]).unwrap().log_file, None);
    }

    #[test]
    fn test_invalid_values()
    {
        for (var, value) in [
            (MAX_STRING_SUMMARY_LEN_ENV, "lots"),
            (SUMMARY_CAPPING_ENV, "maybe"),
            (LOG_FORMAT_ENV, "xml"),
        ] {
            match settings(&[(var, value)]) {
                Err(ConfigError::InvalidValue { var: got, .. }) => assert_eq!(got, var),
                other => panic!("Expected InvalidValue for {var}, got {other:?}"),
            }
        }
    }
}
