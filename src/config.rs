//! Logging configuration
//!
//! [`LoggingSettings`] is the raw shape handed over by whatever loads the
//! server configuration (environment, `.env`, a config file). It is turned
//! into a typed [`LoggerConfig`] by [`LoggerConfig::from_settings`], which
//! never fails: each rejected value falls back to its documented default and
//! is reported as a `ConfigValidation` error alongside the result.

use crate::core::{LogLevel, LoggerError, TimestampFormat};
use crate::sinks::{RotationPolicy, DEFAULT_BACKUP_COUNT, DEFAULT_MAX_BYTES};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_LOG_FILE: &str = "logs/mcp_server.log";
pub const DEFAULT_LEVEL: LogLevel = LogLevel::Info;
pub const DEFAULT_THIRD_PARTY_LEVEL: LogLevel = LogLevel::Warning;

/// Environment variable names read by [`LoggingSettings::from_env`]
pub mod env {
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    pub const LOG_FILE: &str = "LOG_FILE";
    pub const LOG_MAX_BYTES: &str = "LOG_MAX_BYTES";
    pub const LOG_BACKUP_COUNT: &str = "LOG_BACKUP_COUNT";
    pub const LOG_CONSOLE: &str = "LOG_CONSOLE";
    pub const LOG_FILE_ENABLED: &str = "LOG_FILE_ENABLED";
    pub const LOG_DATE_FORMAT: &str = "LOG_DATE_FORMAT";
    pub const THIRD_PARTY_LOG_LEVEL: &str = "THIRD_PARTY_LOG_LEVEL";
    pub const THIRD_PARTY_LOG_PROPAGATE: &str = "THIRD_PARTY_LOG_PROPAGATE";
}

/// Unvalidated logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub file: String,
    pub max_bytes: i64,
    pub backup_count: i64,
    pub console_enabled: bool,
    pub file_enabled: bool,
    /// strftime pattern; `None` keeps the second-granularity default
    pub date_format: Option<String>,
    pub third_party_level: String,
    pub third_party_propagate: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_string(),
            file: DEFAULT_LOG_FILE.to_string(),
            max_bytes: DEFAULT_MAX_BYTES as i64,
            backup_count: DEFAULT_BACKUP_COUNT as i64,
            console_enabled: true,
            file_enabled: true,
            date_format: None,
            third_party_level: DEFAULT_THIRD_PARTY_LEVEL.to_string(),
            third_party_propagate: true,
        }
    }
}

impl LoggingSettings {
    /// Read settings from the process environment
    pub fn from_env() -> (Self, Vec<LoggerError>) {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup
    ///
    /// Unset keys keep their defaults. Values that cannot even be parsed as
    /// the right type (a non-numeric size, a non-boolean flag) keep the
    /// default too and are reported.
    ///
    /// # Example
    ///
    /// ```
    /// use mcp_server_logging::config::LoggingSettings;
    ///
    /// let (settings, errors) = LoggingSettings::from_lookup(|key| match key {
    ///     "LOG_LEVEL" => Some("debug".to_string()),
    ///     "LOG_MAX_BYTES" => Some("lots".to_string()),
    ///     _ => None,
    /// });
    /// assert_eq!(settings.level, "debug");
    /// assert_eq!(settings.max_bytes, 10 * 1024 * 1024);
    /// assert_eq!(errors.len(), 1);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> (Self, Vec<LoggerError>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        let mut errors = Vec::new();

        if let Some(level) = lookup(env::LOG_LEVEL) {
            settings.level = level;
        }
        if let Some(file) = lookup(env::LOG_FILE) {
            settings.file = file;
        }
        if let Some(raw) = lookup(env::LOG_MAX_BYTES) {
            match raw.trim().parse() {
                Ok(value) => settings.max_bytes = value,
                Err(_) => errors.push(LoggerError::config(env::LOG_MAX_BYTES, raw, "not an integer")),
            }
        }
        if let Some(raw) = lookup(env::LOG_BACKUP_COUNT) {
            match raw.trim().parse() {
                Ok(value) => settings.backup_count = value,
                Err(_) => {
                    errors.push(LoggerError::config(env::LOG_BACKUP_COUNT, raw, "not an integer"))
                }
            }
        }
        if let Some(raw) = lookup(env::LOG_CONSOLE) {
            match parse_flag(&raw) {
                Some(value) => settings.console_enabled = value,
                None => errors.push(LoggerError::config(env::LOG_CONSOLE, raw, "not a boolean")),
            }
        }
        if let Some(raw) = lookup(env::LOG_FILE_ENABLED) {
            match parse_flag(&raw) {
                Some(value) => settings.file_enabled = value,
                None => errors.push(LoggerError::config(env::LOG_FILE_ENABLED, raw, "not a boolean")),
            }
        }
        if let Some(pattern) = lookup(env::LOG_DATE_FORMAT) {
            settings.date_format = Some(pattern);
        }
        if let Some(level) = lookup(env::THIRD_PARTY_LOG_LEVEL) {
            settings.third_party_level = level;
        }
        if let Some(raw) = lookup(env::THIRD_PARTY_LOG_PROPAGATE) {
            match parse_flag(&raw) {
                Some(value) => settings.third_party_propagate = value,
                None => errors.push(LoggerError::config(
                    env::THIRD_PARTY_LOG_PROPAGATE,
                    raw,
                    "not a boolean",
                )),
            }
        }

        (settings, errors)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Validated configuration for one `initialize` call
///
/// # Example
///
/// ```
/// use mcp_server_logging::config::LoggerConfig;
/// use mcp_server_logging::LogLevel;
///
/// let config = LoggerConfig::new()
///     .with_level(LogLevel::Debug)
///     .with_file_path("/tmp/mcp/server.log")
///     .with_console(false);
/// assert!(config.file_enabled);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub file_path: PathBuf,
    pub max_bytes: u64,
    pub backup_count: usize,
    pub console_enabled: bool,
    pub file_enabled: bool,
    pub timestamp_format: TimestampFormat,
    pub third_party_level: LogLevel,
    pub third_party_propagate: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            file_path: PathBuf::from(DEFAULT_LOG_FILE),
            max_bytes: DEFAULT_MAX_BYTES,
            backup_count: DEFAULT_BACKUP_COUNT,
            console_enabled: true,
            file_enabled: true,
            timestamp_format: TimestampFormat::default(),
            third_party_level: DEFAULT_THIRD_PARTY_LEVEL,
            third_party_propagate: true,
        }
    }
}

impl LoggerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate from the process environment
    pub fn from_env() -> (Self, Vec<LoggerError>) {
        let (settings, mut errors) = LoggingSettings::from_env();
        let (config, validation_errors) = Self::from_settings(&settings);
        errors.extend(validation_errors);
        (config, errors)
    }

    /// Validate raw settings, substituting defaults for rejected values
    pub fn from_settings(settings: &LoggingSettings) -> (Self, Vec<LoggerError>) {
        let mut errors = Vec::new();
        let mut config = Self::default();

        match settings.level.parse() {
            Ok(level) => config.level = level,
            Err(message) => errors.push(LoggerError::config("level", &settings.level, message)),
        }

        if settings.file.trim().is_empty() {
            errors.push(LoggerError::config("file", &settings.file, "empty path"));
        } else {
            config.file_path = PathBuf::from(&settings.file);
        }

        match u64::try_from(settings.max_bytes) {
            Ok(max_bytes) if max_bytes > 0 => config.max_bytes = max_bytes,
            _ => errors.push(LoggerError::config(
                "max_bytes",
                settings.max_bytes.to_string(),
                "must be positive",
            )),
        }

        match usize::try_from(settings.backup_count) {
            Ok(count) if count > 0 => config.backup_count = count,
            _ => errors.push(LoggerError::config(
                "backup_count",
                settings.backup_count.to_string(),
                "must be positive",
            )),
        }

        config.console_enabled = settings.console_enabled;
        config.file_enabled = settings.file_enabled;

        if let Some(ref pattern) = settings.date_format {
            if TimestampFormat::is_valid_pattern(pattern) {
                config.timestamp_format = TimestampFormat::Custom(pattern.clone());
            } else {
                errors.push(LoggerError::config("date_format", pattern, "invalid strftime pattern"));
            }
        }

        match settings.third_party_level.parse() {
            Ok(level) => config.third_party_level = level,
            Err(message) => errors.push(LoggerError::config(
                "third_party_level",
                &settings.third_party_level,
                message,
            )),
        }
        config.third_party_propagate = settings.third_party_propagate;

        (config, errors)
    }

    /// Replace unusable builder values with their defaults
    ///
    /// Zero limits, an empty file path and custom timestamp patterns chrono
    /// cannot render are each reset and reported as `ConfigValidation`.
    #[must_use]
    pub fn validated(mut self) -> (Self, Vec<LoggerError>) {
        let mut errors = Vec::new();

        if self.max_bytes == 0 {
            errors.push(LoggerError::config("max_bytes", "0", "must be positive"));
            self.max_bytes = DEFAULT_MAX_BYTES;
        }
        if self.backup_count == 0 {
            errors.push(LoggerError::config("backup_count", "0", "must be positive"));
            self.backup_count = DEFAULT_BACKUP_COUNT;
        }
        if self.file_path.as_os_str().is_empty() {
            errors.push(LoggerError::config("file", "", "empty path"));
            self.file_path = PathBuf::from(DEFAULT_LOG_FILE);
        }
        if let TimestampFormat::Custom(ref pattern) = self.timestamp_format {
            if !TimestampFormat::is_valid_pattern(pattern) {
                errors.push(LoggerError::config(
                    "date_format",
                    pattern,
                    "invalid strftime pattern",
                ));
                self.timestamp_format = TimestampFormat::default();
            }
        }

        (self, errors)
    }

    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = path.into();
        self
    }

    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    #[must_use]
    pub fn with_backup_count(mut self, count: usize) -> Self {
        self.backup_count = count;
        self
    }

    #[must_use]
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.console_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_file(mut self, enabled: bool) -> Self {
        self.file_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use]
    pub fn with_third_party_level(mut self, level: LogLevel) -> Self {
        self.third_party_level = level;
        self
    }

    #[must_use]
    pub fn with_third_party_propagate(mut self, propagate: bool) -> Self {
        self.third_party_propagate = propagate;
        self
    }

    pub fn rotation_policy(&self) -> RotationPolicy {
        RotationPolicy::new()
            .with_max_size(self.max_bytes)
            .with_max_backups(self.backup_count)
    }
}
