//! Error types for the logging subsystem

use std::path::Path;

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// A sink could not be set up (directory or file unavailable)
    #[error("Failed to initialize {sink} sink at '{path}': {message}")]
    SinkInit {
        sink: String,
        path: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// A single record could not be written
    #[error("Write to {sink} sink failed: {message}")]
    SinkWrite {
        sink: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// A configuration value was rejected and replaced by its default
    #[error("Invalid value '{value}' for {field}: {message}")]
    ConfigValidation {
        field: String,
        value: String,
        message: String,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl LoggerError {
    /// Create a sink initialization error
    pub fn sink_init(
        sink: impl Into<String>,
        path: &Path,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::SinkInit {
            sink: sink.into(),
            path: path.display().to_string(),
            message: message.into(),
            source,
        }
    }

    /// Create a sink write error
    pub fn sink_write(
        sink: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::SinkWrite {
            sink: sink.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a configuration validation error
    pub fn config(
        field: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        LoggerError::ConfigValidation {
            field: field.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// Whether this error must abort initialization
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, LoggerError::SinkInit { .. })
    }
}
