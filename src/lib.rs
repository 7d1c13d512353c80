//! # MCP Server Logging
//!
//! Structured logging for the MariaDB MCP server: one JSON object per line,
//! written to the console and to a size-rotated file.
//!
//! ## Features
//!
//! - **Structured Records**: guaranteed `timestamp`, `level`, `logger`,
//!   `module`, `function` and `line` fields plus caller-supplied extras
//! - **Rotating File Sink**: `<path>`, `<path>.1` … `<path>.<backups>`
//! - **Logger Hierarchy**: a named root with dotted child loggers
//! - **Third-Party Floors**: quiet noisy libraries without touching the root
//! - **Thread Safe**: re-initialization swaps the whole sink set atomically
//!
//! ## Example
//!
//! ```no_run
//! use mcp_server_logging::prelude::*;
//! use mcp_server_logging::info;
//!
//! let registry = LoggerRegistry::new("mariadb_mcp");
//! let root = registry.initialize(&LoggerConfig::new()).unwrap();
//!
//! let db = registry.get_logger(Some("db"));
//! info!(db, { "pool_size" => 10 }, "Connected to {}", "localhost:3306");
//! root.info("Server ready");
//! ```

pub mod config;
pub mod core;
pub mod global;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::config::{LoggerConfig, LoggingSettings};
    pub use crate::core::{
        FieldValue, LogContext, LogLevel, LogRecord, Logger, LoggerError, LoggerMetrics,
        LoggerRegistry, RecordFormatter, Result, Sink, StructuredRecord, TimestampFormat,
        DEFAULT_THIRD_PARTY_LOGGERS, ROOT_LOGGER_NAME,
    };
    pub use crate::sinks::{ConsoleSink, RotatingFileSink, RotationPolicy};
}

pub use config::{LoggerConfig, LoggingSettings};
pub use core::{
    FieldValue, LogContext, LogLevel, LogRecord, Logger, LoggerError, LoggerMetrics,
    LoggerRegistry, RecordFormatter, Result, Sink, StructuredRecord, ThirdPartyLevels,
    TimestampFormat, DEFAULT_THIRD_PARTY_LOGGERS, ROOT_LOGGER_NAME,
};
pub use global::{get_logger, global, init, init_from_env, shutdown, suppress_third_party};
pub use sinks::{ConsoleSink, RotatingFileSink, RotationPolicy};
