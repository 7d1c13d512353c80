//! Core logger types and traits

pub mod error;
pub mod formatter;
pub mod log_context;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod metrics;
pub mod registry;
pub mod sink;
pub mod third_party;
pub mod timestamp;

pub use error::{LoggerError, Result};
pub use formatter::{RecordFormatter, StructuredRecord, GUARANTEED_FIELDS};
pub use log_context::{FieldValue, LogContext};
pub use log_level::LogLevel;
pub use log_record::{LogRecord, UNKNOWN_FUNCTION};
pub use logger::Logger;
pub use metrics::LoggerMetrics;
pub use registry::{LoggerRegistry, ROOT_LOGGER_NAME};
pub use sink::Sink;
pub use third_party::{ThirdPartyLevels, DEFAULT_THIRD_PARTY_LOGGERS};
pub use timestamp::TimestampFormat;
