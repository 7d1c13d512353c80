//! Sink trait for log output destinations

use super::{error::Result, log_record::LogRecord};

/// An output destination for records
///
/// Implementations serialize their own writes; `emit` may be called from
/// many threads at once.
pub trait Sink: Send + Sync {
    fn emit(&self, record: &LogRecord) -> Result<()>;
    fn flush(&self) -> Result<()>;
    fn name(&self) -> &str;
}
