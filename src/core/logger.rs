//! Named logger handles

use super::{
    error::Result,
    log_context::LogContext,
    log_level::LogLevel,
    log_record::LogRecord,
    registry::RegistryShared,
};
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    /// Root logger or one of its `<root>.<suffix>` children
    Owned,
    /// Identity owned by another library, governed by third-party floors
    External,
}

/// Cheap, cloneable handle to a logger in a [`LoggerRegistry`]
///
/// Handles carry only a name; threshold, formatter and sinks are looked up
/// in the registry on every call, so a handle obtained before a
/// re-initialization follows the new configuration.
///
/// [`LoggerRegistry`]: super::LoggerRegistry
#[derive(Clone)]
pub struct Logger {
    name: Arc<str>,
    scope: Scope,
    shared: Arc<RegistryShared>,
}

impl Logger {
    pub(crate) fn new(name: impl Into<Arc<str>>, scope: Scope, shared: Arc<RegistryShared>) -> Self {
        Self {
            name: name.into(),
            scope,
            shared,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this logger belongs to another library
    pub fn is_external(&self) -> bool {
        self.scope == Scope::External
    }

    /// Handle for `<this name>.<suffix>`
    #[must_use]
    pub fn child(&self, suffix: &str) -> Logger {
        let suffix = suffix.trim_matches('.');
        if suffix.is_empty() {
            return self.clone();
        }
        Logger::new(format!("{}.{}", self.name, suffix), self.scope, Arc::clone(&self.shared))
    }

    /// Whether a record at `level` would reach the sinks
    pub fn is_enabled_for(&self, level: LogLevel) -> bool {
        match self.scope {
            Scope::Owned => level >= self.shared.level(),
            Scope::External => {
                self.shared.third_party().propagates()
                    && self.shared.third_party().is_enabled(&self.name, level)
            }
        }
    }

    /// Send a fully built record, e.g. from the logging macros
    pub fn emit(&self, mut record: LogRecord) {
        if !self.is_enabled_for(record.level) {
            self.shared.metrics().record_filtered();
            return;
        }
        if record.logger.is_empty() {
            record.logger = self.name.to_string();
        }
        self.shared.dispatch(record, self.scope);
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl AsRef<str>) {
        self.log_with(level, message, LogContext::new());
    }

    /// Log with structured extra fields
    #[track_caller]
    pub fn log_with(&self, level: LogLevel, message: impl AsRef<str>, fields: LogContext) {
        // Filter before the record (and its message copy) is built
        if !self.is_enabled_for(level) {
            self.shared.metrics().record_filtered();
            return;
        }
        let record = LogRecord::new(level, self.name.as_ref(), message)
            .with_caller(Location::caller())
            .with_fields(fields);
        self.shared.dispatch(record, self.scope);
    }

    #[inline]
    #[track_caller]
    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    #[track_caller]
    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    #[track_caller]
    pub fn warning(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Warning, message);
    }

    #[inline]
    #[track_caller]
    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    #[track_caller]
    pub fn critical(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Critical, message);
    }

    #[track_caller]
    pub fn debug_with(&self, message: impl AsRef<str>, fields: LogContext) {
        self.log_with(LogLevel::Debug, message, fields);
    }

    #[track_caller]
    pub fn info_with(&self, message: impl AsRef<str>, fields: LogContext) {
        self.log_with(LogLevel::Info, message, fields);
    }

    #[track_caller]
    pub fn warning_with(&self, message: impl AsRef<str>, fields: LogContext) {
        self.log_with(LogLevel::Warning, message, fields);
    }

    #[track_caller]
    pub fn error_with(&self, message: impl AsRef<str>, fields: LogContext) {
        self.log_with(LogLevel::Error, message, fields);
    }

    #[track_caller]
    pub fn critical_with(&self, message: impl AsRef<str>, fields: LogContext) {
        self.log_with(LogLevel::Critical, message, fields);
    }

    /// Flush every installed sink
    pub fn flush(&self) -> Result<()> {
        self.shared.flush()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("external", &self.is_external())
            .finish()
    }
}

impl PartialEq for Logger {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.shared, &other.shared)
    }
}
