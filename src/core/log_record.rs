//! Raw log event as produced at a call site

use super::log_context::LogContext;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use std::cell::Cell;
use std::panic::Location;
use std::path::Path;

/// Function name used when the call site cannot name its function
pub const UNKNOWN_FUNCTION: &str = "<unknown>";

// Thread-local cache so the debug string of the ThreadId is parsed once per thread
thread_local! {
    static THREAD_ID_CACHE: Cell<Option<Option<u64>>> = const { Cell::new(None) };
}

/// Numeric id of the current thread, if the runtime exposes one
fn current_thread_id() -> Option<u64> {
    THREAD_ID_CACHE.with(|cache| {
        if let Some(id) = cache.get() {
            return id;
        }
        let id = parse_thread_id(&format!("{:?}", std::thread::current().id()));
        cache.set(Some(id));
        id
    })
}

/// Extract `N` from the `ThreadId(N)` debug representation
fn parse_thread_id(debug: &str) -> Option<u64> {
    debug
        .strip_prefix("ThreadId(")?
        .strip_suffix(')')?
        .parse()
        .ok()
}

/// Module name for a source file: its stem, `src/db/pool.rs` -> `pool`
fn module_from_file(file: &str) -> String {
    Path::new(file)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(file)
        .to_string()
}

/// Reduce a `type_name` of a nested marker fn to the enclosing function name
///
/// `app::db::connect::__here` -> `connect`,
/// `app::main::{{closure}}::__here` -> `main`.
#[doc(hidden)]
pub fn short_function_name(type_name: &'static str) -> &'static str {
    let mut name = type_name.strip_suffix("::__here").unwrap_or(type_name);
    while let Some(stripped) = name.strip_suffix("::{{closure}}") {
        name = stripped;
    }
    match name.rsplit("::").next() {
        Some(last) if !last.is_empty() => last,
        _ => UNKNOWN_FUNCTION,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub logger: String,
    pub module: String,
    pub function: String,
    pub line: u32,
    pub message: String,
    /// Stamped at dispatch when the call site does not supply one
    pub timestamp: Option<DateTime<Utc>>,
    pub process: Option<u32>,
    pub thread: Option<u64>,
    pub fields: LogContext,
}

impl LogRecord {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// so that every record stays on a single output line.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    /// Create a record for the current process and thread
    pub fn new(level: LogLevel, logger: impl Into<String>, message: impl AsRef<str>) -> Self {
        Self {
            level,
            logger: logger.into(),
            module: String::new(),
            function: UNKNOWN_FUNCTION.to_string(),
            line: 0,
            message: Self::sanitize_message(message.as_ref()),
            timestamp: None,
            process: Some(std::process::id()),
            thread: current_thread_id(),
            fields: LogContext::new(),
        }
    }

    pub fn with_location(mut self, module: &str, function: &str, line: u32) -> Self {
        self.module = module.to_string();
        self.function = function.to_string();
        self.line = line;
        self
    }

    /// Take module and line from a `#[track_caller]` location
    pub fn with_caller(mut self, location: &Location<'_>) -> Self {
        self.module = module_from_file(location.file());
        self.line = location.line();
        self
    }

    pub fn with_fields(mut self, fields: LogContext) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Drop process and thread ids, for records relayed from elsewhere
    pub fn without_origin(mut self) -> Self {
        self.process = None;
        self.thread = None;
        self
    }

    /// Fill in the timestamp if it is still missing
    pub fn stamp(&mut self) {
        self.timestamp.get_or_insert_with(Utc::now);
    }
}
