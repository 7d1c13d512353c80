//! Logging macros for ergonomic log message formatting.
//!
//! Unlike the [`Logger`](crate::Logger) methods, the macros also record the
//! enclosing function name and the full module path of the call site. The
//! message is only formatted when the level passes the logger's threshold.
//!
//! # Examples
//!
//! ```
//! use mcp_server_logging::prelude::*;
//! use mcp_server_logging::{info, warning};
//!
//! let registry = LoggerRegistry::default();
//! let logger = registry.get_logger(Some("tools"));
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // With structured extra fields
//! warning!(logger, { "query_ms" => 1520, "table" => "orders" }, "Slow query");
//! ```

/// Name of the enclosing function, for call-site capture
#[doc(hidden)]
#[macro_export]
macro_rules! __function_name {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::core::log_record::short_function_name(__type_name_of(__here))
    }};
}

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use mcp_server_logging::prelude::*;
/// # let logger = LoggerRegistry::default().root();
/// use mcp_server_logging::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// log!(logger, LogLevel::Error, { "code" => 500 }, "Request failed");
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, { $($key:expr => $value:expr),+ $(,)? }, $($arg:tt)+) => {{
        let __logger = &$logger;
        let __level = $level;
        if __logger.is_enabled_for(__level) {
            let mut __fields = $crate::core::LogContext::new();
            $( __fields.add_field($key, $value); )+
            __logger.emit(
                $crate::core::LogRecord::new(__level, __logger.name(), format!($($arg)+))
                    .with_location(module_path!(), $crate::__function_name!(), line!())
                    .with_fields(__fields),
            );
        }
    }};
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let __logger = &$logger;
        let __level = $level;
        if __logger.is_enabled_for(__level) {
            __logger.emit(
                $crate::core::LogRecord::new(__level, __logger.name(), format!($($arg)+))
                    .with_location(module_path!(), $crate::__function_name!(), line!()),
            );
        }
    }};
}

/// Log a debug-level message.
///
/// ```
/// # use mcp_server_logging::prelude::*;
/// # let logger = LoggerRegistry::default().root();
/// use mcp_server_logging::debug;
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warning, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a critical-level message.
///
/// ```
/// # use mcp_server_logging::prelude::*;
/// # let logger = LoggerRegistry::default().root();
/// use mcp_server_logging::critical;
/// critical!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Critical, $($arg)+)
    };
}
