//! Process-wide registry for the server's own logger hierarchy
//!
//! Code that can take a [`LoggerRegistry`] by reference should; these free
//! functions exist for call sites that cannot thread one through.

use crate::config::LoggerConfig;
use crate::core::{LogContext, LogLevel, Logger, LoggerRegistry, Result, ROOT_LOGGER_NAME};
use std::sync::OnceLock;

static GLOBAL: OnceLock<LoggerRegistry> = OnceLock::new();

/// The process-wide registry, rooted at [`ROOT_LOGGER_NAME`]
///
/// Created empty on first access; records are discarded until [`init`].
pub fn global() -> &'static LoggerRegistry {
    GLOBAL.get_or_init(|| LoggerRegistry::new(ROOT_LOGGER_NAME))
}

/// Install `config` on the process-wide registry
///
/// # Errors
///
/// Returns `SinkInit` if the file sink cannot be created; the previous
/// installation stays active.
pub fn init(config: &LoggerConfig) -> Result<Logger> {
    global().initialize(config)
}

/// Load the configuration from the environment and install it
///
/// Rejected settings are replaced by their defaults and reported as WARNING
/// records once the sinks are up, followed by an INFO summary.
pub fn init_from_env() -> Result<Logger> {
    let (config, errors) = LoggerConfig::from_env();
    let root = init(&config)?;
    global().report_config_errors(&errors);

    let summary = LogContext::new()
        .with_field("level", config.level.to_str())
        .with_field("file", config.file_path.display().to_string())
        .with_field("file_enabled", config.file_enabled)
        .with_field("console_enabled", config.console_enabled)
        .with_field("max_bytes", config.max_bytes)
        .with_field("backup_count", config.backup_count)
        .with_field("third_party_level", config.third_party_level.to_str());
    root.info_with("Logging initialized", summary);

    Ok(root)
}

/// See [`LoggerRegistry::get_logger`]
pub fn get_logger(name: Option<&str>) -> Logger {
    global().get_logger(name)
}

/// See [`LoggerRegistry::suppress_third_party`]
pub fn suppress_third_party<I, S>(threshold: LogLevel, names: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    global().suppress_third_party(threshold, names);
}

/// Flush and detach every sink of the process-wide registry
pub fn shutdown() {
    global().shutdown();
}
