//! Logger registry: the owned root logger, its children and installed sinks
//!
//! The installed state (threshold, formatter, sinks) lives behind one
//! `RwLock`. Emission holds the read guard for the whole dispatch;
//! `initialize`, `attach_sink` and `shutdown` take the write guard. An
//! emission therefore sees either the complete old sink set or the complete
//! new one.

use super::{
    error::{LoggerError, Result},
    formatter::RecordFormatter,
    log_context::LogContext,
    log_level::LogLevel,
    log_record::LogRecord,
    logger::{Logger, Scope},
    metrics::LoggerMetrics,
    sink::Sink,
    third_party::{ThirdPartyLevels, DEFAULT_THIRD_PARTY_LOGGERS},
};
use crate::config::LoggerConfig;
use crate::sinks::{ConsoleSink, RotatingFileSink};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Top-level name of the server's own logger hierarchy
pub const ROOT_LOGGER_NAME: &str = "mariadb_mcp";

struct Installed {
    level: LogLevel,
    formatter: Arc<RecordFormatter>,
    sinks: Vec<Arc<dyn Sink>>,
}

impl Installed {
    fn empty() -> Self {
        Self {
            level: LogLevel::default(),
            formatter: RecordFormatter::new().shared(),
            sinks: Vec::new(),
        }
    }
}

pub(crate) struct RegistryShared {
    installed: RwLock<Installed>,
    third_party: ThirdPartyLevels,
    metrics: LoggerMetrics,
}

impl RegistryShared {
    pub(crate) fn level(&self) -> LogLevel {
        self.installed.read().level
    }

    pub(crate) fn third_party(&self) -> &ThirdPartyLevels {
        &self.third_party
    }

    pub(crate) fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Deliver a record to every installed sink
    ///
    /// **Per-Sink Panic Isolation**: each sink call is wrapped in
    /// `catch_unwind`, so one failing sink never keeps a record from the
    /// others and never unwinds into the caller.
    pub(crate) fn dispatch(&self, mut record: LogRecord, scope: Scope) {
        let installed = self.installed.read();

        // The threshold may have changed since the caller checked it
        if scope == Scope::Owned && record.level < installed.level {
            self.metrics.record_filtered();
            return;
        }
        if installed.sinks.is_empty() {
            return;
        }
        record.stamp();

        let mut has_error = false;
        for sink in installed.sinks.iter() {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sink.emit(&record)));

            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!("[LOGGER ERROR] Sink '{}' failed: {}", sink.name(), e);
                    has_error = true;
                }
                Err(panic_info) => {
                    let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    eprintln!(
                        "[LOGGER CRITICAL] Sink '{}' panicked: {}. \
                         Other sinks continue to function.",
                        sink.name(),
                        panic_msg
                    );
                    has_error = true;
                }
            }
        }

        if has_error {
            self.metrics.record_dropped();
        } else {
            self.metrics.record_logged();
        }
    }

    pub(crate) fn flush(&self) -> Result<()> {
        let installed = self.installed.read();
        for sink in installed.sinks.iter() {
            sink.flush()?;
        }
        Ok(())
    }
}

/// Owner of one logger hierarchy and the sinks it writes to
///
/// # Example
///
/// ```no_run
/// use mcp_server_logging::config::LoggerConfig;
/// use mcp_server_logging::LoggerRegistry;
///
/// let registry = LoggerRegistry::new("mariadb_mcp");
/// let root = registry.initialize(&LoggerConfig::new()).unwrap();
/// root.info("server starting");
///
/// let db = registry.get_logger(Some("db"));
/// assert_eq!(db.name(), "mariadb_mcp.db");
/// ```
pub struct LoggerRegistry {
    root: Logger,
    shared: Arc<RegistryShared>,
    loggers: RwLock<HashMap<String, Logger>>,
}

impl LoggerRegistry {
    /// Create a registry with no sinks; records are discarded until `initialize`
    pub fn new(root_name: impl Into<String>) -> Self {
        let mut root_name = root_name.into();
        if root_name.trim().is_empty() {
            root_name = ROOT_LOGGER_NAME.to_string();
        }

        let shared = Arc::new(RegistryShared {
            installed: RwLock::new(Installed::empty()),
            third_party: ThirdPartyLevels::new(),
            metrics: LoggerMetrics::new(),
        });
        let root = Logger::new(root_name, Scope::Owned, Arc::clone(&shared));

        Self {
            root,
            shared,
            loggers: RwLock::new(HashMap::new()),
        }
    }

    pub fn root_name(&self) -> &str {
        self.root.name()
    }

    /// Install `config`, replacing whatever a previous call installed
    ///
    /// Unusable values (zero limits, an empty path, a bad timestamp
    /// pattern) fall back to their defaults and are reported as WARNING
    /// records through the new sinks. The new sinks are built under the
    /// write lock, so no emission can rotate the active file between the
    /// new file sink opening it and the swap. If the file sink cannot be
    /// created the previous installation stays active and the `SinkInit`
    /// error is returned. Afterwards the configured third-party floor is
    /// applied to [`DEFAULT_THIRD_PARTY_LOGGERS`].
    ///
    /// # Errors
    ///
    /// Returns `SinkInit` if the log directory or file is unavailable
    pub fn initialize(&self, config: &LoggerConfig) -> Result<Logger> {
        let (config, errors) = config.clone().validated();
        let formatter = RecordFormatter::new()
            .with_timestamp_format(config.timestamp_format.clone())
            .shared();

        let previous = {
            let mut installed = self.shared.installed.write();
            let sinks = Self::build_sinks(&config, &formatter)?;
            std::mem::replace(
                &mut *installed,
                Installed {
                    level: config.level,
                    formatter,
                    sinks,
                },
            )
        };
        Self::flush_detached(previous.sinks);

        self.shared.third_party.set_propagate(config.third_party_propagate);
        self.suppress_default_third_party(config.third_party_level);
        self.shared.metrics.record_initialization();
        self.report_config_errors(&errors);

        Ok(self.root.clone())
    }

    fn build_sinks(config: &LoggerConfig, formatter: &Arc<RecordFormatter>) -> Result<Vec<Arc<dyn Sink>>> {
        let mut sinks: Vec<Arc<dyn Sink>> = Vec::new();
        if config.console_enabled {
            sinks.push(Arc::new(ConsoleSink::new(Arc::clone(formatter))));
        }
        if config.file_enabled {
            let sink = RotatingFileSink::with_policy(
                &config.file_path,
                config.rotation_policy(),
                Arc::clone(formatter),
            )?;
            sinks.push(Arc::new(sink));
        }
        Ok(sinks)
    }

    /// Install an explicit sink set, e.g. sinks built outside this crate
    pub fn initialize_with_sinks(
        &self,
        level: LogLevel,
        formatter: Arc<RecordFormatter>,
        sinks: Vec<Arc<dyn Sink>>,
    ) -> Logger {
        self.install(level, formatter, sinks);
        self.shared.metrics.record_initialization();
        self.root.clone()
    }

    fn install(&self, level: LogLevel, formatter: Arc<RecordFormatter>, sinks: Vec<Arc<dyn Sink>>) {
        let previous = {
            let mut installed = self.shared.installed.write();
            std::mem::replace(
                &mut *installed,
                Installed {
                    level,
                    formatter,
                    sinks,
                },
            )
        };
        // No emission can reach the old sinks any more
        Self::flush_detached(previous.sinks);
    }

    fn flush_detached(sinks: Vec<Arc<dyn Sink>>) {
        for sink in sinks {
            if let Err(e) = sink.flush() {
                eprintln!("[LOGGER ERROR] Failed to flush detached sink '{}': {}", sink.name(), e);
            }
        }
    }

    /// Add one sink to the installed set
    pub fn attach_sink(&self, sink: Arc<dyn Sink>) {
        self.shared.installed.write().sinks.push(sink);
    }

    /// Change the root threshold without touching the sinks
    pub fn set_level(&self, level: LogLevel) {
        self.shared.installed.write().level = level;
    }

    pub fn level(&self) -> LogLevel {
        self.shared.level()
    }

    /// Formatter shared by the installed sinks
    pub fn formatter(&self) -> Arc<RecordFormatter> {
        Arc::clone(&self.shared.installed.read().formatter)
    }

    pub fn sink_count(&self) -> usize {
        self.shared.installed.read().sinks.len()
    }

    /// Names of the installed sinks, in dispatch order
    pub fn sink_names(&self) -> Vec<String> {
        self.shared
            .installed
            .read()
            .sinks
            .iter()
            .map(|sink| sink.name().to_string())
            .collect()
    }

    pub fn root(&self) -> Logger {
        self.root.clone()
    }

    /// Root logger for `None` or `""`, otherwise `<root>.<name>`
    pub fn get_logger(&self, name: Option<&str>) -> Logger {
        match name.map(|n| n.trim_matches('.')).filter(|n| !n.is_empty()) {
            None => self.root.clone(),
            Some(suffix) => {
                let full_name = format!("{}.{}", self.root.name(), suffix);
                self.cached(full_name, Scope::Owned)
            }
        }
    }

    /// Handle for an identity owned by another library
    ///
    /// Names inside this registry's own hierarchy resolve to the owned
    /// logger of that name instead.
    pub fn external(&self, name: &str) -> Logger {
        let root = self.root.name();
        if name == root {
            return self.root.clone();
        }
        let scope = match name.strip_prefix(root) {
            Some(rest) if rest.starts_with('.') => Scope::Owned,
            _ => Scope::External,
        };
        self.cached(name.to_string(), scope)
    }

    fn cached(&self, full_name: String, scope: Scope) -> Logger {
        if let Some(logger) = self.loggers.read().get(&full_name) {
            return logger.clone();
        }
        let mut loggers = self.loggers.write();
        loggers
            .entry(full_name)
            .or_insert_with_key(|name| Logger::new(name.as_str(), scope, Arc::clone(&self.shared)))
            .clone()
    }

    /// Set the severity floor of externally owned logger identities
    ///
    /// Touches neither the root threshold nor any sink. Identities that
    /// have not logged yet may be named.
    pub fn suppress_third_party<I, S>(&self, threshold: LogLevel, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.shared.third_party.suppress(threshold, names);
    }

    /// [`suppress_third_party`](Self::suppress_third_party) over the server's default set
    pub fn suppress_default_third_party(&self, threshold: LogLevel) {
        self.suppress_third_party(threshold, DEFAULT_THIRD_PARTY_LOGGERS);
    }

    /// Whether records from external identities reach the installed sinks
    pub fn set_third_party_propagation(&self, propagate: bool) {
        self.shared.third_party.set_propagate(propagate);
    }

    pub fn third_party(&self) -> &ThirdPartyLevels {
        &self.shared.third_party
    }

    /// Emit one WARNING per rejected configuration value
    pub fn report_config_errors(&self, errors: &[LoggerError]) {
        for error in errors {
            let mut fields = LogContext::new();
            if let LoggerError::ConfigValidation { field, value, .. } = error {
                fields.add_field("setting", field.as_str());
                fields.add_field("value", value.as_str());
            }
            self.root
                .warning_with(format!("Invalid logging configuration, using default: {}", error), fields);
        }
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.shared.metrics
    }

    pub fn flush(&self) -> Result<()> {
        self.shared.flush()
    }

    /// Detach and flush every sink; later records are discarded
    pub fn shutdown(&self) {
        let previous = std::mem::take(&mut self.shared.installed.write().sinks);
        Self::flush_detached(previous);
    }
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new(ROOT_LOGGER_NAME)
    }
}
