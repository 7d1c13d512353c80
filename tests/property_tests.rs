//! Property-based tests for mcp_server_logging using proptest

use mcp_server_logging::config::{LoggerConfig, LoggingSettings};
use mcp_server_logging::prelude::*;
use proptest::prelude::*;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

const BUILT_IN_FIELDS: [&str; 9] = [
    "timestamp", "level", "logger", "module", "function", "line", "message", "process", "thread",
];

fn any_level() -> impl Strategy<Value = LogLevel> {
    proptest::sample::select(LogLevel::ALL.to_vec())
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn line_count(&self) -> usize {
        self.0.lock().expect("buffer lock").split(|b| *b == b'\n').filter(|l| !l.is_empty()).count()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("buffer lock").write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Test that LogLevel string conversions roundtrip correctly
    #[test]
    fn test_log_level_str_roundtrip(level in any_level()) {
        let parsed: LogLevel = level.to_str().parse().unwrap();
        prop_assert_eq!(level, parsed);
    }

    /// Level names parse regardless of case and surrounding whitespace
    #[test]
    fn test_log_level_case_insensitive(level in any_level(), lower in any::<bool>(), pad in 0usize..3) {
        let name = if lower { level.to_str().to_lowercase() } else { level.to_str().to_string() };
        let input = format!("{}{}{}", " ".repeat(pad), name, " ".repeat(pad));
        prop_assert_eq!(input.parse::<LogLevel>().unwrap(), level);
    }

    /// Test that LogLevel ordering is consistent with severity
    #[test]
    fn test_log_level_ordering(level1 in any_level(), level2 in any_level()) {
        let val1 = level1 as u8;
        let val2 = level2 as u8;

        prop_assert_eq!(level1 <= level2, val1 <= val2);
        prop_assert_eq!(level1 > level2, val1 > val2);
    }

    /// Unknown names fall back instead of failing
    #[test]
    fn test_log_level_invalid_parse(invalid in "[xyz0-9]{1,12}") {
        prop_assert!(invalid.parse::<LogLevel>().is_err());
        prop_assert_eq!(LogLevel::parse_or(&invalid, LogLevel::Warning), LogLevel::Warning);
    }
}

// ============================================================================
// Threshold Tests
// ============================================================================

proptest! {
    /// Below the threshold nothing is written; otherwise one line per sink
    #[test]
    fn test_threshold_gates_every_sink(threshold in any_level(), level in any_level(), sink_count in 1usize..4) {
        let formatter = RecordFormatter::new().shared();
        let buffers: Vec<SharedBuffer> = (0..sink_count).map(|_| SharedBuffer::default()).collect();
        let sinks: Vec<Arc<dyn Sink>> = buffers
            .iter()
            .map(|buffer| {
                Arc::new(ConsoleSink::with_writer(Arc::clone(&formatter), buffer.clone())) as Arc<dyn Sink>
            })
            .collect();

        let registry = LoggerRegistry::default();
        let logger = registry.initialize_with_sinks(threshold, formatter, sinks).child("db");
        logger.log(level, "event");

        let expected = usize::from(level >= threshold);
        for buffer in &buffers {
            prop_assert_eq!(buffer.line_count(), expected);
        }
    }
}

// ============================================================================
// Record Tests
// ============================================================================

proptest! {
    /// Every message stays on a single output line
    #[test]
    fn test_message_never_spans_lines(message in ".*") {
        let record = LogRecord::new(LogLevel::Info, "mariadb_mcp", &message);
        let line = RecordFormatter::new().format_line(&record);

        prop_assert!(!line.contains('\n'));
        prop_assert!(!line.contains('\r'));
        prop_assert!(!record.message.contains('\t'));
    }

    /// Guaranteed fields are present and non-empty for any input
    #[test]
    fn test_guaranteed_fields_present(
        logger in "[a-z_.]{0,20}",
        module in "[a-z_]{0,12}",
        function in "[a-z_]{0,12}",
        line in 0u32..10_000,
        level in any_level(),
    ) {
        let record = LogRecord::new(level, logger, "message").with_location(&module, &function, line);
        let structured = RecordFormatter::new().format(&record);

        for field in mcp_server_logging::core::GUARANTEED_FIELDS {
            prop_assert!(structured.get(field).is_some(), "missing {}", field);
        }
        prop_assert_ne!(structured.get("module").and_then(|v| v.as_str()), Some(""));
        prop_assert_ne!(structured.get("function").and_then(|v| v.as_str()), Some(""));
        prop_assert_eq!(structured.get("level").and_then(|v| v.as_str()), Some(level.to_str()));
    }

    /// Caller extras survive formatting but never replace guaranteed fields
    #[test]
    fn test_extras_never_override_guaranteed_fields(
        key in prop_oneof![
            Just("timestamp".to_string()),
            Just("level".to_string()),
            Just("logger".to_string()),
            Just("line".to_string()),
            "[a-z]{3,10}".prop_filter("built-in field name", |k| !BUILT_IN_FIELDS.contains(&k.as_str())),
        ],
        value in "[a-zA-Z0-9 ]{0,20}",
    ) {
        let record = LogRecord::new(LogLevel::Error, "mariadb_mcp.db", "failed")
            .with_fields(LogContext::new().with_field(key.clone(), value.clone()));
        let line = RecordFormatter::new().format_line(&record);
        let parsed = StructuredRecord::from_json(&line).unwrap();

        match key.as_str() {
            "level" => prop_assert_eq!(parsed.get("level").and_then(|v| v.as_str()), Some("ERROR")),
            "logger" => prop_assert_eq!(parsed.get("logger").and_then(|v| v.as_str()), Some("mariadb_mcp.db")),
            "line" => prop_assert!(parsed.get("line").map_or(false, |v| v.is_number())),
            "timestamp" => prop_assert_ne!(parsed.get("timestamp").and_then(|v| v.as_str()), Some(value.as_str())),
            _ => prop_assert_eq!(parsed.get(&key).and_then(|v| v.as_str()), Some(value.as_str())),
        }
    }
}

// ============================================================================
// Configuration Tests
// ============================================================================

proptest! {
    /// Validation never fails and never yields a zero limit
    #[test]
    fn test_settings_always_yield_usable_config(
        max_bytes in any::<i64>(),
        backup_count in any::<i64>(),
        level in "[A-Za-z]{0,10}",
    ) {
        let settings = LoggingSettings {
            level,
            max_bytes,
            backup_count,
            ..LoggingSettings::default()
        };
        let (config, _errors) = LoggerConfig::from_settings(&settings);

        prop_assert!(config.max_bytes > 0);
        prop_assert!(config.backup_count > 0);
    }
}
