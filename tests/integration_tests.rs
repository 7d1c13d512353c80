//! Integration tests for the logging subsystem
//!
//! These tests verify:
//! - Threshold filtering per sink
//! - Re-initialization replaces the sink set
//! - File rotation and backup eviction
//! - Third-party floors
//! - Structured record shape
//! - Sink setup failures

use mcp_server_logging::config::{LoggerConfig, LoggingSettings};
use mcp_server_logging::core::{
    LogContext, LogLevel, LoggerError, LoggerRegistry, RecordFormatter, Sink, StructuredRecord,
    TimestampFormat, GUARANTEED_FIELDS,
};
use mcp_server_logging::sinks::{ConsoleSink, RotatingFileSink, RotationPolicy};
use mcp_server_logging::{info, warning};
use serde_json::json;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().expect("buffer lock").clone();
        String::from_utf8(bytes)
            .expect("utf8 output")
            .lines()
            .map(str::to_string)
            .collect()
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

fn file_only_config(path: &Path) -> LoggerConfig {
    LoggerConfig::new()
        .with_console(false)
        .with_file_path(path)
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

fn parse(line: &str) -> StructuredRecord {
    StructuredRecord::from_json(line).expect("record is valid JSON")
}

#[test]
fn test_threshold_applies_to_every_sink() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("server.log");
    let console = SharedBuffer::default();

    let formatter = RecordFormatter::new().shared();
    let file_sink = RotatingFileSink::new(&log_file, Arc::clone(&formatter))
        .expect("Failed to create file sink");
    let console_sink = ConsoleSink::with_writer(Arc::clone(&formatter), console.clone());

    let registry = LoggerRegistry::default();
    let root = registry.initialize_with_sinks(
        LogLevel::Warning,
        formatter,
        vec![Arc::new(console_sink), Arc::new(file_sink)],
    );

    root.debug("hidden");
    root.info("hidden");
    root.warning("visible");
    registry.flush().expect("Failed to flush");

    assert_eq!(console.lines().len(), 1);
    assert_eq!(read_lines(&log_file).len(), 1);
    assert_eq!(parse(&console.lines()[0]).get("level"), Some(&json!("WARNING")));
}

#[test]
fn test_initialize_creates_missing_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("nested").join("logs").join("server.log");

    let registry = LoggerRegistry::default();
    let root = registry
        .initialize(&file_only_config(&log_file))
        .expect("Failed to initialize");
    root.info("ready");

    assert!(log_file.exists());
    assert_eq!(read_lines(&log_file).len(), 1);
    assert_eq!(registry.sink_names(), ["rotating_file"]);
}

#[test]
fn test_reinitialization_does_not_duplicate_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("server.log");
    let config = file_only_config(&log_file);

    let registry = LoggerRegistry::default();
    for _ in 0..3 {
        registry.initialize(&config).expect("Failed to initialize");
    }
    let db = registry.get_logger(Some("db"));
    for i in 0..10 {
        db.info(format!("event {}", i));
    }
    registry.flush().expect("Failed to flush");

    assert_eq!(registry.sink_count(), 1);
    assert_eq!(read_lines(&log_file).len(), 10);
}

#[test]
fn test_failed_reinitialization_keeps_previous_sinks() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("server.log");
    let blocker = temp_dir.path().join("not_a_dir");
    fs::write(&blocker, b"file").expect("Failed to create blocker file");

    let registry = LoggerRegistry::default();
    registry
        .initialize(&file_only_config(&log_file).with_level(LogLevel::Info))
        .expect("Failed to initialize");

    let result = registry.initialize(
        &file_only_config(&blocker.join("server.log")).with_level(LogLevel::Critical),
    );
    match result {
        Err(err @ LoggerError::SinkInit { .. }) => assert!(err.is_fatal()),
        other => panic!("expected SinkInit, got {:?}", other.map(|l| l.name().to_string())),
    }

    registry.root().info("still logged");
    assert_eq!(registry.level(), LogLevel::Info);
    assert_eq!(read_lines(&log_file).len(), 1);
}

#[test]
fn test_rotation_moves_full_file_to_backup() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("server.log");
    let max_bytes = 1024;

    let sink = Arc::new(
        RotatingFileSink::with_policy(
            &log_file,
            RotationPolicy::new().with_max_size(max_bytes).with_max_backups(3),
            RecordFormatter::new().shared(),
        )
        .expect("Failed to create file sink"),
    );
    let registry = LoggerRegistry::default();
    let root = registry.initialize_with_sinks(
        LogLevel::Debug,
        RecordFormatter::new().shared(),
        vec![sink.clone()],
    );

    let mut written = 0;
    while sink.rotation_count() == 0 {
        root.info("x".repeat(100));
        written += 1;
        assert!(written < 100, "rotation never happened");
    }

    assert_eq!(sink.rotation_count(), 1);
    assert!(sink.backup_path(1).exists());
    assert!(!sink.backup_path(2).exists());
    assert!(fs::metadata(&log_file).expect("active file").len() < max_bytes);
    assert!(fs::metadata(sink.backup_path(1)).expect("backup").len() <= max_bytes);

    let total = read_lines(&log_file).len() + read_lines(&sink.backup_path(1)).len();
    assert_eq!(total, written);
}

#[test]
fn test_oldest_backup_removed_after_backup_count_rotations() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("server.log");

    let registry = LoggerRegistry::default();
    let root = registry
        .initialize(&file_only_config(&log_file).with_max_bytes(200).with_backup_count(2))
        .expect("Failed to initialize");

    // Each record is larger than max_bytes, so every non-first record rotates
    for i in 0..4 {
        root.info(format!("generation-{} {}", i, "y".repeat(200)));
    }
    registry.flush().expect("Failed to flush");

    let backup = |i: usize| {
        let mut name = log_file.as_os_str().to_owned();
        name.push(format!(".{}", i));
        std::path::PathBuf::from(name)
    };
    assert!(read_lines(&log_file)[0].contains("generation-3"));
    assert!(read_lines(&backup(1))[0].contains("generation-2"));
    assert!(read_lines(&backup(2))[0].contains("generation-1"));
    assert!(!backup(3).exists());

    let all: String = [log_file.clone(), backup(1), backup(2)]
        .iter()
        .map(|p| fs::read_to_string(p).unwrap_or_default())
        .collect();
    assert!(!all.contains("generation-0"));
}

#[test]
fn test_unusable_limits_fall_back_to_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("server.log");

    let registry = LoggerRegistry::default();
    let root = registry
        .initialize(
            &file_only_config(&log_file)
                .with_max_bytes(0)
                .with_backup_count(0)
                .with_timestamp_format(TimestampFormat::Custom(String::new())),
        )
        .expect("Failed to initialize");
    for i in 0..10 {
        root.info(format!("event {}", i));
    }
    registry.flush().expect("Failed to flush");

    let lines = read_lines(&log_file);
    // Three fallback warnings, then every event
    assert_eq!(lines.len(), 13);
    let warnings: Vec<_> = lines[..3].iter().map(|l| parse(l)).collect();
    for warning in &warnings {
        assert_eq!(warning.get("level"), Some(&json!("WARNING")));
    }
    let settings: Vec<_> = warnings.iter().filter_map(|w| w.get("setting").cloned()).collect();
    assert_eq!(settings, [json!("max_bytes"), json!("backup_count"), json!("date_format")]);

    for line in &lines {
        let timestamp = parse(line).get("timestamp").cloned().expect("timestamp");
        assert_ne!(timestamp, json!(""));
    }
}

#[test]
fn test_suppress_third_party_only_affects_named_identity() {
    let console = SharedBuffer::default();
    let formatter = RecordFormatter::new().shared();
    let registry = LoggerRegistry::default();
    registry.initialize_with_sinks(
        LogLevel::Info,
        Arc::clone(&formatter),
        vec![Arc::new(ConsoleSink::with_writer(formatter, console.clone()))],
    );

    registry.suppress_third_party(LogLevel::Error, ["libA", "never_used"]);
    let lib_a = registry.external("libA");
    let lib_b = registry.external("libB");

    lib_a.warning("quiet");
    assert!(console.lines().is_empty());

    lib_a.error("loud");
    lib_b.warning("other library");
    registry.root().info("own logger");

    let loggers: Vec<_> = console
        .lines()
        .iter()
        .map(|line| parse(line).get("logger").cloned())
        .collect();
    assert_eq!(loggers, [Some(json!("libA")), Some(json!("libB")), Some(json!("mariadb_mcp"))]);
    assert_eq!(registry.level(), LogLevel::Info);
    assert_eq!(registry.sink_count(), 1);
}

#[test]
fn test_initialize_quiets_default_third_party_set() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("server.log");

    let registry = LoggerRegistry::default();
    registry
        .initialize(
            &file_only_config(&log_file)
                .with_level(LogLevel::Debug)
                .with_third_party_level(LogLevel::Warning),
        )
        .expect("Failed to initialize");

    registry.external("uvicorn.access").info("GET /health 200");
    registry.external("httpx").warning("retrying");
    registry.root().debug("own debug");

    let lines = read_lines(&log_file);
    assert_eq!(lines.len(), 2);
    assert_eq!(parse(&lines[0]).get("logger"), Some(&json!("httpx")));
}

#[test]
fn test_record_shape_and_extra_precedence() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("server.log");

    let registry = LoggerRegistry::default();
    registry
        .initialize(&file_only_config(&log_file))
        .expect("Failed to initialize");
    let tools = registry.get_logger(Some("tools"));

    let fields = LogContext::new()
        .with_field("tool", "list_databases")
        .with_field("elapsed_ms", 12)
        .with_field("level", "spoofed");
    tools.info_with("tool finished\ninjected", fields);
    warning!(tools, { "table" => "orders" }, "slow query on {}", "orders");

    let lines = read_lines(&log_file);
    assert_eq!(lines.len(), 2);

    let first = parse(&lines[0]);
    for field in GUARANTEED_FIELDS {
        let value = first.get(field).expect("guaranteed field present");
        assert!(!value.is_null() && value.as_str() != Some(""), "{} is empty", field);
    }
    assert_eq!(first.get("level"), Some(&json!("INFO")));
    assert_eq!(first.get("logger"), Some(&json!("mariadb_mcp.tools")));
    assert_eq!(first.get("module"), Some(&json!("integration_tests")));
    assert_eq!(first.get("tool"), Some(&json!("list_databases")));
    assert_eq!(first.get("elapsed_ms"), Some(&json!(12)));
    assert_eq!(first.get("message"), Some(&json!("tool finished\\ninjected")));

    let second = parse(&lines[1]);
    assert_eq!(second.get("function"), Some(&json!("test_record_shape_and_extra_precedence")));
    assert_eq!(second.get("table"), Some(&json!("orders")));
}

#[test]
fn test_shutdown_stops_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("server.log");

    let registry = LoggerRegistry::default();
    let root = registry
        .initialize(&file_only_config(&log_file))
        .expect("Failed to initialize");
    info!(root, "before shutdown");
    registry.shutdown();
    info!(root, "after shutdown");

    assert_eq!(read_lines(&log_file).len(), 1);
    assert_eq!(registry.sink_count(), 0);
}

#[test]
fn test_settings_validation_falls_back_to_defaults() {
    let settings = LoggingSettings {
        level: "LOUD".to_string(),
        max_bytes: -1,
        ..LoggingSettings::default()
    };
    let (config, errors) = LoggerConfig::from_settings(&settings);

    assert_eq!(config.level, LogLevel::Info);
    assert_eq!(config.max_bytes, 10 * 1024 * 1024);
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| !e.is_fatal()));
}

#[test]
fn test_custom_sink_receives_records() {
    struct CountingSink(std::sync::atomic::AtomicUsize);

    impl Sink for CountingSink {
        fn emit(&self, _record: &mcp_server_logging::LogRecord) -> mcp_server_logging::Result<()> {
            self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            Ok(())
        }

        fn flush(&self) -> mcp_server_logging::Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    let registry = LoggerRegistry::default();
    let sink = Arc::new(CountingSink(Default::default()));
    registry.attach_sink(sink.clone());
    registry.root().info("one");
    registry.root().debug("filtered at default INFO");

    assert_eq!(sink.0.load(std::sync::atomic::Ordering::Relaxed), 1);
}

#[test]
fn test_global_registry() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("global.log");

    let root = mcp_server_logging::init(&file_only_config(&log_file)).expect("Failed to init");
    assert_eq!(root.name(), "mariadb_mcp");

    let db = mcp_server_logging::get_logger(Some("db"));
    mcp_server_logging::suppress_third_party(LogLevel::Critical, ["asyncmy"]);
    db.info("global child");
    mcp_server_logging::global().external("asyncmy").error("suppressed");

    mcp_server_logging::shutdown();
    db.info("after shutdown");

    let lines = read_lines(&log_file);
    assert_eq!(lines.len(), 1);
    assert_eq!(parse(&lines[0]).get("logger"), Some(&json!("mariadb_mcp.db")));
}
