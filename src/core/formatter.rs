//! Record formatter: raw event to structured JSON record
//!
//! Every record carries the fields in [`GUARANTEED_FIELDS`] plus `message`.
//! `process` and `thread` appear only when known. Caller-supplied extras are
//! merged last and never replace a field the formatter already set.

use super::log_record::{LogRecord, UNKNOWN_FUNCTION};
use super::timestamp::TimestampFormat;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Fields present in every emitted record
pub const GUARANTEED_FIELDS: [&str; 6] = ["timestamp", "level", "logger", "module", "function", "line"];

/// Structured form of one record, as written to the sinks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuredRecord {
    fields: Map<String, Value>,
}

impl StructuredRecord {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// Serialize to a single-line JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.fields)
    }

    /// Parse a line previously written by a sink
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl fmt::Display for StructuredRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json() {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(fmt::Error),
        }
    }
}

/// Shared formatter held by every sink
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFormatter {
    timestamp_format: TimestampFormat,
}

impl RecordFormatter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    pub fn timestamp_format(&self) -> &TimestampFormat {
        &self.timestamp_format
    }

    /// Wrap this formatter in an Arc for sharing across sinks
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Build the structured record; never fails
    pub fn format(&self, record: &LogRecord) -> StructuredRecord {
        let mut fields = Map::new();

        let timestamp = record.timestamp.unwrap_or_else(Utc::now);
        fields.insert(
            "timestamp".to_string(),
            self.timestamp_format.to_json_value(&timestamp),
        );
        fields.insert("level".to_string(), Value::String(record.level.to_str().to_string()));
        fields.insert("logger".to_string(), Value::String(record.logger.clone()));
        fields.insert("module".to_string(), Value::String(non_empty(&record.module)));
        fields.insert("function".to_string(), Value::String(non_empty(&record.function)));
        fields.insert("line".to_string(), Value::Number(record.line.into()));
        fields.insert("message".to_string(), Value::String(record.message.clone()));

        if let Some(process) = record.process {
            fields.insert("process".to_string(), Value::Number(process.into()));
        }
        if let Some(thread) = record.thread {
            fields.insert("thread".to_string(), Value::Number(thread.into()));
        }

        for (key, value) in record.fields.fields() {
            fields
                .entry(key.clone())
                .or_insert_with(|| value.to_json_value());
        }

        StructuredRecord { fields }
    }

    /// Format straight to the line written by the sinks
    pub fn format_line(&self, record: &LogRecord) -> String {
        self.format(record).to_string()
    }
}

fn non_empty(value: &str) -> String {
    if value.is_empty() {
        UNKNOWN_FUNCTION.to_string()
    } else {
        value.to_string()
    }
}
