//! Console sink implementation

use crate::core::{LogRecord, LoggerError, RecordFormatter, Result, Sink};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// Writes one JSON record per line to standard output
pub struct ConsoleSink {
    formatter: Arc<RecordFormatter>,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    pub fn new(formatter: Arc<RecordFormatter>) -> Self {
        Self::with_writer(formatter, io::stdout())
    }

    /// Write to an arbitrary stream instead of stdout
    ///
    /// # Example
    ///
    /// ```
    /// use mcp_server_logging::core::RecordFormatter;
    /// use mcp_server_logging::sinks::ConsoleSink;
    ///
    /// let sink = ConsoleSink::with_writer(RecordFormatter::new().shared(), std::io::stderr());
    /// ```
    pub fn with_writer<W: Write + Send + 'static>(formatter: Arc<RecordFormatter>, writer: W) -> Self {
        Self {
            formatter,
            writer: Mutex::new(Box::new(writer)),
        }
    }
}

impl Sink for ConsoleSink {
    fn emit(&self, record: &LogRecord) -> Result<()> {
        let mut line = self.formatter.format_line(record);
        line.push('\n');

        // One write per record under the lock keeps lines whole
        let mut writer = self.writer.lock();
        writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|e| LoggerError::sink_write(self.name(), "failed to write record", e))
    }

    fn flush(&self) -> Result<()> {
        self.writer
            .lock()
            .flush()
            .map_err(|e| LoggerError::sink_write(self.name(), "failed to flush", e))
    }

    fn name(&self) -> &str {
        "console"
    }
}
