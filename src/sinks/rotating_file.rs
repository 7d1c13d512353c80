//! Size-rotated file sink
//!
//! Backups follow the `<path>.1`, `<path>.2`, ... convention: `.1` is the
//! most recent, and the file beyond the configured backup count is deleted
//! on each rotation. Rotation happens inside the write path, under the same
//! lock as the write itself.

use crate::core::{LogRecord, LoggerError, RecordFormatter, Result, Sink};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Default maximum file size before rotation (10 MiB)
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Default number of rotated files kept
pub const DEFAULT_BACKUP_COUNT: usize = 5;

/// When to rotate and how many backups to keep
///
/// # Examples
///
/// ```
/// use mcp_server_logging::sinks::RotationPolicy;
///
/// let policy = RotationPolicy::new()
///     .with_max_size(50 * 1024 * 1024)
///     .with_max_backups(7);
/// assert_eq!(policy.backup_count, 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Rotate before a write that would push the file past this size
    pub max_bytes: u64,
    /// Maximum number of rotated files to keep; 0 truncates in place
    pub backup_count: usize,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            backup_count: DEFAULT_BACKUP_COUNT,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.backup_count = count;
        self
    }
}

struct FileState {
    writer: Option<BufWriter<File>>,
    current_size: u64,
}

/// Rotating file sink
///
/// # Examples
///
/// ```no_run
/// use mcp_server_logging::core::RecordFormatter;
/// use mcp_server_logging::sinks::{RotatingFileSink, RotationPolicy};
///
/// let sink = RotatingFileSink::with_policy(
///     "logs/mcp_server.log",
///     RotationPolicy::new().with_max_backups(3),
///     RecordFormatter::new().shared(),
/// )
/// .unwrap();
/// ```
pub struct RotatingFileSink {
    base_path: PathBuf,
    policy: RotationPolicy,
    formatter: Arc<RecordFormatter>,
    state: Mutex<FileState>,
    rotations: AtomicU64,
}

impl RotatingFileSink {
    /// Create a sink with the default policy
    ///
    /// # Errors
    ///
    /// Returns `SinkInit` if the directory or file cannot be created
    pub fn new<P: AsRef<Path>>(path: P, formatter: Arc<RecordFormatter>) -> Result<Self> {
        Self::with_policy(path, RotationPolicy::default(), formatter)
    }

    /// Create a sink with a custom policy
    ///
    /// Missing parent directories are created. An existing file is appended
    /// to and its current size counts towards the limit.
    ///
    /// # Errors
    ///
    /// Returns `SinkInit` if the directory or file cannot be created
    pub fn with_policy<P: AsRef<Path>>(
        path: P,
        policy: RotationPolicy,
        formatter: Arc<RecordFormatter>,
    ) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        if let Some(parent) = base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::sink_init(
                    "rotating_file",
                    &base_path,
                    format!("failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, current_size) = open_append(&base_path)
            .map_err(|e| LoggerError::sink_init("rotating_file", &base_path, "failed to open", e))?;

        Ok(Self {
            base_path,
            policy,
            formatter,
            state: Mutex::new(FileState {
                writer: Some(BufWriter::new(file)),
                current_size,
            }),
            rotations: AtomicU64::new(0),
        })
    }

    pub fn path(&self) -> &Path {
        &self.base_path
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Number of rotations performed by this sink
    pub fn rotation_count(&self) -> u64 {
        self.rotations.load(Ordering::Relaxed)
    }

    /// Bytes counted toward the size limit since the active file was opened
    /// or last rotated
    pub fn current_size(&self) -> u64 {
        self.state.lock().current_size
    }

    /// Get backup file path for given index
    pub fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.base_path.as_os_str().to_owned();
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    /// An empty file never rotates, so an oversized record still lands somewhere
    fn should_rotate(&self, current_size: u64, pending: u64) -> bool {
        current_size > 0 && current_size.saturating_add(pending) > self.policy.max_bytes
    }

    fn rotate(&self, state: &mut FileState) -> Result<()> {
        if let Some(mut writer) = state.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::sink_write(self.name(), "failed to flush before rotation", e)
            })?;
            // Writer is dropped here, releasing file handle
        }

        if self.policy.backup_count == 0 {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&self.base_path)
                .map_err(|e| LoggerError::sink_write(self.name(), "failed to truncate log file", e))?;
            state.writer = Some(BufWriter::new(file));
            state.current_size = 0;
            self.rotations.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }

        let oldest = self.backup_path(self.policy.backup_count);
        if oldest.exists() {
            if let Err(e) = fs::remove_file(&oldest) {
                eprintln!(
                    "[LOGGER WARNING] Failed to remove oldest backup {}: {}",
                    oldest.display(),
                    e
                );
            }
        }

        for i in (1..self.policy.backup_count).rev() {
            let old_path = self.backup_path(i);
            if old_path.exists() {
                fs::rename(&old_path, self.backup_path(i + 1)).map_err(|e| {
                    LoggerError::sink_write(self.name(), "failed to shift backup files", e)
                })?;
            }
        }

        if self.base_path.exists() {
            fs::rename(&self.base_path, self.backup_path(1)).map_err(|e| {
                LoggerError::sink_write(self.name(), "failed to rotate current log file", e)
            })?;
        }

        self.reopen(state)?;
        self.rotations.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn reopen(&self, state: &mut FileState) -> Result<()> {
        if let Some(parent) = self.base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| LoggerError::sink_write(self.name(), "failed to recreate directory", e))?;
        }
        let (file, size) = open_append(&self.base_path)
            .map_err(|e| LoggerError::sink_write(self.name(), "failed to open log file", e))?;
        state.writer = Some(BufWriter::new(file));
        state.current_size = size;
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<(File, u64)> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let size = file.metadata()?.len();
    Ok((file, size))
}

impl Sink for RotatingFileSink {
    fn emit(&self, record: &LogRecord) -> Result<()> {
        let mut line = self.formatter.format_line(record);
        line.push('\n');
        let pending = line.len() as u64;

        let mut state = self.state.lock();
        if self.should_rotate(state.current_size, pending) {
            if let Err(e) = self.rotate(&mut state) {
                eprintln!(
                    "[LOGGER WARNING] Rotation of {} failed, continuing in the active file: {}",
                    self.base_path.display(),
                    e
                );
                self.reopen(&mut state)?;
                // Retrying on every record would evict one backup per attempt;
                // wait for another full file instead
                state.current_size = 0;
            }
        }
        if state.writer.is_none() {
            // A previous rotation failed half way
            self.reopen(&mut state)?;
        }

        let name = self.name();
        let writer = state.writer.as_mut().ok_or_else(|| {
            LoggerError::sink_write(name, "file writer not initialized", io::ErrorKind::NotFound.into())
        })?;
        writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|e| LoggerError::sink_write(name, "failed to write record", e))?;
        state.current_size += pending;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        if let Some(ref mut writer) = self.state.lock().writer {
            writer
                .flush()
                .map_err(|e| LoggerError::sink_write(self.name(), "failed to flush", e))?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "rotating_file"
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = Sink::flush(self);
    }
}
