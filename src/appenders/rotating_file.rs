//! Rotating JSONL file writer
//!
//! In rotating mode the active file is `{formatted-date}.jsonl`, where the
//! date is "now" rendered with the configured file-name pattern and time zone.
//! The rendered date is the rotation key: before every write the key is
//! recomputed and, when it changed, the old handle is closed, a new one is
//! opened in append mode, and old files beyond the retention count are
//! pruned. Without rotation a single `log.jsonl` is used.
//!
//! Each record is one compact JSON object per line. The check-swap-prune-write
//! sequence runs under one lock, so concurrent writers never open duplicate
//! handles or race a close against a write.

use crate::core::caller::CallerMeta;
use crate::core::config::LoggerConfig;
use crate::core::date_pattern::DatePattern;
use crate::core::error::{LoggerError, Result};
use crate::core::timestamp::{epoch_millis, Clock, SystemClock, TimeZoneSetting};
use parking_lot::Mutex;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const LOG_EXTENSION: &str = "jsonl";
/// File used when rotation is disabled
pub const SINGLE_FILE_NAME: &str = "log.jsonl";

/// Writer settings, taken from [`LoggerConfig`] once at construction
///
/// # Examples
///
/// ```
/// use jsonl_logger::appenders::FileWriterOptions;
///
/// let options = FileWriterOptions::new("/var/log/my_app")
///     .with_max_files(Some(7))
///     .with_console(false);
/// assert_eq!(options.max_files, Some(7));
/// ```
#[derive(Debug, Clone)]
pub struct FileWriterOptions {
    pub directory: PathBuf,
    pub rotate: bool,
    /// Retention count; `None` keeps every file
    pub max_files: Option<i64>,
    pub file_name_format: DatePattern,
    pub timezone: TimeZoneSetting,
    /// Whether a console sink exists to surface write failures
    pub console: bool,
}

impl FileWriterOptions {
    /// Options with the configured defaults for everything but the directory
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        let defaults = LoggerConfig::default();
        Self {
            directory: directory.into(),
            ..Self::from_config(&defaults)
        }
    }

    pub fn from_config(config: &LoggerConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            rotate: config.rotate,
            max_files: config.max_files,
            file_name_format: config.file_name_format.clone(),
            timezone: config.timezone,
            console: config.console,
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_rotate(mut self, rotate: bool) -> Self {
        self.rotate = rotate;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_files(mut self, max_files: Option<i64>) -> Self {
        self.max_files = max_files;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_file_name_format(mut self, format: DatePattern) -> Self {
        self.file_name_format = format;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_timezone(mut self, timezone: TimeZoneSetting) -> Self {
        self.timezone = timezone;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }
}

enum Layout {
    /// Date-keyed files; `matcher` recognizes the files this writer produces
    Rotating { matcher: Regex },
    Single { path: PathBuf },
}

/// Open handle plus the path and key it was opened under
#[derive(Default)]
struct WriterState {
    stream: Option<BufWriter<File>>,
    path: Option<PathBuf>,
    key: Option<String>,
}

#[derive(Serialize)]
struct FileRecord<'a> {
    timestamp: i64,
    level: &'a str,
    id: &'a str,
    file: &'a str,
    line: u32,
    column: u32,
    data: &'a Value,
}

/// Appends JSON records to date-keyed files with retention pruning
///
/// # Examples
///
/// ```no_run
/// use jsonl_logger::appenders::{FileWriterOptions, RotatingFileWriter};
///
/// let writer = RotatingFileWriter::new(FileWriterOptions::new("logs")).unwrap();
/// // ... write records ...
/// writer.flush().unwrap();
/// ```
pub struct RotatingFileWriter {
    options: FileWriterOptions,
    layout: Layout,
    clock: Arc<dyn Clock>,
    state: Mutex<WriterState>,
}

impl RotatingFileWriter {
    /// Create a writer using the system clock. No file is opened until the
    /// first write.
    ///
    /// # Errors
    ///
    /// Returns error if the file-name pattern cannot be turned into a matcher
    pub fn new(options: FileWriterOptions) -> Result<Self> {
        Self::with_clock(options, Arc::new(SystemClock))
    }

    /// Create a writer reading "now" from `clock`
    pub fn with_clock(options: FileWriterOptions, clock: Arc<dyn Clock>) -> Result<Self> {
        let layout = if options.rotate {
            Layout::Rotating {
                matcher: options.file_name_format.file_matcher(LOG_EXTENSION)?,
            }
        } else {
            Layout::Single {
                path: options.directory.join(SINGLE_FILE_NAME),
            }
        };

        Ok(Self {
            options,
            layout,
            clock,
            state: Mutex::new(WriterState::default()),
        })
    }

    pub fn options(&self) -> &FileWriterOptions {
        &self.options
    }

    /// Path of the open handle, if any
    pub fn current_path(&self) -> Option<PathBuf> {
        let state = self.state.lock();
        state.stream.as_ref().and(state.path.clone())
    }

    /// Append one record. `level_or_tag` is a level name or a custom tag.
    ///
    /// # Errors
    ///
    /// I/O failures are returned only when a console sink exists; otherwise
    /// they are dropped. A retention count below one is always an error.
    pub fn write(&self, level_or_tag: &str, data: &Value, meta: &CallerMeta) -> Result<()> {
        match self.write_record(level_or_tag, data, meta) {
            Err(e) if e.is_io() && !self.options.console => Ok(()),
            other => other,
        }
    }

    fn write_record(&self, level_or_tag: &str, data: &Value, meta: &CallerMeta) -> Result<()> {
        let timestamp = epoch_millis(&meta.timestamp)
            .unwrap_or_else(|| self.clock.now().timestamp_millis());
        let record = FileRecord {
            timestamp,
            level: level_or_tag,
            id: &meta.id,
            file: &meta.file_name,
            line: meta.line,
            column: meta.column,
            data,
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let mut state = self.state.lock();
        if self.ensure_stream(&mut state)? {
            let active = state
                .path
                .as_deref()
                .and_then(Path::file_name)
                .and_then(|name| name.to_str());
            self.prune(active)?;
        }

        let path = state.path.clone().unwrap_or_default();
        let stream = state
            .stream
            .as_mut()
            .ok_or_else(|| LoggerError::file_writer(path.display().to_string(), "no open handle"))?;

        stream
            .write_all(line.as_bytes())
            .and_then(|()| stream.flush())
            .map_err(|e| {
                LoggerError::file_writer(
                    path.display().to_string(),
                    format!("Failed to write log record: {}", e),
                )
            })
    }

    /// Make sure the handle matches the current key. Returns `true` when a
    /// rotation happened in rotating mode.
    fn ensure_stream(&self, state: &mut WriterState) -> Result<bool> {
        match &self.layout {
            Layout::Single { path } => {
                if state.stream.is_none() {
                    state.stream = Some(open_append(path)?);
                    state.path = Some(path.clone());
                }
                Ok(false)
            }
            Layout::Rotating { .. } => {
                let key = self
                    .options
                    .timezone
                    .format(&self.clock.now(), &self.options.file_name_format);
                let path = self
                    .options
                    .directory
                    .join(format!("{}.{}", key, LOG_EXTENSION));

                let current = state.stream.is_some()
                    && state.key.as_deref() == Some(key.as_str())
                    && state.path.as_deref() == Some(path.as_path());
                if current {
                    return Ok(false);
                }

                // Close the previous handle; a failed flush must not block the swap
                if let Some(mut previous) = state.stream.take() {
                    if let Err(e) = previous.flush() {
                        eprintln!("[LOGGER WARNING] Failed to flush rotated log file: {}", e);
                    }
                }
                state.path = None;
                state.key = None;

                state.stream = Some(open_append(&path)?);
                state.path = Some(path);
                state.key = Some(key);
                Ok(true)
            }
        }
    }

    /// Delete the oldest rotation files beyond the retention count. The
    /// active file is never a candidate and always counts as kept.
    fn prune(&self, active: Option<&str>) -> Result<()> {
        let Layout::Rotating { matcher } = &self.layout else {
            return Ok(());
        };
        let Some(max_files) = self.options.max_files else {
            return Ok(());
        };
        if max_files < 1 {
            return Err(LoggerError::InvalidRetention { max_files });
        }

        let directory = &self.options.directory;
        let entries = fs::read_dir(directory).map_err(|e| {
            LoggerError::io_operation(
                "prune log files",
                format!("Failed to list '{}'", directory.display()),
                e,
            )
        })?;

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| matcher.is_match(name))
            .filter(|name| Some(name.as_str()) != active)
            .collect();
        names.sort();

        let mut keep = usize::try_from(max_files).unwrap_or(usize::MAX);
        if active.is_some() {
            keep = keep.saturating_sub(1);
        }
        let excess = names.len().saturating_sub(keep);
        for name in &names[..excess] {
            let stale = directory.join(name);
            if let Err(e) = fs::remove_file(&stale) {
                eprintln!(
                    "[LOGGER WARNING] Failed to remove old log file {}: {}",
                    stale.display(),
                    e
                );
            }
        }
        Ok(())
    }

    /// Flush, sync and close the current handle. Calling it with no open
    /// handle is a no-op; the next write reopens in append mode.
    ///
    /// # Errors
    ///
    /// Returns error if the buffered data cannot be written out
    pub fn flush(&self) -> Result<()> {
        let mut state = self.state.lock();
        let path = state.path.take().unwrap_or_default();
        state.key = None;

        let Some(stream) = state.stream.take() else {
            return Ok(());
        };

        let file = stream.into_inner().map_err(|e| {
            LoggerError::file_writer(
                path.display().to_string(),
                format!("Failed to flush: {}", e.error()),
            )
        })?;
        file.sync_all().map_err(|e| {
            LoggerError::io_operation(
                "close log file",
                format!("Failed to sync '{}'", path.display()),
                e,
            )
        })
    }
}

fn open_append(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            LoggerError::io_operation(
                "create log directory",
                format!("Failed to create directory '{}'", parent.display()),
                e,
            )
        })?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            LoggerError::file_writer(path.display().to_string(), format!("Failed to open: {}", e))
        })?;
    Ok(BufWriter::new(file))
}

impl Drop for RotatingFileWriter {
    fn drop(&mut self) {
        // Best effort; errors during drop are ignored
        let _ = self.flush();
    }
}
