//! Main logger implementation
//!
//! The logger owns the resolved configuration, an optional console sink and
//! an optional [`RotatingFileWriter`]. Every call is filtered by level,
//! stamped with caller metadata, rendered through the configured pattern for
//! the console, and serialized as a JSON record for the file.

use super::{
    appender::Appender,
    caller::{self, CallerResolver, TrackedCallerResolver},
    config::{ConfigLayer, ConfigWarning, LoggerConfig, DEFAULT_CONFIG_FILE},
    error::{LoggerError, Result},
    log_level::LogLevel,
    pattern,
    serializer,
    timestamp::{Clock, SystemClock},
    value::{LogValue, Payload},
};
use crate::appenders::{ConsoleAppender, FileWriterOptions, RotatingFileWriter};
use parking_lot::Mutex;
use serde_json::json;
use std::fs::{self, OpenOptions};
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct Logger {
    config: LoggerConfig,
    warnings: Vec<ConfigWarning>,
    console: Option<Mutex<Box<dyn Appender>>>,
    writer: Option<Arc<RotatingFileWriter>>,
    resolver: Box<dyn CallerResolver>,
    clock: Arc<dyn Clock>,
}

impl Logger {
    /// Logger configured from the defaults, `logger.json` in the working
    /// directory, and `LOG_*` environment variables, in that order.
    ///
    /// # Errors
    ///
    /// Returns error if file output is enabled and the log directory cannot
    /// be created or written
    pub fn new() -> Result<Self> {
        Self::builder()
            .config_file(DEFAULT_CONFIG_FILE)
            .from_env()
            .build()
    }

    /// Logger using an already-resolved configuration
    pub fn with_config(config: LoggerConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```no_run
    /// use jsonl_logger::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .config_file("logger.json")
    ///     .from_env()
    ///     .build()
    ///     .unwrap();
    /// logger.info("service started");
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Problems found while resolving the configuration
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    /// Path of the file currently open for writing, if any
    pub fn current_file(&self) -> Option<PathBuf> {
        self.writer.as_ref().and_then(|w| w.current_path())
    }

    /// Whether a call at `level` reaches any sink
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.config.should_log(level)
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, payload: impl Into<Payload>) {
        if !self.is_enabled(level) {
            return;
        }
        let site = Location::caller();
        self.dispatch_level(level, &payload.into(), site);
    }

    #[inline]
    #[track_caller]
    pub fn trace(&self, payload: impl Into<Payload>) {
        self.log(LogLevel::Trace, payload);
    }

    #[inline]
    #[track_caller]
    pub fn debug(&self, payload: impl Into<Payload>) {
        self.log(LogLevel::Debug, payload);
    }

    #[inline]
    #[track_caller]
    pub fn info(&self, payload: impl Into<Payload>) {
        self.log(LogLevel::Info, payload);
    }

    #[inline]
    #[track_caller]
    pub fn warn(&self, payload: impl Into<Payload>) {
        self.log(LogLevel::Warn, payload);
    }

    #[inline]
    #[track_caller]
    pub fn error(&self, payload: impl Into<Payload>) {
        self.log(LogLevel::Error, payload);
    }

    #[inline]
    #[track_caller]
    pub fn fatal(&self, payload: impl Into<Payload>) {
        self.log(LogLevel::Fatal, payload);
    }

    /// Free-form entry under `tag`, outside the level system. Only the
    /// silent flag suppresses it.
    #[track_caller]
    pub fn custom(&self, tag: &str, context: &str, data: impl Into<LogValue>) {
        if self.config.silent {
            return;
        }
        let site = Location::caller();
        let data = data.into();
        let meta = caller::resolve(&self.config, self.resolver.as_ref(), site, &self.clock.now());

        if let Some(console) = &self.console {
            let text = serializer::serialize_for_display(&data, &self.config);
            let line = pattern::render_tagged_line(&self.config, tag, context, &meta, text);
            if let Err(e) = console.lock().append(None, &line) {
                eprintln!("[LOGGER ERROR] Console appender failed: {}", e);
            }
        }

        if let Some(writer) = &self.writer {
            let record = json!({
                "context": context,
                "data": serializer::serialize_for_file(&data),
            });
            report_write(writer.write(tag, &record, &meta));
        }
    }

    fn dispatch_level(&self, level: LogLevel, payload: &Payload, site: &'static Location<'static>) {
        let meta = caller::resolve(&self.config, self.resolver.as_ref(), site, &self.clock.now());

        if let Some(console) = &self.console {
            let text = serializer::format_payload(payload, &self.config);
            let line = pattern::render_level_line(&self.config, level, &meta, text);
            if let Err(e) = console.lock().append(Some(level), &line) {
                eprintln!("[LOGGER ERROR] Console appender failed: {}", e);
            }
        }

        if let Some(writer) = &self.writer {
            let data = serializer::serialize_payload_for_file(payload);
            report_write(writer.write(level.name(), &data, &meta));
        }
    }

    /// Flush the console and close the current log file. Safe to call
    /// repeatedly; the next write reopens the file in append mode.
    pub fn flush(&self) -> Result<()> {
        if let Some(console) = &self.console {
            console.lock().flush()?;
        }
        match &self.writer {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }

    /// [`flush`](Self::flush) on tokio's blocking pool
    #[cfg(feature = "async-flush")]
    pub async fn flush_async(&self) -> Result<()> {
        if let Some(console) = &self.console {
            console.lock().flush()?;
        }
        let Some(writer) = self.writer.clone() else {
            return Ok(());
        };
        tokio::task::spawn_blocking(move || writer.flush())
            .await
            .map_err(|e| LoggerError::other(format!("Flush task failed: {}", e)))?
    }
}

/// Write failures that reach here have a console to be surfaced on
fn report_write(result: Result<()>) {
    if let Err(e) = result {
        eprintln!("[LOGGER ERROR] File write failed: {}", e);
    }
}

/// Create the directory if missing and check that it can take log files
fn validate_directory(path: &Path) -> Result<()> {
    let display = path.display().to_string();
    fs::create_dir_all(path)
        .map_err(|e| LoggerError::directory(&display, format!("cannot create: {}", e)))?;

    let metadata = fs::metadata(path)
        .map_err(|e| LoggerError::directory(&display, format!("cannot access: {}", e)))?;
    if !metadata.is_dir() {
        return Err(LoggerError::directory(&display, "not a directory"));
    }

    // Mode bits do not tell whether this process may write; try it
    let check_file = path.join(format!(
        ".write-check-{}-{}",
        std::process::id(),
        caller::correlation_id()
    ));
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&check_file)
        .map_err(|e| LoggerError::directory(&display, format!("not writable: {}", e)))?;
    fs::remove_file(&check_file)
        .map_err(|e| LoggerError::directory(&display, format!("not writable: {}", e)))?;
    Ok(())
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// Configuration layers are applied over the compiled defaults in the order
/// they are added, each overriding the previous key by key.
///
/// # Example
/// ```
/// use jsonl_logger::prelude::*;
///
/// let dir = tempfile::tempdir().unwrap();
/// let logger = Logger::builder()
///     .override_layer(ConfigLayer {
///         directory: Some(dir.path().display().to_string()),
///         level: Some("debug".into()),
///         console: Some(false),
///         ..ConfigLayer::default()
///     })
///     .build()
///     .unwrap();
/// assert!(logger.is_enabled(LogLevel::Debug));
/// ```
pub struct LoggerBuilder {
    config: Option<LoggerConfig>,
    layers: Vec<ConfigLayer>,
    warnings: Vec<ConfigWarning>,
    clock: Option<Arc<dyn Clock>>,
    resolver: Option<Box<dyn CallerResolver>>,
    console: Option<Box<dyn Appender>>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: None,
            layers: Vec::new(),
            warnings: Vec::new(),
            clock: None,
            resolver: None,
            console: None,
        }
    }

    /// Use a resolved configuration as is; layers are ignored
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Add the layer read from a JSON file. A missing file adds nothing.
    #[must_use = "builder methods return a new value"]
    pub fn config_file(mut self, path: impl AsRef<Path>) -> Self {
        let (layer, warnings) = ConfigLayer::from_file(path);
        self.layers.push(layer);
        self.warnings.extend(warnings);
        self
    }

    /// Add the layer read from `LOG_*` environment variables
    #[must_use = "builder methods return a new value"]
    pub fn from_env(mut self) -> Self {
        let (layer, warnings) = ConfigLayer::from_env();
        self.layers.push(layer);
        self.warnings.extend(warnings);
        self
    }

    /// Add an explicit layer
    #[must_use = "builder methods return a new value"]
    pub fn override_layer(mut self, layer: ConfigLayer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Source of "now" for timestamps and rotation keys
    #[must_use = "builder methods return a new value"]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn caller_resolver<R: CallerResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Replace the stdout/stderr console sink
    #[must_use = "builder methods return a new value"]
    pub fn console_appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.console = Some(Box::new(appender));
        self
    }

    /// Build the Logger
    ///
    /// Configuration problems never fail the build; they are reported on
    /// stderr and kept in [`Logger::warnings`].
    ///
    /// # Errors
    ///
    /// Returns error if file output is enabled and the directory is unusable
    pub fn build(self) -> Result<Logger> {
        let mut warnings = self.warnings;
        let config = match self.config {
            Some(config) => config,
            None => {
                let merged = self
                    .layers
                    .into_iter()
                    .fold(ConfigLayer::defaults(), ConfigLayer::merge);
                let (config, resolved) = merged.resolve();
                warnings.extend(resolved);
                config
            }
        };

        for warning in &warnings {
            eprintln!("[LOGGER WARNING] {}", warning);
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let writer = if config.disable_file {
            None
        } else {
            validate_directory(&config.directory)?;
            let options = FileWriterOptions::from_config(&config);
            Some(Arc::new(RotatingFileWriter::with_clock(
                options,
                Arc::clone(&clock),
            )?))
        };

        let console = if config.console {
            let appender = self
                .console
                .unwrap_or_else(|| Box::new(ConsoleAppender::new()));
            Some(Mutex::new(appender))
        } else {
            None
        };

        Ok(Logger {
            config,
            warnings,
            console,
            writer,
            resolver: self
                .resolver
                .unwrap_or_else(|| Box::new(TrackedCallerResolver)),
            clock,
        })
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
