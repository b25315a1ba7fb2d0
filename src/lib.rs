//! # JSONL Logger
//!
//! A structured logging library that renders leveled calls through a
//! configurable pattern for the console and appends them as newline-delimited
//! JSON records to date-rotated files.
//!
//! ## Features
//!
//! - **Pattern Lines**: `{placeholder}` and `{color:NAME}` templates per level or tag
//! - **Rotating Files**: one `.jsonl` file per date key with retention pruning
//! - **Caller Metadata**: call-site file, line and column plus a correlation id
//! - **Cycle Safe**: self-referencing payloads serialize with a marker instead of failing
//! - **Layered Config**: defaults, `logger.json`, `LOG_*` variables and overrides
//!
//! ## Example
//!
//! ```no_run
//! use jsonl_logger::prelude::*;
//!
//! let logger = Logger::new().unwrap();
//! logger.info("service started");
//! logger.custom("HTTP", "GET /health", 200);
//! logger.flush().unwrap();
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, FileWriterOptions, RotatingFileWriter};
    pub use crate::core::{
        Appender, CallerResolver, Color, ConfigLayer, ErrorValue, LogLevel, LogValue, Logger,
        LoggerBuilder, LoggerConfig, LoggerError, Payload, Result,
    };
}

pub use appenders::{ConsoleAppender, FileWriterOptions, RotatingFileWriter};
pub use core::{
    Appender, BacktraceCallerResolver, CallerMeta, CallerResolver, Clock, Color, ConfigLayer,
    ConfigWarning, DatePattern, ErrorValue, LogLevel, LogValue, Logger, LoggerBuilder,
    LoggerConfig, LoggerError, ManualClock, NoopCallerResolver, Payload, Result, SourceLocation,
    SystemClock, TimeZoneSetting, TrackedCallerResolver,
};
