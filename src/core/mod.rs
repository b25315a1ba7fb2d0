//! Core logger types and traits

pub mod appender;
pub mod caller;
pub mod color;
pub mod config;
pub mod date_pattern;
pub mod error;
pub mod log_level;
pub mod logger;
pub mod pattern;
pub mod serializer;
pub mod timestamp;
pub mod value;

pub use appender::Appender;
pub use caller::{
    BacktraceCallerResolver, CallerMeta, CallerResolver, NoopCallerResolver, SourceLocation,
    TrackedCallerResolver,
};
pub use color::Color;
pub use config::{ConfigLayer, ConfigWarning, LoggerConfig};
pub use date_pattern::DatePattern;
pub use error::{LoggerError, Result};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder};
pub use pattern::PatternTokens;
pub use timestamp::{Clock, ManualClock, SystemClock, TimeZoneSetting};
pub use value::{ErrorValue, LogValue, Payload};
