//! Appender trait for rendered console lines

use super::{error::Result, log_level::LogLevel};

pub trait Appender: Send + Sync {
    /// `level` is `None` for tagged lines
    fn append(&mut self, level: Option<LogLevel>, line: &str) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
