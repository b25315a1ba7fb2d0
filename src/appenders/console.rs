//! Console appender implementation

use crate::core::{Appender, LogLevel, Result};
use std::io::Write;

/// Writes rendered lines to the process's standard streams
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleAppender;

impl ConsoleAppender {
    pub fn new() -> Self {
        Self
    }

    /// Whether lines at `level` go to stderr
    pub fn uses_stderr(level: Option<LogLevel>) -> bool {
        matches!(
            level,
            Some(LogLevel::Warn) | Some(LogLevel::Error) | Some(LogLevel::Fatal)
        )
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, level: Option<LogLevel>, line: &str) -> Result<()> {
        // Warn and above go to stderr, everything else including tagged lines to stdout
        if Self::uses_stderr(level) {
            writeln!(std::io::stderr().lock(), "{}", line)?;
        } else {
            writeln!(std::io::stdout().lock(), "{}", line)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_routing() {
        assert!(!ConsoleAppender::uses_stderr(None));
        assert!(!ConsoleAppender::uses_stderr(Some(LogLevel::Trace)));
        assert!(!ConsoleAppender::uses_stderr(Some(LogLevel::Info)));
        assert!(ConsoleAppender::uses_stderr(Some(LogLevel::Warn)));
        assert!(ConsoleAppender::uses_stderr(Some(LogLevel::Error)));
        assert!(ConsoleAppender::uses_stderr(Some(LogLevel::Fatal)));
    }

    #[test]
    fn test_append_and_flush() {
        let mut appender = ConsoleAppender::new();
        assert!(appender.append(Some(LogLevel::Info), "to stdout").is_ok());
        assert!(appender.append(Some(LogLevel::Error), "to stderr").is_ok());
        assert!(appender.flush().is_ok());
        assert_eq!(appender.name(), "console");
    }
}
