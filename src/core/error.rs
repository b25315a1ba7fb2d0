//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Log directory missing, not a directory, or not writable
    #[error("Invalid log directory '{path}': {message}")]
    InvalidDirectory { path: String, message: String },

    /// File writer error with path
    #[error("File writer error for '{path}': {message}")]
    FileWriterError { path: String, message: String },

    /// Retention count configured below one
    #[error("maxFiles must be >= 1 if set, got {max_files}")]
    InvalidRetention { max_files: i64 },

    /// Date template that cannot be compiled
    #[error("Invalid date pattern '{pattern}': {message}")]
    InvalidDatePattern { pattern: String, message: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create an invalid directory error
    pub fn directory(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidDirectory {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file writer error
    pub fn file_writer(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileWriterError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a date pattern error
    pub fn date_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidDatePattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Whether this error came from the file system while writing.
    ///
    /// Only these failures are eligible for the console-fallback policy; a
    /// configuration problem is always raised.
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            LoggerError::IoOperation { .. }
                | LoggerError::IoError(_)
                | LoggerError::FileWriterError { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("LoggerConfig", "Invalid level");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::file_writer("logs/2024-01-01.jsonl", "Permission denied");
        assert!(matches!(err, LoggerError::FileWriterError { .. }));

        let err = LoggerError::directory("/nope", "not a directory");
        assert!(matches!(err, LoggerError::InvalidDirectory { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::InvalidRetention { max_files: 0 };
        assert_eq!(err.to_string(), "maxFiles must be >= 1 if set, got 0");

        let err = LoggerError::file_writer("logs/log.jsonl", "Disk full");
        assert_eq!(
            err.to_string(),
            "File writer error for 'logs/log.jsonl': Disk full"
        );

        let err = LoggerError::date_pattern("yyyy-QQ", "unknown token 'QQ'");
        assert_eq!(
            err.to_string(),
            "Invalid date pattern 'yyyy-QQ': unknown token 'QQ'"
        );
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("writing log file", "cannot write to file", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("writing log file"));
        assert!(err.to_string().contains("cannot write to file"));
    }

    #[test]
    fn test_is_io_classification() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert!(LoggerError::from(io_err).is_io());
        assert!(LoggerError::file_writer("a", "b").is_io());
        assert!(!LoggerError::InvalidRetention { max_files: 0 }.is_io());
        assert!(!LoggerError::config("a", "b").is_io());
    }
}
