//! Logging macros for ergonomic log message formatting.
//!
//! The leveled macros format their arguments like `format!` and log the
//! result as a single string. [`payload!`](crate::payload) builds a payload of
//! several independent values instead, the way variadic calls are rendered.
//!
//! # Examples
//!
//! ```
//! use jsonl_logger::prelude::*;
//! use jsonl_logger::{info, payload};
//!
//! let logger = Logger::builder()
//!     .override_layer(ConfigLayer {
//!         disable_file: Some(true),
//!         ..ConfigLayer::default()
//!     })
//!     .build()
//!     .unwrap();
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // Several values, each rendered on its own and joined by a space
//! logger.info(payload!["user", 42, true]);
//! ```

/// Build a [`Payload`](crate::Payload) from any values convertible into
/// [`LogValue`](crate::LogValue).
///
/// # Examples
///
/// ```
/// use jsonl_logger::payload;
///
/// let payload = payload!["retry", 3, 0.5];
/// assert_eq!(payload.len(), 3);
/// assert!(payload![].is_empty());
/// ```
#[macro_export]
macro_rules! payload {
    () => {
        $crate::Payload::default()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Payload::new(vec![$($crate::LogValue::from($value)),+])
    };
}

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use jsonl_logger::prelude::*;
/// # let logger = Logger::builder()
/// #     .override_layer(ConfigLayer { disable_file: Some(true), ..ConfigLayer::default() })
/// #     .build()
/// #     .unwrap();
/// use jsonl_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+))
    };
}

/// Log a trace-level message.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use jsonl_logger::prelude::*;
/// # let logger = Logger::builder()
/// #     .override_layer(ConfigLayer { disable_file: Some(true), ..ConfigLayer::default() })
/// #     .build()
/// #     .unwrap();
/// use jsonl_logger::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}
