//! Log level definitions

use super::color::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace = 10,
    Debug = 20,
    #[default]
    Info = 30,
    Warn = 40,
    Error = 50,
    Fatal = 60,
    Silent = 70,
}

impl LogLevel {
    pub const ALL: [LogLevel; 7] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
        LogLevel::Silent,
    ];

    /// Numeric severity used for filtering
    pub fn value(&self) -> u8 {
        *self as u8
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
            LogLevel::Silent => "SILENT",
        }
    }

    /// Lower-case name, as written to the `level` field of file records
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
            LogLevel::Silent => "silent",
        }
    }

    pub fn default_color(&self) -> Color {
        match self {
            LogLevel::Trace => Color::Gray,
            LogLevel::Debug => Color::Blue,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
            LogLevel::Fatal => Color::BrightRed,
            LogLevel::Silent => Color::White,
        }
    }

    /// Whether a call at `self` passes a configured minimum of `min`
    pub fn passes(&self, min: LogLevel) -> bool {
        *self != LogLevel::Silent && self.value() >= min.value()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            "SILENT" => Ok(LogLevel::Silent),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_values() {
        assert_eq!(LogLevel::Trace.value(), 10);
        assert_eq!(LogLevel::Info.value(), 30);
        assert_eq!(LogLevel::Silent.value(), 70);
        assert!(LogLevel::Warn > LogLevel::Info);
    }

    #[test]
    fn test_passes_threshold() {
        assert!(LogLevel::Info.passes(LogLevel::Info));
        assert!(LogLevel::Error.passes(LogLevel::Warn));
        assert!(!LogLevel::Debug.passes(LogLevel::Info));
        assert!(!LogLevel::Fatal.passes(LogLevel::Silent));
        assert!(!LogLevel::Silent.passes(LogLevel::Trace));
    }

    #[test]
    fn test_parse() {
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("Silent".parse::<LogLevel>(), Ok(LogLevel::Silent));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&LogLevel::Warn).unwrap();
        assert_eq!(json, "\"warn\"");
        let level: LogLevel = serde_json::from_str("\"fatal\"").unwrap();
        assert_eq!(level, LogLevel::Fatal);
    }
}
