//! Output sinks: the console appender and the rotating JSONL file writer

pub mod console;
pub mod rotating_file;

pub use console::ConsoleAppender;
pub use rotating_file::{FileWriterOptions, RotatingFileWriter};

pub use crate::core::Appender;
