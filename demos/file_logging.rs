//! File logging example
//!
//! Writes date-keyed JSONL files into a temporary directory, keeps the two
//! most recent ones, and prints what ended up on disk.
//!
//! Run with: cargo run --example file_logging

use chrono::{Duration, TimeZone, Utc};
use jsonl_logger::prelude::*;
use jsonl_logger::ManualClock;
use std::fs;
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== JSONL Logger - File Logging Example ===\n");

    let dir = std::env::temp_dir().join("jsonl_logger_demo");
    let _ = fs::remove_dir_all(&dir);

    let start = Utc
        .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
        .single()
        .ok_or_else(|| LoggerError::other("invalid start date"))?;
    let clock = Arc::new(ManualClock::new(start));

    let logger = Logger::builder()
        .override_layer(ConfigLayer {
            directory: Some(dir.display().to_string()),
            timezone: Some("UTC".into()),
            console: Some(false),
            max_files: Some(Some(2)),
            ..ConfigLayer::default()
        })
        .clock(clock.clone())
        .build()?;

    for day in 0..3 {
        logger.info(format!("record for day {}", day + 1));
        logger.custom("JOB", "nightly", day);
        clock.advance(Duration::days(1));
    }
    logger.flush()?;

    let mut files: Vec<_> = fs::read_dir(&dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();
    files.sort();

    for path in files {
        println!("{}:", path.display());
        for line in fs::read_to_string(&path)?.lines() {
            println!("  {}", line);
        }
    }

    println!("\n=== Example completed ===");
    Ok(())
}
