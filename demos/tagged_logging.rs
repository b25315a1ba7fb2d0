//! Tagged logging example
//!
//! Shows free-form entries with per-tag colors and a custom line pattern.
//!
//! Run with: cargo run --example tagged_logging

use jsonl_logger::prelude::*;
use std::collections::HashMap;

fn main() -> Result<()> {
    println!("=== JSONL Logger - Tagged Logging Example ===\n");

    let logger = Logger::builder()
        .override_layer(ConfigLayer {
            disable_file: Some(true),
            custom_pattern: Some(
                "{color:tagColor}{tag}{reset} {color:contextColor}{context}{reset} -> {data} [{id}]"
                    .into(),
            ),
            custom_colors: Some(HashMap::from([
                ("http".to_string(), "green".to_string()),
                ("db".to_string(), "brightBlue".to_string()),
            ])),
            ..ConfigLayer::default()
        })
        .build()?;

    logger.custom("HTTP", "GET /health", 200);
    logger.custom("DB", "pool", LogValue::map([("active", 4), ("idle", 12)]));
    logger.custom("CACHE", "warmup", "done");

    logger.flush()?;
    println!("\n=== Example completed ===");
    Ok(())
}
