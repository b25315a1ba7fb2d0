//! Basic logger usage example
//!
//! Demonstrates leveled console logging, variadic payloads and pretty
//! printing of structured values. File output is disabled.
//!
//! Run with: cargo run --example basic_usage

use jsonl_logger::prelude::*;
use jsonl_logger::{info, payload};
use serde_json::json;

fn main() -> Result<()> {
    println!("=== JSONL Logger - Basic Usage Example ===\n");

    let logger = Logger::builder()
        .override_layer(ConfigLayer {
            level: Some("trace".into()),
            disable_file: Some(true),
            ..ConfigLayer::default()
        })
        .build()?;

    println!("1. Logging at different levels:");
    logger.trace("This is a trace message");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warn("This is a warning message");
    logger.error("This is an error message");
    logger.fatal("This is a fatal message");

    println!("\n2. Formatted and variadic messages:");
    let port = 8080;
    info!(logger, "Server listening on port {}", port);
    logger.info(payload!["request", 42, true]);

    println!("\n3. Structured values:");
    logger.info(payload![
        "user",
        json!({ "id": 7, "roles": ["admin", "dev"] })
    ]);

    let failure = std::io::Error::new(std::io::ErrorKind::NotFound, "config missing");
    logger.error(LogValue::error(&failure));

    let node = LogValue::map([("name", "self-referencing")]);
    node.insert("me", node.clone());
    logger.warn(node.clone());
    node.clear();

    logger.flush()?;
    println!("\n=== Example completed ===");
    Ok(())
}
