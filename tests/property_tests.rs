//! Property-based tests for jsonl_logger using proptest

use chrono::{Duration, TimeZone, Utc};
use jsonl_logger::core::pattern::{render, PatternTokens};
use jsonl_logger::core::serializer::{serialize_for_file, CIRCULAR_MARKER};
use jsonl_logger::prelude::*;
use jsonl_logger::{ConfigLayer, DatePattern, ManualClock};
use proptest::prelude::*;
use std::fs;
use std::sync::Arc;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Trace),
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
        Just(LogLevel::Fatal),
        Just(LogLevel::Silent),
    ]
}

/// Token text without braces, so no token can look like a directive
fn token_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _.:-]{1,12}"
}

fn config_without_color() -> LoggerConfig {
    LoggerConfig {
        console_color: false,
        ..LoggerConfig::default()
    }
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Test that LogLevel string conversions roundtrip correctly
    #[test]
    fn test_log_level_str_roundtrip(level in any_level()) {
        let parsed: LogLevel = level.to_str().parse().unwrap();
        prop_assert_eq!(level, parsed);
        let parsed: LogLevel = level.name().parse().unwrap();
        prop_assert_eq!(level, parsed);
    }

    /// A call passes the threshold iff its numeric value is at least the threshold's
    #[test]
    fn test_level_filtering(threshold in any_level(), call in any_level(), silent in any::<bool>()) {
        let config = LoggerConfig {
            level: threshold,
            silent,
            ..LoggerConfig::default()
        };
        let expected = !silent && call != LogLevel::Silent && call.value() >= threshold.value();
        prop_assert_eq!(config.should_log(call), expected);
    }

    /// Ordering follows the numeric values
    #[test]
    fn test_log_level_ordering(a in any_level(), b in any_level()) {
        prop_assert_eq!(a <= b, a.value() <= b.value());
        prop_assert_eq!(a < b, a.value() < b.value());
    }
}

// ============================================================================
// Pattern Tests
// ============================================================================

proptest! {
    /// Every known placeholder is replaced exactly once and nothing else remains
    #[test]
    fn test_pattern_round_trip(
        values in proptest::collection::vec(token_text(), 11),
        color in "[a-z]{3,8}",
    ) {
        let tokens = PatternTokens {
            timestamp: Some(format!("<{}>", values[0])),
            pretty_timestamp: Some(format!("<{}>", values[1])),
            level_name: Some(format!("<{}>", values[2])),
            level: Some(format!("<{}>", values[3])),
            file_name: Some(format!("<{}>", values[4])),
            line: Some(format!("<{}>", values[5])),
            column: Some(format!("<{}>", values[6])),
            data: Some(format!("<{}>", values[7])),
            id: Some(format!("<{}>", values[8])),
            tag: Some(format!("<{}>", values[9])),
            context: Some(format!("<{}>", values[10])),
        };
        let pattern = format!(
            "{{color:{}}}{{timestamp}} {{pretty-timestamp}} {{level-name}} {{level}} {{file-name}} \
             {{line}} {{column}} {{data}} {{id}} {{tag}} {{context}}{{reset}}",
            color
        );

        let line = render(&pattern, &tokens, &config_without_color(), Some(LogLevel::Info), Some("t"));

        prop_assert!(!line.contains('{'), "rendered line contains an opening brace: {}", line);
        prop_assert!(!line.contains('}'), "rendered line contains a closing brace: {}", line);
        let expected = values
            .iter()
            .map(|v| format!("<{}>", v))
            .collect::<Vec<_>>()
            .join(" ");
        prop_assert_eq!(line, expected);
    }

    /// Text without braces renders unchanged
    #[test]
    fn test_literal_text_unchanged(text in "[^{}]{0,40}") {
        let line = render(&text, &PatternTokens::default(), &config_without_color(), None, None);
        prop_assert_eq!(line, text);
    }
}

// ============================================================================
// Serializer Tests
// ============================================================================

proptest! {
    /// A list that contains itself at any depth serializes with the marker
    #[test]
    fn test_cycle_safety(depth in 0usize..6, payload in any::<i64>()) {
        let root = LogValue::list(vec![LogValue::from(payload)]);
        let mut tail = root.clone();
        for _ in 0..depth {
            let child = LogValue::list(Vec::<LogValue>::new());
            tail.push(child.clone());
            tail = child;
        }
        tail.push(root.clone());

        let encoded = serialize_for_file(&root);
        let text = encoded.to_string();
        prop_assert!(text.contains(CIRCULAR_MARKER));
        prop_assert_eq!(&encoded[0], &serde_json::json!(payload));
    }
}

// ============================================================================
// Rotation Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// After N rotations with retention R, exactly the R newest files remain
    #[test]
    fn test_retention_invariant(days in 2u32..8, retention in 1i64..8) {
        prop_assume!(retention < i64::from(days));

        let temp_dir = tempfile::tempdir().unwrap();
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let logger = Logger::builder()
            .override_layer(ConfigLayer {
                directory: Some(temp_dir.path().display().to_string()),
                timezone: Some("UTC".into()),
                console: Some(false),
                max_files: Some(Some(retention)),
                ..ConfigLayer::default()
            })
            .clock(clock.clone())
            .build()
            .unwrap();

        for day in 0..days {
            clock.set(start + Duration::days(i64::from(day)));
            logger.info("tick");
        }
        logger.flush().unwrap();

        let mut names: Vec<String> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();

        let expected: Vec<String> = (days - retention as u32..days)
            .map(|day| format!("{}.jsonl", (start + Duration::days(i64::from(day))).format("%Y-%m-%d")))
            .collect();
        prop_assert_eq!(names, expected);
    }

    /// File names produced by a pattern are recognized by its matcher
    #[test]
    fn test_file_matcher_accepts_own_output(offset in 0i64..20_000, pattern in prop_oneof![
        Just("yyyy-MM-dd"),
        Just("yyyyMMdd"),
        Just("'app_'yyyy-MM-dd_HH"),
        Just("dd.MM.yy"),
    ]) {
        let compiled = DatePattern::compile_file_name(pattern).unwrap();
        let matcher = compiled.file_matcher("jsonl").unwrap();
        let instant = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap() + Duration::hours(offset);
        let name = format!("{}.jsonl", compiled.format(&instant));
        prop_assert!(matcher.is_match(&name), "{} should match {}", name, pattern);
        let other_extension = format!("{}.log", compiled.format(&instant));
        prop_assert!(!matcher.is_match(&other_extension));
    }
}
