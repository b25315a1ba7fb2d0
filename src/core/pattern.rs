//! Pattern-based line rendering
//!
//! A pattern mixes literal text with `{...}` directives. Value placeholders
//! (`{timestamp}`, `{level-name}`, `{data}`, ...) are replaced by their token;
//! color directives (`{color:NAME}`, `{reset}`) become ANSI escapes when
//! console color is enabled and disappear otherwise. A placeholder whose token
//! is missing or empty, and any unknown `{...}`, is kept as literal text.
//!
//! Rendering is a single left-to-right pass, so token values are never
//! themselves scanned for directives.

use super::caller::CallerMeta;
use super::color::{Color, RESET};
use super::config::LoggerConfig;
use super::log_level::LogLevel;

/// Default color for `{color:tagColor}` when the tag has no override
pub const DEFAULT_TAG_COLOR: Color = Color::Magenta;
/// Color for `{color:contextColor}`
pub const CONTEXT_COLOR: Color = Color::Cyan;

/// Resolved placeholder values for one call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternTokens {
    pub timestamp: Option<String>,
    pub pretty_timestamp: Option<String>,
    pub level_name: Option<String>,
    pub level: Option<String>,
    pub file_name: Option<String>,
    pub line: Option<String>,
    pub column: Option<String>,
    pub data: Option<String>,
    pub id: Option<String>,
    pub tag: Option<String>,
    pub context: Option<String>,
}

impl PatternTokens {
    /// Tokens for a leveled line
    pub fn for_level(level: LogLevel, meta: &CallerMeta, data: String) -> Self {
        Self {
            timestamp: Some(meta.timestamp.clone()),
            pretty_timestamp: Some(meta.pretty_timestamp.clone()),
            level_name: Some(level.to_str().to_string()),
            level: Some(level.value().to_string()),
            file_name: Some(meta.file_name.clone()),
            line: Some(meta.line.to_string()),
            column: Some(meta.column.to_string()),
            data: Some(data),
            id: Some(meta.id.clone()),
            tag: None,
            context: None,
        }
    }

    /// Tokens for a tagged line
    pub fn for_tag(tag: &str, context: &str, meta: &CallerMeta, data: String) -> Self {
        Self {
            timestamp: Some(meta.timestamp.clone()),
            pretty_timestamp: Some(meta.pretty_timestamp.clone()),
            level_name: None,
            level: None,
            file_name: Some(meta.file_name.clone()),
            line: Some(meta.line.to_string()),
            column: Some(meta.column.to_string()),
            data: Some(data),
            id: Some(meta.id.clone()),
            tag: Some(tag.to_string()),
            context: Some(context.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholder {
    Timestamp,
    PrettyTimestamp,
    LevelName,
    Level,
    FileName,
    Line,
    Column,
    Data,
    Id,
    Tag,
    Context,
}

impl Placeholder {
    fn parse(name: &str) -> Option<Self> {
        let placeholder = match name {
            "timestamp" => Placeholder::Timestamp,
            "pretty-timestamp" => Placeholder::PrettyTimestamp,
            "level-name" => Placeholder::LevelName,
            "level" => Placeholder::Level,
            "file-name" => Placeholder::FileName,
            "line" => Placeholder::Line,
            "column" => Placeholder::Column,
            "data" => Placeholder::Data,
            "id" => Placeholder::Id,
            "tag" => Placeholder::Tag,
            "context" => Placeholder::Context,
            _ => return None,
        };
        Some(placeholder)
    }

    fn value<'a>(&self, tokens: &'a PatternTokens) -> Option<&'a str> {
        let value = match self {
            Placeholder::Timestamp => &tokens.timestamp,
            Placeholder::PrettyTimestamp => &tokens.pretty_timestamp,
            Placeholder::LevelName => &tokens.level_name,
            Placeholder::Level => &tokens.level,
            Placeholder::FileName => &tokens.file_name,
            Placeholder::Line => &tokens.line,
            Placeholder::Column => &tokens.column,
            Placeholder::Data => &tokens.data,
            Placeholder::Id => &tokens.id,
            Placeholder::Tag => &tokens.tag,
            Placeholder::Context => &tokens.context,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Directive<'p> {
    Value(Placeholder),
    Color(&'p str),
    Reset,
}

impl<'p> Directive<'p> {
    fn parse(body: &'p str) -> Option<Self> {
        if body == "reset" {
            return Some(Directive::Reset);
        }
        if let Some(name) = body.strip_prefix("color:") {
            return Some(Directive::Color(name));
        }
        Placeholder::parse(body).map(Directive::Value)
    }
}

/// Escape for `{color:NAME}`, or empty when unknown or color is off
fn color_escape(
    name: &str,
    config: &LoggerConfig,
    level: Option<LogLevel>,
    tag: Option<&str>,
) -> String {
    if !config.console_color {
        return String::new();
    }

    let color = match name {
        "levelColor" => level.map(|l| config.level_color(l)),
        "tagColor" => Some(
            tag.and_then(|t| config.tag_color(t))
                .unwrap_or(DEFAULT_TAG_COLOR),
        ),
        "contextColor" => Some(CONTEXT_COLOR),
        other => Color::from_name(other),
    };

    color.map(|c| c.escape()).unwrap_or_default()
}

/// Render `pattern` with `tokens`.
///
/// `level` drives `{color:levelColor}` and `tag` drives `{color:tagColor}`.
pub fn render(
    pattern: &str,
    tokens: &PatternTokens,
    config: &LoggerConfig,
    level: Option<LogLevel>,
    tag: Option<&str>,
) -> String {
    let mut out = String::with_capacity(pattern.len() + 64);
    let mut rest = pattern;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let close = match after.find(['{', '}']) {
            Some(i) if after.as_bytes()[i] == b'}' => i,
            // No directive starts here; keep the brace and rescan after it
            _ => {
                out.push('{');
                rest = after;
                continue;
            }
        };

        let body = &after[..close];
        let replacement = match Directive::parse(body) {
            Some(Directive::Value(placeholder)) => placeholder.value(tokens).map(str::to_string),
            Some(Directive::Color(name)) => Some(color_escape(name, config, level, tag)),
            Some(Directive::Reset) => Some(if config.console_color {
                RESET.to_string()
            } else {
                String::new()
            }),
            None => None,
        };

        match replacement {
            Some(text) => out.push_str(&text),
            None => {
                out.push('{');
                out.push_str(body);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

/// Render the configured leveled pattern
pub fn render_level_line(
    config: &LoggerConfig,
    level: LogLevel,
    meta: &CallerMeta,
    data: String,
) -> String {
    let tokens = PatternTokens::for_level(level, meta, data);
    render(&config.pattern, &tokens, config, Some(level), None)
}

/// Render the configured tagged pattern
pub fn render_tagged_line(
    config: &LoggerConfig,
    tag: &str,
    context: &str,
    meta: &CallerMeta,
    data: String,
) -> String {
    let tokens = PatternTokens::for_tag(tag, context, meta, data);
    render(&config.custom_pattern, &tokens, config, None, Some(tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(color: bool) -> LoggerConfig {
        LoggerConfig {
            console_color: color,
            ..LoggerConfig::default()
        }
    }

    fn full_tokens() -> PatternTokens {
        PatternTokens {
            timestamp: Some("2024-01-01T00:00:00.000Z".into()),
            pretty_timestamp: Some("2024-01-01 00:00:00".into()),
            level_name: Some("INFO".into()),
            level: Some("30".into()),
            file_name: Some("main.rs".into()),
            line: Some("12".into()),
            column: Some("5".into()),
            data: Some("hello".into()),
            id: Some("aB3dE6gH".into()),
            tag: Some("DB".into()),
            context: Some("pool".into()),
        }
    }

    #[test]
    fn test_every_placeholder_replaced() {
        let pattern = "{timestamp}|{pretty-timestamp}|{level-name}|{level}|{file-name}|{line}|{column}|{data}|{id}|{tag}|{context}";
        let line = render(pattern, &full_tokens(), &config(false), Some(LogLevel::Info), None);
        assert_eq!(
            line,
            "2024-01-01T00:00:00.000Z|2024-01-01 00:00:00|INFO|30|main.rs|12|5|hello|aB3dE6gH|DB|pool"
        );
    }

    #[test]
    fn test_replacement_is_global() {
        let line = render("{id}-{id}-{id}", &full_tokens(), &config(false), None, None);
        assert_eq!(line, "aB3dE6gH-aB3dE6gH-aB3dE6gH");
    }

    #[test]
    fn test_missing_and_empty_tokens_left_untouched() {
        let tokens = PatternTokens {
            data: Some(String::new()),
            ..PatternTokens::default()
        };
        let line = render("[{tag}] {data} {nonsense}", &tokens, &config(false), None, None);
        assert_eq!(line, "[{tag}] {data} {nonsense}");
    }

    #[test]
    fn test_token_values_are_not_rescanned() {
        let tokens = PatternTokens {
            data: Some("{id}".into()),
            id: Some("X".into()),
            ..PatternTokens::default()
        };
        assert_eq!(render("{data} {id}", &tokens, &config(false), None, None), "{id} X");
    }

    #[test]
    fn test_stray_braces() {
        let line = render("{{data}} {", &full_tokens(), &config(false), None, None);
        assert_eq!(line, "{hello} {");
    }

    #[test]
    fn test_color_directives_removed_when_disabled() {
        let line = render(
            "{color:red}{data}{reset} {color:nope}{color:levelColor}x",
            &full_tokens(),
            &config(false),
            Some(LogLevel::Error),
            None,
        );
        assert_eq!(line, "hello x");
    }

    #[test]
    fn test_named_colors_and_reset() {
        let line = render("{color:red}{data}{reset}", &full_tokens(), &config(true), None, None);
        assert_eq!(line, "\x1b[31mhello\x1b[0m");

        let unknown = render("{color:nope}{data}", &full_tokens(), &config(true), None, None);
        assert_eq!(unknown, "hello");
    }

    #[test]
    fn test_level_color_default_and_override() {
        let mut cfg = config(true);
        let line = render("{color:levelColor}", &full_tokens(), &cfg, Some(LogLevel::Warn), None);
        assert_eq!(line, Color::Yellow.escape());

        cfg.level_color = HashMap::from([(LogLevel::Warn, Color::BgRed)]);
        let line = render("{color:levelColor}", &full_tokens(), &cfg, Some(LogLevel::Warn), None);
        assert_eq!(line, Color::BgRed.escape());
    }

    #[test]
    fn test_tag_color_uses_upper_cased_tag() {
        let mut cfg = config(true);
        let line = render("{color:tagColor}", &full_tokens(), &cfg, None, Some("db"));
        assert_eq!(line, DEFAULT_TAG_COLOR.escape());

        cfg.custom_colors = HashMap::from([("DB".to_string(), Color::Green)]);
        let line = render("{color:tagColor}", &full_tokens(), &cfg, None, Some("db"));
        assert_eq!(line, Color::Green.escape());

        let line = render("{color:contextColor}", &full_tokens(), &cfg, None, Some("db"));
        assert_eq!(line, CONTEXT_COLOR.escape());
    }

    #[test]
    fn test_default_patterns_without_color() {
        let meta = CallerMeta {
            id: "abcdefgh".into(),
            file_name: "main.rs".into(),
            line: 10,
            column: 4,
            timestamp: "2024-01-01T00:00:00.000Z".into(),
            pretty_timestamp: "2024-01-01 00:00:00".into(),
        };
        let cfg = config(false);

        let line = render_level_line(&cfg, LogLevel::Warn, &meta, "disk low".into());
        assert_eq!(line, "2024-01-01 00:00:00 [WARN] (main.rs:10:4) disk low");

        let line = render_tagged_line(&cfg, "HTTP", "GET /", &meta, "200".into());
        assert_eq!(line, "2024-01-01 00:00:00 [HTTP] (GET /) 200");
    }
}
