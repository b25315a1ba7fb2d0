//! Date templates such as `yyyy-MM-dd`
//!
//! A template is compiled once into a list of segments. The same segments
//! drive two things: formatting a zoned date-time (through a chrono strftime
//! string) and matching file names produced by that formatting (through an
//! anchored regex where every field becomes a digit run of fixed width).

use super::error::{LoggerError, Result};
use chrono::{DateTime, TimeZone};
use regex::Regex;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Field {
    strftime: &'static str,
    matcher: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Field(Field),
    Literal(String),
}

/// A compiled date template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    source: String,
    segments: Vec<Segment>,
    strftime: String,
}

fn field_for(letter: char, width: usize) -> Option<Field> {
    let (strftime, matcher) = match (letter, width) {
        ('y' | 'Y', 4) => ("%Y", r"\d{4}"),
        ('y' | 'Y', 2) => ("%y", r"\d{2}"),
        ('M', 2) => ("%m", r"\d{2}"),
        ('M', 1) => ("%-m", r"\d{1,2}"),
        ('d' | 'D', 2) => ("%d", r"\d{2}"),
        ('d' | 'D', 1) => ("%-d", r"\d{1,2}"),
        ('H', 2) => ("%H", r"\d{2}"),
        ('H', 1) => ("%-H", r"\d{1,2}"),
        ('h', 2) => ("%I", r"\d{2}"),
        ('h', 1) => ("%-I", r"\d{1,2}"),
        ('m', 2) => ("%M", r"\d{2}"),
        ('m', 1) => ("%-M", r"\d{1,2}"),
        ('s', 2) => ("%S", r"\d{2}"),
        ('s', 1) => ("%-S", r"\d{1,2}"),
        ('S', 3) => ("%3f", r"\d{3}"),
        ('a' | 'A', 1) => ("%p", "(?:AM|PM)"),
        _ => return None,
    };
    Some(Field { strftime, matcher })
}

fn push_literal(segments: &mut Vec<Segment>, text: &str) {
    if let Some(Segment::Literal(last)) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(Segment::Literal(text.to_string()));
    }
}

impl DatePattern {
    /// Compile a template. Letter runs must be known tokens; quote other text
    /// with single quotes (`''` is a literal quote).
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidDatePattern`] for empty templates,
    /// unknown tokens, or an unterminated quote.
    pub fn compile(source: &str) -> Result<Self> {
        if source.is_empty() {
            return Err(LoggerError::date_pattern(source, "pattern is empty"));
        }

        let chars: Vec<char> = source.chars().collect();
        let mut segments = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if c == '\'' {
                if chars.get(i + 1) == Some(&'\'') {
                    push_literal(&mut segments, "'");
                    i += 2;
                    continue;
                }
                let close = chars[i + 1..]
                    .iter()
                    .position(|&ch| ch == '\'')
                    .ok_or_else(|| LoggerError::date_pattern(source, "unterminated quote"))?;
                let text: String = chars[i + 1..i + 1 + close].iter().collect();
                push_literal(&mut segments, &text);
                i += close + 2;
            } else if c.is_ascii_alphabetic() {
                let width = chars[i..].iter().take_while(|&&ch| ch == c).count();
                let field = field_for(c, width).ok_or_else(|| {
                    let token: String = std::iter::repeat(c).take(width).collect();
                    LoggerError::date_pattern(source, format!("unknown token '{}'", token))
                })?;
                segments.push(Segment::Field(field));
                i += width;
            } else {
                push_literal(&mut segments, c.encode_utf8(&mut [0u8; 4]));
                i += 1;
            }
        }

        let strftime = segments
            .iter()
            .map(|segment| match segment {
                Segment::Field(field) => field.strftime.to_string(),
                Segment::Literal(text) => text.replace('%', "%%"),
            })
            .collect();

        Ok(Self {
            source: source.to_string(),
            segments,
            strftime,
        })
    }

    /// Compile a template used to name log files.
    ///
    /// On top of [`DatePattern::compile`], the template must contain at least
    /// one date field and no path separator.
    pub fn compile_file_name(source: &str) -> Result<Self> {
        if source.contains('/') || source.contains('\\') {
            return Err(LoggerError::date_pattern(
                source,
                "file name pattern must not contain a path separator",
            ));
        }
        let pattern = Self::compile(source)?;
        if !pattern.has_fields() {
            return Err(LoggerError::date_pattern(
                source,
                "file name pattern must contain at least one date field",
            ));
        }
        Ok(pattern)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn has_fields(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, Segment::Field(_)))
    }

    pub fn format<Tz: TimeZone>(&self, datetime: &DateTime<Tz>) -> String
    where
        Tz::Offset: fmt::Display,
    {
        datetime.format(&self.strftime).to_string()
    }

    /// Regex matching exactly the file names `{formatted}.{extension}`
    pub fn file_matcher(&self, extension: &str) -> Result<Regex> {
        let mut expr = String::from("^");
        for segment in &self.segments {
            match segment {
                Segment::Field(field) => expr.push_str(field.matcher),
                Segment::Literal(text) => expr.push_str(&regex::escape(text)),
            }
        }
        expr.push_str(&regex::escape(&format!(".{}", extension)));
        expr.push('$');

        Regex::new(&expr).map_err(|e| LoggerError::date_pattern(&self.source, e.to_string()))
    }
}

impl fmt::Display for DatePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
