//! Caller metadata attached to every log call
//!
//! Resolving where a call came from is a capability of the host, so it sits
//! behind [`CallerResolver`]. The default resolver uses the `#[track_caller]`
//! location threaded through the logger's public methods. The backtrace
//! resolver walks a captured stack instead and skips frames that belong to
//! configured library roots. When nothing resolves, the record falls back to
//! `unknown:0:0` with a valid timestamp and id.

use super::config::LoggerConfig;
use super::timestamp::iso_timestamp;
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use regex::Regex;
use std::backtrace::Backtrace;
use std::panic::Location;
use std::path::Path;
use std::sync::LazyLock;

pub const CORRELATION_ID_LENGTH: usize = 8;
pub const UNKNOWN_FILE: &str = "unknown";

static URL_FRAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*at file://(.+?):(\d+):(\d+)\s*$").unwrap());
static PATH_FRAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*at (.+?):(\d+):(\d+)\s*$").unwrap());

/// A resolved source position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Base name of the file path
    pub fn file_name(&self) -> String {
        Path::new(&self.file)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file.clone())
    }
}

impl From<&Location<'_>> for SourceLocation {
    fn from(location: &Location<'_>) -> Self {
        SourceLocation::new(location.file(), location.line(), location.column())
    }
}

/// Per-call metadata: correlation id, source position, and timestamps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerMeta {
    pub id: String,
    pub file_name: String,
    pub line: u32,
    pub column: u32,
    /// ISO 8601 UTC timestamp with milliseconds
    pub timestamp: String,
    /// Timestamp rendered with the configured date format and time zone
    pub pretty_timestamp: String,
}

/// Capability to find the caller's source position
pub trait CallerResolver: Send + Sync {
    /// `site` is the `#[track_caller]` location of the public logging call
    fn resolve_caller(&self, site: &'static Location<'static>) -> Option<SourceLocation>;
}

/// Uses the tracked call site directly
#[derive(Debug, Default, Clone, Copy)]
pub struct TrackedCallerResolver;

impl CallerResolver for TrackedCallerResolver {
    fn resolve_caller(&self, site: &'static Location<'static>) -> Option<SourceLocation> {
        Some(site.into())
    }
}

/// Never resolves; every record reports `unknown:0:0`
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCallerResolver;

impl CallerResolver for NoopCallerResolver {
    fn resolve_caller(&self, _site: &'static Location<'static>) -> Option<SourceLocation> {
        None
    }
}

/// Walks a captured backtrace for the first frame outside the library
///
/// Frames carry no source positions in builds without debug info, in which
/// case this resolver yields nothing.
#[derive(Debug, Clone)]
pub struct BacktraceCallerResolver {
    library_roots: Vec<String>,
}

impl Default for BacktraceCallerResolver {
    fn default() -> Self {
        Self {
            library_roots: vec![
                concat!(env!("CARGO_MANIFEST_DIR"), "/src").to_string(),
                "/rustc/".to_string(),
            ],
        }
    }
}

impl BacktraceCallerResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver with exactly these roots excluded
    pub fn with_roots<I, S>(roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            library_roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Also skip frames whose path contains `root`
    #[must_use]
    pub fn exclude(mut self, root: impl Into<String>) -> Self {
        self.library_roots.push(root.into());
        self
    }

    pub fn library_roots(&self) -> &[String] {
        &self.library_roots
    }

    fn is_internal(&self, path: &str) -> bool {
        self.library_roots
            .iter()
            .any(|root| path.contains(root.as_str()))
    }

    /// First external frame of a rendered backtrace, skipping frame 0
    pub fn first_external_frame(&self, trace: &str) -> Option<SourceLocation> {
        parse_frames(trace)
            .into_iter()
            .skip(1)
            .find(|frame| !self.is_internal(&frame.file))
    }
}

impl CallerResolver for BacktraceCallerResolver {
    fn resolve_caller(&self, _site: &'static Location<'static>) -> Option<SourceLocation> {
        let trace = Backtrace::force_capture().to_string();
        self.first_external_frame(&trace)
    }
}

/// Source positions of a rendered backtrace, innermost first
pub fn parse_frames(trace: &str) -> Vec<SourceLocation> {
    trace
        .lines()
        .filter_map(|line| {
            let captures = URL_FRAME_RE
                .captures(line)
                .or_else(|| PATH_FRAME_RE.captures(line))?;
            Some(SourceLocation::new(
                &captures[1],
                captures[2].parse().ok()?,
                captures[3].parse().ok()?,
            ))
        })
        .collect()
}

/// Short random alphanumeric id. Not unique; a debugging aid only.
pub fn correlation_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CORRELATION_ID_LENGTH)
        .map(char::from)
        .collect()
}

/// ISO and pretty timestamps for `now`
pub fn timestamps(config: &LoggerConfig, now: &DateTime<Utc>) -> (String, String) {
    (
        iso_timestamp(now),
        config.timezone.format(now, &config.date_format),
    )
}

/// Build the metadata record for one call
pub fn resolve(
    config: &LoggerConfig,
    resolver: &dyn CallerResolver,
    site: &'static Location<'static>,
    now: &DateTime<Utc>,
) -> CallerMeta {
    let (timestamp, pretty_timestamp) = timestamps(config, now);
    let location = resolver.resolve_caller(site);

    let (file_name, line, column) = match location {
        Some(location) => (location.file_name(), location.line, location.column),
        None => (UNKNOWN_FILE.to_string(), 0, 0),
    };

    CallerMeta {
        id: correlation_id(),
        file_name,
        line,
        column,
        timestamp,
        pretty_timestamp,
    }
}
