//! Time sources and time zone handling
//!
//! Every timestamp the logger produces comes from a [`Clock`], so rotation and
//! formatting can be driven deterministically in tests with [`ManualClock`].

use super::date_pattern::DatePattern;
use chrono::{DateTime, Local, SecondsFormat, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;
use std::fmt;
use std::str::FromStr;

/// Sentinel accepted in configuration for host-local time
pub const LOCAL_TIMEZONE: &str = "local";

/// Source of "now" for the logger and its file writer
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
///
/// # Examples
///
/// ```
/// use jsonl_logger::core::{Clock, ManualClock};
/// use chrono::{Duration, TimeZone, Utc};
///
/// let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
/// clock.advance(Duration::days(1));
/// assert_eq!(clock.now().format("%Y-%m-%d").to_string(), "2024-01-02");
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Time zone used for pretty timestamps and rotation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeZoneSetting {
    /// Host-local rules
    #[default]
    Local,
    /// A named IANA zone
    Named(Tz),
}

impl TimeZoneSetting {
    /// Render `instant` with a compiled date pattern in this zone
    pub fn format(&self, instant: &DateTime<Utc>, pattern: &DatePattern) -> String {
        match self {
            TimeZoneSetting::Local => pattern.format(&instant.with_timezone(&Local)),
            TimeZoneSetting::Named(tz) => pattern.format(&instant.with_timezone(tz)),
        }
    }
}

impl FromStr for TimeZoneSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case(LOCAL_TIMEZONE) {
            return Ok(TimeZoneSetting::Local);
        }
        s.parse::<Tz>()
            .map(TimeZoneSetting::Named)
            .map_err(|_| format!("Unknown time zone: '{}'", s))
    }
}

impl fmt::Display for TimeZoneSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeZoneSetting::Local => f.write_str(LOCAL_TIMEZONE),
            TimeZoneSetting::Named(tz) => f.write_str(tz.name()),
        }
    }
}

/// ISO 8601 timestamp in UTC with milliseconds: `2025-01-08T10:30:45.123Z`
pub fn iso_timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Epoch milliseconds of an ISO timestamp, if it parses
pub fn epoch_millis(iso: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(iso)
        .ok()
        .map(|parsed| parsed.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_datetime() -> DateTime<Utc> {
        // 2025-01-08 10:30:45.123 UTC
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::milliseconds(123)
    }

    #[test]
    fn test_iso_timestamp() {
        assert_eq!(iso_timestamp(&fixed_datetime()), "2025-01-08T10:30:45.123Z");
    }

    #[test]
    fn test_epoch_millis_roundtrip() {
        let iso = iso_timestamp(&fixed_datetime());
        assert_eq!(epoch_millis(&iso), Some(fixed_datetime().timestamp_millis()));
        assert_eq!(epoch_millis("yesterday"), None);
    }

    #[test]
    fn test_parse_time_zone() {
        assert_eq!("local".parse::<TimeZoneSetting>(), Ok(TimeZoneSetting::Local));
        assert_eq!(
            "UTC".parse::<TimeZoneSetting>(),
            Ok(TimeZoneSetting::Named(Tz::UTC))
        );
        assert!("Mars/Olympus_Mons".parse::<TimeZoneSetting>().is_err());
    }

    #[test]
    fn test_format_in_named_zone() {
        let pattern = DatePattern::compile("yyyy-MM-dd HH:mm").unwrap();
        let tokyo: TimeZoneSetting = "Asia/Tokyo".parse().unwrap();
        // 10:30 UTC is 19:30 in Tokyo
        assert_eq!(tokyo.format(&fixed_datetime(), &pattern), "2025-01-08 19:30");

        let late = Utc.with_ymd_and_hms(2025, 1, 8, 20, 0, 0).unwrap();
        assert_eq!(tokyo.format(&late, &pattern), "2025-01-09 05:00");
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(fixed_datetime());
        assert_eq!(clock.now(), fixed_datetime());
        clock.advance(chrono::Duration::hours(1));
        assert_eq!(clock.now(), fixed_datetime() + chrono::Duration::hours(1));
        clock.set(fixed_datetime());
        assert_eq!(clock.now(), fixed_datetime());
    }
}
