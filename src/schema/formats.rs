//! Date/time detection for string values
//!
//! Strings that look like RFC3339 timestamps or calendar dates are normalized
//! to UTC (`YYYY-MM-DDTHH:MM:SS[.fff]Z`). Fractional seconds are kept at the
//! precision they were written with, so the display text is not fixed width.
//! Ordering goes through [`Timestamp::sort_key`] instead of the text.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static DATE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

static DATETIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:?\d{2})?$").unwrap()
});

/// A parsed timestamp with its normalized text form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    /// Normalized RFC3339 text in UTC, fraction kept when present
    pub text: String,
    /// Seconds since the Unix epoch
    pub epoch: i64,
    /// Sub-second part in nanoseconds
    pub nanos: u32,
}

impl Timestamp {
    fn from_utc(dt: DateTime<Utc>) -> Self {
        Self {
            text: dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            epoch: dt.timestamp(),
            nanos: dt.timestamp_subsec_nanos(),
        }
    }

    /// Chronological ordering key
    pub fn sort_key(&self) -> (i64, u32) {
        (self.epoch, self.nanos)
    }
}

/// Check whether a string is a date or date-time value
pub fn is_datetime(value: &str) -> bool {
    parse_datetime(value).is_some()
}

/// Parse a date or date-time string
///
/// Accepts RFC3339 timestamps, timestamps without an offset (read as UTC),
/// a space instead of `T`, and bare `YYYY-MM-DD` dates (midnight UTC).
/// Anything else returns `None`; callers treat such values as plain strings.
pub fn parse_datetime(value: &str) -> Option<Timestamp> {
    let value = value.trim();

    if DATE_REGEX.is_match(value) {
        let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return Some(Timestamp::from_utc(midnight.and_utc()));
    }

    if !DATETIME_REGEX.is_match(value) {
        return None;
    }

    let candidate = value.replacen(' ', "T", 1);
    if let Ok(dt) = DateTime::parse_from_rfc3339(&candidate) {
        return Some(Timestamp::from_utc(dt.with_timezone(&Utc)));
    }
    // Offsets written without a colon, e.g. +0200
    if let Ok(dt) = DateTime::parse_from_str(&candidate, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(Timestamp::from_utc(dt.with_timezone(&Utc)));
    }
    let naive = NaiveDateTime::parse_from_str(&candidate, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    Some(Timestamp::from_utc(naive.and_utc()))
}
