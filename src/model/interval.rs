//! Time intervals and date parsing
//!
//! All timestamps in this crate are UTC. Dates given on the command line are read for
//! their wall-clock fields only: any offset in the input is discarded, not applied.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::AppErrors as Error;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A half-open `[start, end)` window of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeInterval {
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }

    /// Start as whole seconds since the Unix epoch (sub-second precision is truncated)
    #[must_use]
    pub fn start_epoch(&self) -> i64 {
        self.start.timestamp()
    }

    /// End as whole seconds since the Unix epoch (sub-second precision is truncated)
    #[must_use]
    pub fn end_epoch(&self) -> i64 {
        self.end.timestamp()
    }
}

/// Parse a date or date-time string, taking its wall-clock fields as UTC.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM[:SS[.f]]` (with either a space or `T`), and a bare
/// `YYYY-MM-DD` which means midnight.
///
/// # Errors
/// Will return `DateParseError` if the input matches none of the accepted forms.
pub fn parse_utc(input: &str) -> Result<DateTime<Utc>, Error> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.naive_local().and_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::DateParseError(input.to_string()))
}
