//! Split a date range into day sized windows
//!
//! The preview API only accepts windows of up to 24 hours, so a longer range is covered by a
//! run of consecutive windows. The cursor always advances by a whole day; the final window is
//! clipped to the end of the range and no window is ever emitted twice.

use chrono::{DateTime, Duration, Utc};

use crate::error::AppErrors as Error;
use crate::model::TimeInterval;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimespanSplitter {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimespanSplitter {
    /// Create a splitter for `[start, end)`.
    ///
    /// # Errors
    /// Will return `InvalidDateRange` unless `end` is strictly after `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, Error> {
        if end <= start {
            return Err(Error::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// The contiguous, chronological windows covering the whole range.
    #[must_use]
    pub fn splits(&self) -> Vec<TimeInterval> {
        let one_day = Duration::days(1);
        let mut splits = Vec::new();
        let mut cursor = self.start;

        while cursor < self.end {
            let Some(next) = cursor.checked_add_signed(one_day) else {
                splits.push(TimeInterval::new(cursor, self.end));
                break;
            };
            splits.push(TimeInterval::new(cursor, next.min(self.end)));
            cursor = next;
        }

        splits
    }
}
