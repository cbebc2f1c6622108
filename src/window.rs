//! Half-open time windows.
//!
//! A [`TimeWindow`] is the `[start, end)` interval a caller asks a source to
//! cover. The cache decides reuse and eviction purely through
//! [`TimeWindow::overlaps`] and [`TimeWindow::contains`].

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TripCacheError};

/// Wire format for timestamps supplied by callers and sources.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format used when a window becomes part of a store key.
const KEY_FORMAT: &str = "%Y.%m.%d.%H:%M:%S";

/// A half-open interval of local timestamps.
///
/// `start < end` is expected of callers; [`TimeWindow::new`] does not check
/// it, [`TimeWindow::try_new`] does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// Create a window without validating its bounds.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Create a window, rejecting `start >= end`.
    pub fn try_new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start >= end {
            return Err(TripCacheError::InvalidWindow {
                start: start.format(TIMESTAMP_FORMAT).to_string(),
                end: end.format(TIMESTAMP_FORMAT).to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse a window from two full timestamps.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::try_new(parse_timestamp(start)?, parse_timestamp(end)?)
    }

    /// Parse a search window, expanding date-only bounds with `bounds`.
    ///
    /// `2025-05-01` as a departure becomes `2025-05-01 09:00:00` with the
    /// default bounds, and as an arrival `2025-05-01 23:59:59`.
    pub fn parse_request(departure: &str, arrival: &str, bounds: &DayBounds) -> Result<Self> {
        let start = parse_bound(departure, bounds.departure)?;
        let end = parse_bound(arrival, bounds.arrival)?;
        Self::try_new(start, end)
    }

    /// Whether `instant` lies inside `[start, end)`.
    pub fn includes(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Whether the two windows share at least one instant.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        other.includes(self.start) || self.includes(other.start)
    }

    /// Whether `inner` lies entirely inside this window.
    ///
    /// Both windows must also start on the same calendar date, so a window
    /// crossing midnight never contains one starting the next day.
    pub fn contains(&self, inner: &TimeWindow) -> bool {
        self.start <= inner.start
            && inner.end <= self.end
            && self.start.date() == inner.start.date()
    }

    /// Render the window for use inside a store key.
    pub fn key(&self) -> String {
        format!(
            "{}:{}",
            self.start.format(KEY_FORMAT),
            self.end.format(KEY_FORMAT)
        )
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.start.format(TIMESTAMP_FORMAT),
            self.end.format(TIMESTAMP_FORMAT)
        )
    }
}

/// Times of day used to complete date-only search bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBounds {
    pub departure: NaiveTime,
    pub arrival: NaiveTime,
}

impl Default for DayBounds {
    fn default() -> Self {
        Self {
            departure: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            arrival: NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN),
        }
    }
}

/// Parse a `%Y-%m-%d %H:%M:%S` timestamp.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).map_err(|e| {
        TripCacheError::InvalidTimestamp {
            value: value.to_string(),
            message: e.to_string(),
        }
    })
}

/// Parse a `%H:%M:%S` time of day.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M:%S").map_err(|e| {
        TripCacheError::InvalidTimestamp {
            value: value.to_string(),
            message: e.to_string(),
        }
    })
}

fn parse_bound(value: &str, default_time: NaiveTime) -> Result<NaiveDateTime> {
    let value = value.trim();
    if value.len() == 10 {
        let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
            TripCacheError::InvalidTimestamp {
                value: value.to_string(),
                message: e.to_string(),
            }
        })?;
        return Ok(date.and_time(default_time));
    }
    parse_timestamp(value)
}
