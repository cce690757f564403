//! Civil time and period derivation.
//!
//! The digest runs against a fixed civil time zone configured as a UTC
//! offset. Each run derives the local calendar date, the start/end-of-day
//! boundaries used by the "edited today" query, and the [`Period`] that
//! selects which digest is sent.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Which half of the day a run belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    /// Before the configured evening hour.
    Morning,
    /// At or after the configured evening hour.
    Evening,
}

impl Period {
    /// Derive the period from a local hour and the configured threshold.
    pub fn from_hour(hour: u32, evening_hour: u32) -> Self {
        if hour < evening_hour {
            Self::Morning
        } else {
            Self::Evening
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Morning => write!(f, "morning"),
            Self::Evening => write!(f, "evening"),
        }
    }
}

/// The local calendar date and its day boundaries.
#[derive(Debug, Clone, Copy)]
pub struct DayBounds {
    /// Local calendar date.
    pub date: NaiveDate,
    /// Midnight at the start of the local day.
    pub start: DateTime<FixedOffset>,
    /// Last second of the local day.
    pub end: DateTime<FixedOffset>,
}

/// Compute the local date and day boundaries for an instant.
pub fn day_bounds(now: DateTime<FixedOffset>) -> DayBounds {
    let date = now.date_naive();
    let offset = *now.offset();
    // Valid for any FixedOffset: plain dates have no DST gaps.
    let start = offset
        .from_local_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())
        .single()
        .unwrap_or(now);
    let end = offset
        .from_local_datetime(&date.and_hms_opt(23, 59, 59).unwrap_or_default())
        .single()
        .unwrap_or(now);
    DayBounds { date, start, end }
}

/// Current instant in the civil zone given as hours east of UTC.
pub fn now_with_offset(utc_offset_hours: i32) -> DateTime<FixedOffset> {
    let offset =
        FixedOffset::east_opt(utc_offset_hours.clamp(-23, 23) * 3600).unwrap_or_else(|| Utc.fix());
    Utc::now().with_timezone(&offset)
}

/// Derive the period of an instant against the configured threshold.
pub fn period_of(now: DateTime<FixedOffset>, evening_hour: u32) -> Period {
    Period::from_hour(now.hour(), evening_hour)
}
