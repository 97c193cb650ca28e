//! Calendar-day identifiers and day-distance arithmetic.
//!
//! All streak branching is driven by whole calendar days, never time-of-day.
//! The day distance is computed from the absolute millisecond difference with
//! ceiling division. A gap that crosses a daylight-saving boundary can
//! therefore measure one day off; the check-in thresholds depend on this
//! exact arithmetic, so it stays a simple subtraction rather than a
//! calendar-aware count.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// A calendar-day identifier in `YYYY-MM-DD` form, independent of
/// time-of-day. Serializes as the plain date string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DayId(NaiveDate);

impl DayId {
    /// Build a day identifier from year/month/day, for fixed test dates.
    /// Returns `None` for out-of-range components.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(DayId)
    }

    /// The day `days` after (or before, when negative) this one.
    pub fn offset(self, days: i64) -> Self {
        DayId(self.0 + chrono::Duration::days(days))
    }
}

impl From<NaiveDate> for DayId {
    fn from(date: NaiveDate) -> Self {
        DayId(date)
    }
}

impl fmt::Display for DayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DayId {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").map(DayId)
    }
}

/// Today's calendar-day identifier from the caller's local clock.
pub fn today() -> DayId {
    DayId(Local::now().date_naive())
}

/// Number of calendar days separating two day identifiers.
///
/// Direction-agnostic: `days_between(a, b) == days_between(b, a)`. Computed
/// as `ceil(|b - a| in ms / ms per day)`.
pub fn days_between(a: DayId, b: DayId) -> u32 {
    let diff_ms = b.0.signed_duration_since(a.0).num_milliseconds().abs();
    (diff_ms as u64).div_ceil(MS_PER_DAY as u64) as u32
}
