//! Calendar and time window models.
//!
//! Defines when classes may meet: the range of operating dates, the
//! operating hours of each day, and breaks within the day.
//!
//! # Time Model
//! Clock times are minutes since midnight (`0..=1440`). Dates are
//! `chrono::NaiveDate`; no time zone is involved.
//!
//! # Precedence
//! Breaks override the operating day. An interval is operating iff:
//! - It lies entirely inside `operating_day`, AND
//! - It does NOT overlap any entry of `breaks`.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Minutes in a day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A clock interval [start, end) within a day.
///
/// Half-open interval: includes start, excludes end. Serialized as
/// `"HH:MM"` strings; `"24:00"` denotes the end of the day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    /// Interval start (minutes since midnight, inclusive).
    #[serde(rename = "start", with = "clock")]
    pub start_minute: u32,
    /// Interval end (minutes since midnight, exclusive).
    #[serde(rename = "end", with = "clock")]
    pub end_minute: u32,
}

impl TimeWindow {
    /// Creates a new time window from minutes since midnight.
    pub fn new(start_minute: u32, end_minute: u32) -> Self {
        Self {
            start_minute,
            end_minute,
        }
    }

    /// Creates a window from hour/minute pairs.
    pub fn hm(start_hour: u32, start_min: u32, end_hour: u32, end_min: u32) -> Self {
        Self::new(start_hour * 60 + start_min, end_hour * 60 + end_min)
    }

    /// Length of this window (minutes).
    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        self.end_minute.saturating_sub(self.start_minute)
    }

    /// Whether a clock minute falls within this window.
    #[inline]
    pub fn contains(&self, minute: u32) -> bool {
        minute >= self.start_minute && minute < self.end_minute
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_minute < other.end_minute && other.start_minute < self.end_minute
    }

    /// Whether `other` lies entirely inside this window.
    pub fn covers(&self, other: &Self) -> bool {
        other.start_minute >= self.start_minute && other.end_minute <= self.end_minute
    }
}

/// Operating calendar for a scheduling horizon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Calendar {
    /// First operating date.
    pub first_day: NaiveDate,
    /// Last operating date (inclusive).
    pub last_day: NaiveDate,
    /// Hours during which classes may meet.
    pub operating_day: TimeWindow,
    /// Periods inside the operating day when nothing may meet.
    #[serde(default)]
    pub breaks: Vec<TimeWindow>,
    /// Length of one discrete block (minutes).
    #[serde(default = "default_block_minutes")]
    pub block_minutes: u32,
}

fn default_block_minutes() -> u32 {
    15
}

impl Calendar {
    /// Creates a calendar open around the clock in 15-minute blocks.
    pub fn new(first_day: NaiveDate, last_day: NaiveDate) -> Self {
        Self {
            first_day,
            last_day,
            operating_day: TimeWindow::new(0, MINUTES_PER_DAY),
            breaks: Vec::new(),
            block_minutes: default_block_minutes(),
        }
    }

    /// Monday through Friday, 08:00-17:00 with a lunch break 11:30-13:00.
    pub fn school_week(monday: NaiveDate) -> Self {
        Self::new(monday, monday + Duration::days(4))
            .with_operating_day(TimeWindow::hm(8, 0, 17, 0))
            .with_break(TimeWindow::hm(11, 30, 13, 0))
    }

    /// Sets the operating hours.
    pub fn with_operating_day(mut self, window: TimeWindow) -> Self {
        self.operating_day = window;
        self
    }

    /// Adds a break.
    pub fn with_break(mut self, window: TimeWindow) -> Self {
        self.breaks.push(window);
        self
    }

    /// Sets the block length.
    pub fn with_block_minutes(mut self, minutes: u32) -> Self {
        self.block_minutes = minutes;
        self
    }

    /// Number of dates in the horizon (0 if `last_day < first_day`).
    pub fn day_count(&self) -> usize {
        let days = (self.last_day - self.first_day).num_days() + 1;
        days.max(0) as usize
    }

    /// All dates in the horizon, in order.
    pub fn days(&self) -> Vec<NaiveDate> {
        self.first_day
            .iter_days()
            .take(self.day_count())
            .collect()
    }

    /// Number of blocks per day.
    pub fn blocks_per_day(&self) -> usize {
        if self.block_minutes == 0 {
            return 0;
        }
        (MINUTES_PER_DAY / self.block_minutes) as usize
    }

    /// Whether the clock interval [start, end) is usable for a class.
    pub fn is_operating(&self, start_minute: u32, end_minute: u32) -> bool {
        let interval = TimeWindow::new(start_minute, end_minute);
        self.operating_day.covers(&interval) && !self.breaks.iter().any(|b| b.overlaps(&interval))
    }

    /// Usable minutes per day: operating hours minus breaks.
    pub fn operating_minutes_per_day(&self) -> u32 {
        let blocked: u32 = self
            .breaks
            .iter()
            .filter_map(|b| overlap_minutes(&self.operating_day, b))
            .sum();
        self.operating_day.duration_minutes().saturating_sub(blocked)
    }
}

/// Overlap length between two windows.
fn overlap_minutes(a: &TimeWindow, b: &TimeWindow) -> Option<u32> {
    let start = a.start_minute.max(b.start_minute);
    let end = a.end_minute.min(b.end_minute);
    if end > start {
        Some(end - start)
    } else {
        None
    }
}

/// Parses `"HH:MM"` into minutes since midnight. Accepts `"24:00"`.
pub fn parse_clock(s: &str) -> Option<u32> {
    let (h, m) = s.trim().split_once(':')?;
    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    let total = h.checked_mul(60)?.checked_add(m)?;
    if m >= 60 || total > MINUTES_PER_DAY {
        None
    } else {
        Some(total)
    }
}

/// Formats minutes since midnight as `"HH:MM"`.
pub fn format_clock(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

mod clock {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(minutes: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_clock(*minutes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_clock(&s).ok_or_else(|| D::Error::custom(format!("invalid clock time '{s}'")))
    }
}
