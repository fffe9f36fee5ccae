//! Course class model.
//!
//! A class meets `recurrences` times per week. Every session has the same
//! length and starts at the same clock time, `repetition_gap_days` apart.
//! With the default gap of two days, a three-session class runs
//! Monday/Wednesday/Friday and a two-session class Monday/Wednesday or
//! Tuesday/Thursday.

use chrono::{NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

/// A class to be placed on the weekly timetable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseClass {
    /// Unique class identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Length of each session (minutes).
    pub duration_minutes: u32,
    /// Sessions per week.
    #[serde(default = "default_recurrences")]
    pub recurrences: u32,
    /// Days between consecutive sessions.
    #[serde(default = "default_gap_days")]
    pub repetition_gap_days: u32,
    /// Days the first session may fall on. Empty = any day.
    #[serde(default)]
    pub allowed_start_days: Vec<Weekday>,
    /// Fixed start of the first session, if already decided.
    #[serde(default)]
    pub pinned_start: Option<NaiveDateTime>,
}

fn default_recurrences() -> u32 {
    1
}

fn default_gap_days() -> u32 {
    2
}

impl CourseClass {
    /// Creates a one-hour, single-session class.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration_minutes: 60,
            recurrences: default_recurrences(),
            repetition_gap_days: default_gap_days(),
            allowed_start_days: Vec::new(),
            pinned_start: None,
        }
    }

    /// Sets the session length in hours (rounded to the nearest minute).
    pub fn with_hours(mut self, hours: f64) -> Self {
        self.duration_minutes = (hours * 60.0).round().max(0.0) as u32;
        self
    }

    /// Sets the session length in minutes.
    pub fn with_duration_minutes(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    /// Sets the number of sessions per week.
    pub fn with_recurrences(mut self, recurrences: u32) -> Self {
        self.recurrences = recurrences;
        self
    }

    /// Sets the gap between sessions (days).
    pub fn with_gap_days(mut self, days: u32) -> Self {
        self.repetition_gap_days = days;
        self
    }

    /// Restricts the weekday of the first session.
    pub fn with_start_days(mut self, days: Vec<Weekday>) -> Self {
        self.allowed_start_days = days;
        self
    }

    /// Pins the first session to a fixed start.
    pub fn pinned_at(mut self, start: NaiveDateTime) -> Self {
        self.pinned_start = Some(start);
        self
    }

    /// Session length in hours.
    pub fn hours(&self) -> f64 {
        self.duration_minutes as f64 / 60.0
    }

    /// Blocks each session occupies.
    pub fn blocks_needed(&self, block_minutes: u32) -> usize {
        if block_minutes == 0 {
            return 0;
        }
        self.duration_minutes.div_ceil(block_minutes) as usize
    }

    /// Blocks between the starts of consecutive sessions.
    pub fn gap_blocks(&self, blocks_per_day: usize) -> usize {
        self.repetition_gap_days as usize * blocks_per_day
    }

    /// Total weekly contact time (minutes).
    pub fn weekly_minutes(&self) -> u32 {
        self.duration_minutes * self.recurrences
    }

    /// Whether the first session may start on `day`.
    pub fn allows_start_on(&self, day: Weekday) -> bool {
        self.allowed_start_days.is_empty() || self.allowed_start_days.contains(&day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_builder() {
        let c = CourseClass::new("2", "English 101")
            .with_hours(1.5)
            .with_recurrences(3)
            .with_start_days(vec![Weekday::Mon]);

        assert_eq!(c.duration_minutes, 90);
        assert_eq!(c.recurrences, 3);
        assert_eq!(c.repetition_gap_days, 2);
        assert!((c.hours() - 1.5).abs() < 1e-10);
        assert_eq!(c.weekly_minutes(), 270);
        assert!(c.allows_start_on(Weekday::Mon));
        assert!(!c.allows_start_on(Weekday::Tue));
    }

    #[test]
    fn test_blocks_needed() {
        let c = CourseClass::new("9", "Supply Chain 300").with_hours(2.5);
        assert_eq!(c.blocks_needed(15), 10);
        assert_eq!(c.blocks_needed(60), 3); // partial block rounds up
        assert_eq!(c.blocks_needed(0), 0);
        assert_eq!(c.gap_blocks(96), 192);
    }

    #[test]
    fn test_any_start_day_by_default() {
        let c = CourseClass::new("1", "Psych 101");
        assert!(c.allows_start_on(Weekday::Sat));
    }

    #[test]
    fn test_class_json_defaults() {
        let c: CourseClass =
            serde_json::from_str(r#"{"id":"4","name":"Psych 300","duration_minutes":180}"#)
                .unwrap();
        assert_eq!(c.recurrences, 1);
        assert_eq!(c.repetition_gap_days, 2);
        assert!(c.pinned_start.is_none());
        assert!(c.allowed_start_days.is_empty());
    }
}
