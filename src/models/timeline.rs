//! Discrete block timeline.
//!
//! Splits every date of a [`Calendar`] into fixed-length blocks, covering
//! the whole day (nights included). Because every day holds the same number
//! of blocks, "same time N days later" is always `N * blocks_per_day`
//! blocks away.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use super::calendar::{Calendar, MINUTES_PER_DAY};

/// A discrete chunk of time a class session can occupy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Position on the timeline.
    pub index: usize,
    /// Day offset from the first operating date.
    pub day: usize,
    /// Calendar date.
    pub date: NaiveDate,
    /// Block start (minutes since midnight).
    pub start_minute: u32,
    /// Block end (minutes since midnight, exclusive).
    pub end_minute: u32,
    /// Whether this block lies in operating hours outside any break.
    pub operating: bool,
}

impl Block {
    /// Start of the block.
    pub fn start(&self) -> NaiveDateTime {
        self.date.and_time(NaiveTime::MIN) + Duration::minutes(self.start_minute as i64)
    }

    /// End of the block.
    pub fn end(&self) -> NaiveDateTime {
        self.date.and_time(NaiveTime::MIN) + Duration::minutes(self.end_minute as i64)
    }

    /// Day of week of the block.
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }
}

/// All blocks of a calendar horizon in time order.
#[derive(Debug, Clone)]
pub struct Timeline {
    blocks: Vec<Block>,
    blocks_per_day: usize,
    block_minutes: u32,
    first_day: NaiveDate,
}

impl Timeline {
    /// Builds the timeline for a calendar.
    pub fn from_calendar(calendar: &Calendar) -> Self {
        let per_day = calendar.blocks_per_day();
        let step = calendar.block_minutes;
        let mut blocks = Vec::with_capacity(per_day * calendar.day_count());

        for (day, date) in calendar.days().into_iter().enumerate() {
            for k in 0..per_day {
                let start_minute = k as u32 * step;
                let end_minute = start_minute + step;
                blocks.push(Block {
                    index: blocks.len(),
                    day,
                    date,
                    start_minute,
                    end_minute,
                    operating: calendar.is_operating(start_minute, end_minute),
                });
            }
        }

        Self {
            blocks,
            blocks_per_day: per_day,
            block_minutes: step,
            first_day: calendar.first_day,
        }
    }

    /// All blocks.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Block at a position.
    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the timeline has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Blocks per day.
    pub fn blocks_per_day(&self) -> usize {
        self.blocks_per_day
    }

    /// Block length (minutes).
    pub fn block_minutes(&self) -> u32 {
        self.block_minutes
    }

    /// Index of the block starting exactly at `at`, if any.
    pub fn index_of(&self, at: NaiveDateTime) -> Option<usize> {
        if self.block_minutes == 0 {
            return None;
        }
        let day = (at.date() - self.first_day).num_days();
        if day < 0 {
            return None;
        }
        let minute = at.hour() * 60 + at.minute();
        if at.second() != 0 || minute % self.block_minutes != 0 {
            return None;
        }
        let index = day as usize * self.blocks_per_day + (minute / self.block_minutes) as usize;
        (index < self.blocks.len()).then_some(index)
    }

    /// Number of operating blocks.
    pub fn operating_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.operating).count()
    }
}

/// Labels every `increment_minutes` step of a day as `HH:MM:SS`.
///
/// With a 5-minute increment this yields 288 labels, `00:00:00` through
/// `23:55:00`. Returns an empty list for a zero increment.
pub fn time_of_day_labels(increment_minutes: u32) -> Vec<String> {
    if increment_minutes == 0 {
        return Vec::new();
    }
    (0..MINUTES_PER_DAY)
        .step_by(increment_minutes as usize)
        .map(|m| format!("{:02}:{:02}:00", m / 60, m % 60))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calendar() -> Calendar {
        Calendar::school_week(NaiveDate::from_ymd_opt(2017, 10, 16).unwrap())
    }

    #[test]
    fn test_timeline_covers_whole_days() {
        let tl = Timeline::from_calendar(&calendar());
        assert_eq!(tl.len(), 5 * 96);
        assert_eq!(tl.blocks_per_day(), 96);

        let first = tl.block(0).unwrap();
        assert_eq!(first.start_minute, 0);
        assert!(!first.operating);
        assert_eq!(first.weekday(), Weekday::Mon);

        let last = tl.block(tl.len() - 1).unwrap();
        assert_eq!(last.weekday(), Weekday::Fri);
        assert_eq!(last.end_minute, 1440);
    }

    #[test]
    fn test_operating_blocks() {
        let tl = Timeline::from_calendar(&calendar());
        // 450 operating minutes per day / 15 = 30 blocks, 5 days
        assert_eq!(tl.operating_count(), 150);

        let eight = tl.block(32).unwrap();
        assert_eq!(eight.start_minute, 480);
        assert!(eight.operating);
    }

    #[test]
    fn test_index_of() {
        let tl = Timeline::from_calendar(&calendar());
        let wed_ten = NaiveDate::from_ymd_opt(2017, 10, 18)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let idx = tl.index_of(wed_ten).unwrap();
        assert_eq!(idx, 2 * 96 + 40);
        assert_eq!(tl.block(idx).unwrap().start(), wed_ten);

        let off_grid = wed_ten + Duration::minutes(7);
        assert_eq!(tl.index_of(off_grid), None);

        let saturday = NaiveDate::from_ymd_opt(2017, 10, 21)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert_eq!(tl.index_of(saturday), None);
    }

    #[test]
    fn test_block_end_crosses_midnight() {
        let tl = Timeline::from_calendar(&calendar());
        let b = tl.block(95).unwrap();
        assert_eq!(b.end().date(), NaiveDate::from_ymd_opt(2017, 10, 17).unwrap());
    }

    #[test]
    fn test_five_minute_labels() {
        let labels = time_of_day_labels(5);
        assert_eq!(labels.len(), 288);
        assert_eq!(labels[0], "00:00:00");
        assert_eq!(labels[1], "00:05:00");
        assert_eq!(labels[287], "23:55:00");
        assert!(time_of_day_labels(0).is_empty());
    }
}
