//! Timetable quality metrics (KPIs).
//!
//! Computes room-usage indicators from a completed schedule and the
//! calendar it was built on.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Scheduled minutes | Sum of all session lengths |
//! | Operating minutes | Usable minutes over the horizon (hours minus breaks) |
//! | Utilization | Scheduled / operating |
//! | Idle minutes | Usable gaps between consecutive sessions on the same day |
//! | First start / last end | Earliest session start, latest session end |

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::models::{Calendar, Schedule, TimeWindow};

/// Timetable performance indicators.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleKpi {
    /// Total contact time across all sessions (minutes).
    pub scheduled_minutes: i64,
    /// Usable room time over the horizon (minutes).
    pub operating_minutes: i64,
    /// Fraction of usable time that is booked (0.0..1.0).
    pub utilization: f64,
    /// Per-date utilization.
    pub utilization_by_day: BTreeMap<NaiveDate, f64>,
    /// Usable minutes left between sessions on the same day.
    pub idle_minutes: i64,
    /// Earliest session start.
    pub first_start: Option<NaiveDateTime>,
    /// Latest session end.
    pub last_end: Option<NaiveDateTime>,
    /// Number of sessions.
    pub session_count: usize,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule and its calendar.
    pub fn calculate(schedule: &Schedule, calendar: &Calendar) -> Self {
        let per_day = calendar.operating_minutes_per_day() as i64;
        let days = calendar.days();
        let operating_minutes = per_day * days.len() as i64;

        let sessions = schedule.sessions();
        let scheduled_minutes: i64 = sessions.iter().map(|s| s.duration_minutes()).sum();

        let mut utilization_by_day = BTreeMap::new();
        let mut idle_minutes = 0;
        for day in days {
            let today: Vec<_> = sessions
                .iter()
                .filter(|s| s.start.date() == day)
                .collect();
            let booked: i64 = today.iter().map(|s| s.duration_minutes()).sum();
            utilization_by_day.insert(day, ratio(booked, per_day));

            for pair in today.windows(2) {
                if pair[1].start > pair[0].end {
                    let gap = TimeWindow::new(clock(pair[0].end), clock(pair[1].start));
                    idle_minutes += usable_minutes(calendar, &gap);
                }
            }
        }

        Self {
            scheduled_minutes,
            operating_minutes,
            utilization: ratio(scheduled_minutes, operating_minutes),
            utilization_by_day,
            idle_minutes,
            first_start: sessions.iter().map(|s| s.start).min(),
            last_end: sessions.iter().map(|s| s.end).max(),
            session_count: sessions.len(),
        }
    }

    /// Whether the schedule books at least `min_utilization` of the room.
    pub fn meets_threshold(&self, min_utilization: f64) -> bool {
        self.utilization >= min_utilization
    }
}

fn ratio(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn clock(t: NaiveDateTime) -> u32 {
    t.hour() * 60 + t.minute()
}

/// Minutes of `gap` that fall inside operating hours and outside breaks.
fn usable_minutes(calendar: &Calendar, gap: &TimeWindow) -> i64 {
    let day = calendar.operating_day;
    let start = gap.start_minute.max(day.start_minute);
    let end = gap.end_minute.min(day.end_minute);
    if end <= start {
        return 0;
    }
    let blocked: u32 = calendar
        .breaks
        .iter()
        .map(|b| {
            let s = b.start_minute.max(start);
            let e = b.end_minute.min(end);
            e.saturating_sub(s)
        })
        .sum();
    (end - start).saturating_sub(blocked) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Placement, Session};
    use chrono::Duration;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 10, 16).unwrap()
    }

    fn placement(id: &str, starts: &[(i64, u32, u32)], minutes: i64) -> Placement {
        Placement {
            class_id: id.into(),
            name: id.into(),
            sessions: starts
                .iter()
                .enumerate()
                .map(|(i, &(d, h, m))| {
                    let start = (monday() + Duration::days(d)).and_hms_opt(h, m, 0).unwrap();
                    Session {
                        class_id: id.into(),
                        occurrence: i as u32 + 1,
                        start,
                        end: start + Duration::minutes(minutes),
                    }
                })
                .collect(),
        }
    }

    #[test]
    fn test_kpi_basic() {
        let cal = Calendar::school_week(monday());
        let mut s = Schedule::new();
        s.add_placement(placement("6", &[(0, 8, 0), (2, 8, 0), (4, 8, 0)], 120));
        s.add_placement(placement("4", &[(0, 13, 0)], 180));

        let kpi = ScheduleKpi::calculate(&s, &cal);
        assert_eq!(kpi.scheduled_minutes, 540);
        assert_eq!(kpi.operating_minutes, 2250); // 450 x 5
        assert!((kpi.utilization - 0.24).abs() < 1e-10);
        assert_eq!(kpi.session_count, 4);
        assert_eq!(kpi.first_start, Some(monday().and_hms_opt(8, 0, 0).unwrap()));
        assert_eq!(
            kpi.last_end,
            Some((monday() + Duration::days(4)).and_hms_opt(10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_kpi_by_day() {
        let cal = Calendar::school_week(monday());
        let mut s = Schedule::new();
        s.add_placement(placement("6", &[(0, 8, 0), (2, 8, 0), (4, 8, 0)], 120));
        s.add_placement(placement("4", &[(0, 13, 0)], 180));

        let kpi = ScheduleKpi::calculate(&s, &cal);
        assert_eq!(kpi.utilization_by_day.len(), 5);
        // Mon: 300 / 450
        assert!((kpi.utilization_by_day[&monday()] - 300.0 / 450.0).abs() < 1e-10);
        assert!((kpi.utilization_by_day[&(monday() + Duration::days(1))]).abs() < 1e-10);
    }

    #[test]
    fn test_idle_minutes_skip_breaks() {
        let cal = Calendar::school_week(monday());
        let mut s = Schedule::new();
        // Mon 08:00-10:00, then 13:00-16:00: gap 10:00-13:00 minus lunch 11:30-13:00
        s.add_placement(placement("6", &[(0, 8, 0)], 120));
        s.add_placement(placement("4", &[(0, 13, 0)], 180));

        let kpi = ScheduleKpi::calculate(&s, &cal);
        assert_eq!(kpi.idle_minutes, 90);
    }

    #[test]
    fn test_kpi_empty() {
        let cal = Calendar::school_week(monday());
        let kpi = ScheduleKpi::calculate(&Schedule::new(), &cal);
        assert_eq!(kpi.scheduled_minutes, 0);
        assert_eq!(kpi.session_count, 0);
        assert!(kpi.first_start.is_none());
        assert!((kpi.utilization - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_meets_threshold() {
        let cal = Calendar::school_week(monday());
        let mut s = Schedule::new();
        s.add_placement(placement("4", &[(0, 13, 0)], 180));
        let kpi = ScheduleKpi::calculate(&s, &cal);
        assert!(kpi.meets_threshold(0.05));
        assert!(!kpi.meets_threshold(0.5));
    }
}
