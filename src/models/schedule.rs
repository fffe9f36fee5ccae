//! Schedule (solution) model.
//!
//! A schedule places every class of a request on the timetable. Each
//! placement expands into one session per weekly recurrence. It may
//! include constraint violations found when the result is re-checked.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::solver::SearchStats;

/// A complete timetable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    /// One placement per class, in catalog order.
    pub placements: Vec<Placement>,
    /// Constraint violations detected in this schedule.
    pub violations: Vec<Violation>,
    /// Search statistics of the run that produced this schedule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<SearchStats>,
}

/// A single meeting of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Owning class ID.
    pub class_id: String,
    /// Occurrence number within the week (1-based).
    pub occurrence: u32,
    /// Session start.
    pub start: NaiveDateTime,
    /// Session end (exclusive).
    pub end: NaiveDateTime,
}

impl Session {
    /// Session length (minutes).
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Whether two sessions share any time.
    pub fn overlaps(&self, other: &Session) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// All sessions of one class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placement {
    /// Class ID.
    pub class_id: String,
    /// Class name (denormalized for display).
    pub name: String,
    /// Sessions in occurrence order.
    pub sessions: Vec<Session>,
}

impl Placement {
    /// Start of the first session.
    pub fn start(&self) -> Option<NaiveDateTime> {
        self.sessions.first().map(|s| s.start)
    }

    /// End of the first session.
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.sessions.first().map(|s| s.end)
    }

    /// Weekdays on which the class meets, in session order.
    pub fn weekdays(&self) -> Vec<Weekday> {
        self.sessions.iter().map(|s| s.start.weekday()).collect()
    }

    /// Length of a session (minutes).
    pub fn duration_minutes(&self) -> i64 {
        self.sessions
            .first()
            .map(|s| s.duration_minutes())
            .unwrap_or(0)
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days = self
            .weekdays()
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join("/");
        match (self.start(), self.end()) {
            (Some(start), Some(end)) => write!(
                f,
                "{}- {} {}-{}",
                self.name,
                days,
                start.format("%H:%M"),
                end.format("%H:%M")
            ),
            _ => write!(f, "{}- unscheduled", self.name),
        }
    }
}

/// A constraint violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related class ID.
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of constraint violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Two sessions share the room at the same time.
    Overlap,
    /// A session falls outside operating hours or inside a break.
    OutsideOperatingHours,
    /// A class in the catalog has no placement.
    MissingClass,
    /// Session count, spacing, or length disagrees with the class.
    RecurrenceMismatch,
    /// First session is on a weekday the rules forbid.
    StartDayRule,
    /// Domain-specific violation.
    Custom(String),
}

impl Violation {
    fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
        severity: i32,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
            severity,
        }
    }

    /// Creates an overlap violation.
    pub fn overlap(class_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ViolationType::Overlap, class_id, message, 95)
    }

    /// Creates an outside-operating-hours violation.
    pub fn outside_hours(class_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ViolationType::OutsideOperatingHours, class_id, message, 90)
    }

    /// Creates a missing-class violation.
    pub fn missing_class(class_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ViolationType::MissingClass, class_id, message, 100)
    }

    /// Creates a recurrence mismatch violation.
    pub fn recurrence_mismatch(class_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ViolationType::RecurrenceMismatch, class_id, message, 80)
    }

    /// Creates a start-day rule violation.
    pub fn start_day(class_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ViolationType::StartDayRule, class_id, message, 50)
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a placement.
    pub fn add_placement(&mut self, placement: Placement) {
        self.placements.push(placement);
    }

    /// Adds a violation.
    pub fn add_violation(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Whether the schedule has no violations.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Finds the placement of a class.
    pub fn placement_for(&self, class_id: &str) -> Option<&Placement> {
        self.placements.iter().find(|p| p.class_id == class_id)
    }

    /// All sessions, sorted by start.
    pub fn sessions(&self) -> Vec<&Session> {
        let mut sessions: Vec<&Session> =
            self.placements.iter().flat_map(|p| p.sessions.iter()).collect();
        sessions.sort_by_key(|s| s.start);
        sessions
    }

    /// Sessions held on a date, sorted by start.
    pub fn sessions_on(&self, date: NaiveDate) -> Vec<&Session> {
        self.sessions()
            .into_iter()
            .filter(|s| s.start.date() == date)
            .collect()
    }

    /// Placements sorted by first-session start.
    pub fn sorted_by_start(&self) -> Vec<&Placement> {
        let mut placements: Vec<&Placement> = self.placements.iter().collect();
        placements.sort_by_key(|p| p.start());
        placements
    }

    /// Total scheduled contact time across all sessions (minutes).
    pub fn scheduled_minutes(&self) -> i64 {
        self.placements
            .iter()
            .flat_map(|p| p.sessions.iter())
            .map(|s| s.duration_minutes())
            .sum()
    }

    /// Number of placements.
    pub fn placement_count(&self) -> usize {
        self.placements.len()
    }
}
