//! Input validation and schedule conflict detection.
//!
//! [`validate_request`] checks structural integrity of a request before
//! any slot grid is built. Detects:
//! - Malformed calendars (empty horizon, bad block length, breaks outside
//!   the day)
//! - Duplicate class IDs and empty catalogs
//! - Durations and recurrences that cannot be laid on the block grid
//! - Pins outside the horizon or off the block grid
//!
//! [`check_schedule`] re-checks a finished timetable independently of the
//! solver: room overlaps, sessions outside operating hours, missing
//! classes, wrong recurrence patterns, and start-day rule breaches.

use std::collections::HashSet;
use std::fmt;

use chrono::{Datelike, Timelike};

use crate::models::{rules_permit, Schedule, Violation, MINUTES_PER_DAY};
use crate::scheduler::ScheduleRequest;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Calendar cannot produce a usable timeline.
    InvalidCalendar,
    /// The request contains no classes.
    EmptyCatalog,
    /// Two classes share the same ID.
    DuplicateId,
    /// Session length is zero or not a whole number of blocks.
    InvalidDuration,
    /// Session count or gap is unusable.
    InvalidRecurrence,
    /// Recurring sessions cannot all fit inside the date range.
    RecurrenceSpan,
    /// A pinned start is outside the horizon or off the block grid.
    InvalidPin,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a schedule request.
///
/// Checks:
/// 1. `last_day` is not before `first_day`
/// 2. Block length is non-zero and divides a day
/// 3. Operating day is non-empty and breaks lie inside the day
/// 4. The catalog is non-empty and class IDs are unique
/// 5. Every duration is a positive multiple of the block length
/// 6. Every class has at least one session, and a positive gap if it has more
/// 7. `(recurrences - 1) * gap` days fit within the date range
/// 8. Pinned starts fall inside the horizon on a block boundary
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_request(request: &ScheduleRequest) -> ValidationResult {
    let mut errors = Vec::new();
    let cal = &request.calendar;

    if cal.last_day < cal.first_day {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidCalendar,
            format!(
                "last day {} is before first day {}",
                cal.last_day, cal.first_day
            ),
        ));
    }

    let block_ok = cal.block_minutes > 0 && MINUTES_PER_DAY % cal.block_minutes == 0;
    if !block_ok {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidCalendar,
            format!(
                "block length of {} minutes does not divide a day",
                cal.block_minutes
            ),
        ));
    }

    let day = cal.operating_day;
    if day.start_minute >= day.end_minute || day.end_minute > MINUTES_PER_DAY {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidCalendar,
            "operating day is empty or extends past midnight",
        ));
    }
    for b in &cal.breaks {
        if b.start_minute >= b.end_minute || !day.covers(b) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCalendar,
                format!(
                    "break {}-{} is not an interval inside operating hours",
                    crate::models::format_clock(b.start_minute),
                    crate::models::format_clock(b.end_minute)
                ),
            ));
        }
    }

    if request.classes.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyCatalog,
            "request has no classes",
        ));
    }

    let mut ids = HashSet::new();
    let day_count = cal.day_count() as u32;
    for class in &request.classes {
        if !ids.insert(class.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("duplicate class ID: {}", class.id),
            ));
        }

        if class.duration_minutes == 0
            || (block_ok && class.duration_minutes % cal.block_minutes != 0)
        {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDuration,
                format!(
                    "class '{}' lasts {} minutes, not a positive multiple of {}-minute blocks",
                    class.id, class.duration_minutes, cal.block_minutes
                ),
            ));
        }

        if class.recurrences == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidRecurrence,
                format!("class '{}' has no sessions", class.id),
            ));
        } else if class.recurrences > 1 && class.repetition_gap_days == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidRecurrence,
                format!(
                    "class '{}' repeats {} times with a zero-day gap",
                    class.id, class.recurrences
                ),
            ));
        } else {
            // None = overflow, which no horizon can hold
            let span = (class.recurrences - 1).checked_mul(class.repetition_gap_days);
            if day_count > 0 && span.map_or(true, |s| s >= day_count) {
                let needed = span.map_or_else(|| "too many".to_string(), |s| (s as u64 + 1).to_string());
                errors.push(ValidationError::new(
                    ValidationErrorKind::RecurrenceSpan,
                    format!(
                        "class '{}' needs {} days between first and last session, horizon has {}",
                        class.id, needed, day_count
                    ),
                ));
            }
        }

        if let Some(pin) = class.pinned_start {
            let in_range = pin.date() >= cal.first_day && pin.date() <= cal.last_day;
            let minute = pin.hour() * 60 + pin.minute();
            let on_grid = block_ok && pin.second() == 0 && minute % cal.block_minutes == 0;
            if !in_range || !on_grid {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidPin,
                    format!(
                        "class '{}' is pinned to {}, outside the horizon or off the block grid",
                        class.id, pin
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Re-checks a timetable against its request.
///
/// Returns every violation found; an empty list means the schedule is
/// conflict-free.
pub fn check_schedule(request: &ScheduleRequest, schedule: &Schedule) -> Vec<Violation> {
    let mut violations = Vec::new();
    let cal = &request.calendar;

    for class in &request.classes {
        let Some(placement) = schedule.placement_for(&class.id) else {
            violations.push(Violation::missing_class(
                &class.id,
                format!("class '{}' ({}) is not scheduled", class.id, class.name),
            ));
            continue;
        };

        if placement.sessions.len() != class.recurrences as usize {
            violations.push(Violation::recurrence_mismatch(
                &class.id,
                format!(
                    "class '{}' has {} sessions, expected {}",
                    class.id,
                    placement.sessions.len(),
                    class.recurrences
                ),
            ));
        }

        for pair in placement.sessions.windows(2) {
            let gap = pair[1].start - pair[0].start;
            if gap.num_days() != class.repetition_gap_days as i64 || gap.num_seconds() % 86_400 != 0 {
                violations.push(Violation::recurrence_mismatch(
                    &class.id,
                    format!(
                        "sessions {} and {} of class '{}' are not {} days apart",
                        pair[0].occurrence, pair[1].occurrence, class.id, class.repetition_gap_days
                    ),
                ));
            }
        }

        for session in &placement.sessions {
            if session.duration_minutes() != class.duration_minutes as i64 {
                violations.push(Violation::recurrence_mismatch(
                    &class.id,
                    format!(
                        "session {} of class '{}' lasts {} minutes, expected {}",
                        session.occurrence,
                        class.id,
                        session.duration_minutes(),
                        class.duration_minutes
                    ),
                ));
            }

            let date = session.start.date();
            let start = session.start.hour() * 60 + session.start.minute();
            let end = start as i64 + session.duration_minutes();
            let in_dates = date >= cal.first_day && date <= cal.last_day;
            let in_hours = end <= MINUTES_PER_DAY as i64 && cal.is_operating(start, end as u32);
            if !in_dates || !in_hours {
                violations.push(Violation::outside_hours(
                    &class.id,
                    format!(
                        "session {} of class '{}' at {} is outside operating hours",
                        session.occurrence, class.id, session.start
                    ),
                ));
            }
        }

        if let Some(first) = placement.sessions.first() {
            let weekday = first.start.weekday();
            if !class.allows_start_on(weekday)
                || !rules_permit(&request.start_day_rules, class, weekday)
            {
                violations.push(Violation::start_day(
                    &class.id,
                    format!("class '{}' may not start on {}", class.id, weekday),
                ));
            }
        }
    }

    let sessions = schedule.sessions();
    for (i, a) in sessions.iter().enumerate() {
        for b in sessions[i + 1..].iter().take_while(|b| b.start < a.end) {
            if a.overlaps(b) {
                violations.push(Violation::overlap(
                    &b.class_id,
                    format!(
                        "'{}' session {} overlaps '{}' session {} at {}",
                        a.class_id, a.occurrence, b.class_id, b.occurrence, b.start
                    ),
                ));
            }
        }
    }

    violations
}
