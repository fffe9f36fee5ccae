//! Schedule request: everything needed to build a timetable.
//!
//! Requests are plain serde data so they can be stored as JSON:
//!
//! ```json
//! {
//!   "calendar": {
//!     "first_day": "2017-10-16",
//!     "last_day": "2017-10-20",
//!     "operating_day": { "start": "08:00", "end": "17:00" },
//!     "breaks": [{ "start": "11:30", "end": "13:00" }],
//!     "block_minutes": 15
//!   },
//!   "classes": [
//!     { "id": "1", "name": "Psych 101", "duration_minutes": 60, "recurrences": 2 }
//!   ]
//! }
//! ```

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ScheduleResult;
use crate::models::{Calendar, CourseClass, StartDayRule};
use crate::solver::SolverConfig;

/// Input container for scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Operating calendar.
    pub calendar: Calendar,
    /// Classes to place.
    pub classes: Vec<CourseClass>,
    /// Start-day rules applied to every class.
    #[serde(default)]
    pub start_day_rules: Vec<StartDayRule>,
    /// Solver settings.
    #[serde(default)]
    pub solver: SolverConfig,
}

impl ScheduleRequest {
    /// Creates a request with no classes.
    pub fn new(calendar: Calendar) -> Self {
        Self {
            calendar,
            classes: Vec::new(),
            start_day_rules: Vec::new(),
            solver: SolverConfig::default(),
        }
    }

    /// Adds a class.
    pub fn with_class(mut self, class: CourseClass) -> Self {
        self.classes.push(class);
        self
    }

    /// Replaces the class catalog.
    pub fn with_classes(mut self, classes: Vec<CourseClass>) -> Self {
        self.classes = classes;
        self
    }

    /// Adds a start-day rule.
    pub fn with_rule(mut self, rule: StartDayRule) -> Self {
        self.start_day_rules.push(rule);
        self
    }

    /// Sets solver settings.
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Parses a request from JSON.
    pub fn from_json_str(json: &str) -> ScheduleResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a request from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> ScheduleResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading schedule request");
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> ScheduleResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Finds a class by ID.
    pub fn class(&self, class_id: &str) -> Option<&CourseClass> {
        self.classes.iter().find(|c| c.id == class_id)
    }

    /// Ten-class sample catalog on the school week of 2017-10-16.
    pub fn example_week() -> Self {
        let monday = NaiveDate::from_ymd_opt(2017, 10, 16).unwrap_or(NaiveDate::MIN);
        let classes = [
            ("1", "Psych 101", 1.0, 2),
            ("2", "English 101", 1.5, 3),
            ("3", "Math 300", 1.5, 2),
            ("4", "Psych 300", 3.0, 1),
            ("5", "Calculus I", 2.0, 2),
            ("6", "Linear Algebra I", 2.0, 3),
            ("7", "Sociology 101", 1.0, 2),
            ("8", "Biology 101", 1.0, 2),
            ("9", "Supply Chain 300", 2.5, 2),
            ("10", "Orientation 101", 1.0, 1),
        ];

        Self::new(Calendar::school_week(monday)).with_classes(
            classes
                .iter()
                .map(|&(id, name, hours, recurrences)| {
                    CourseClass::new(id, name)
                        .with_hours(hours)
                        .with_recurrences(recurrences)
                })
                .collect(),
        )
    }
}
