//! Timetable construction and KPI evaluation.
//!
//! [`ClassScheduler`] runs the full pipeline:
//!
//! 1. Validate the request.
//! 2. Build the slot grid (fixing inadmissible slots to zero).
//! 3. Select one slot per class with the configured backend.
//! 4. Decode the selection into sessions.
//! 5. Re-check the timetable and attach any violations.
//!
//! `ScheduleKpi` reports room utilization and idle time.

mod kpi;
mod request;

pub use kpi::ScheduleKpi;
pub use request::ScheduleRequest;

use chrono::Duration;
use tracing::{info, warn};

use crate::error::{ScheduleError, ScheduleResult};
use crate::grid::SlotGrid;
use crate::models::{Placement, Schedule, Session};
use crate::solver::{solve_with, Selection, SolverConfig};
use crate::validation::{check_schedule, validate_request};

/// Weekly classroom scheduler.
///
/// # Example
///
/// ```
/// use classroom_scheduler::scheduler::{ClassScheduler, ScheduleRequest};
///
/// let request = ScheduleRequest::example_week();
/// let schedule = ClassScheduler::for_request(&request).schedule(&request).unwrap();
/// assert_eq!(schedule.placement_count(), 10);
/// assert!(schedule.is_valid());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClassScheduler {
    config: SolverConfig,
}

impl ClassScheduler {
    /// Creates a scheduler with explicit solver settings.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Creates a scheduler using the settings embedded in `request`.
    pub fn for_request(request: &ScheduleRequest) -> Self {
        Self::new(request.solver.clone())
    }

    /// Solver settings in use.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Builds a timetable for `request`.
    ///
    /// # Errors
    /// - [`ScheduleError::Invalid`] if the request fails validation.
    /// - Grid errors (pins, classes with no room) from [`SlotGrid::build`].
    /// - Solver errors (infeasible, limits, backend unavailable).
    pub fn schedule(&self, request: &ScheduleRequest) -> ScheduleResult<Schedule> {
        validate_request(request).map_err(ScheduleError::Invalid)?;

        let grid = SlotGrid::build(request)?;
        let selection = solve_with(&grid, &self.config)?;

        let mut schedule = decode(request, &grid, &selection);
        for violation in check_schedule(request, &schedule) {
            warn!(class = %violation.entity_id, "{}", violation.message);
            schedule.add_violation(violation);
        }

        info!(
            backend = ?self.config.backend,
            classes = schedule.placement_count(),
            nodes = selection.stats.nodes,
            backtracks = selection.stats.backtracks,
            elapsed_ms = selection.stats.elapsed_ms,
            violations = schedule.violations.len(),
            "timetable built"
        );
        Ok(schedule)
    }
}

/// Expands chosen start blocks into per-session placements.
fn decode(request: &ScheduleRequest, grid: &SlotGrid, selection: &Selection) -> Schedule {
    let mut schedule = Schedule::new();
    let blocks = grid.timeline().blocks();

    for (class, &start) in request.classes.iter().zip(&selection.starts) {
        let first = blocks[start].start();
        let sessions = (0..class.recurrences)
            .map(|k| {
                let begin = first + Duration::days((k * class.repetition_gap_days) as i64);
                Session {
                    class_id: class.id.clone(),
                    occurrence: k + 1,
                    start: begin,
                    end: begin + Duration::minutes(class.duration_minutes as i64),
                }
            })
            .collect();
        schedule.add_placement(Placement {
            class_id: class.id.clone(),
            name: class.name.clone(),
            sessions,
        });
    }

    schedule.stats = Some(selection.stats);
    schedule
}
