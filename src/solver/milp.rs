//! Binary integer programming formulation.
//!
//! # Model
//!
//! - `x[c, s] ∈ {0, 1}` for every candidate slot `s` of class `c`.
//! - Assignment: `Σ_s x[c, s] = 1` for every class.
//! - Room: `Σ x[c, s] ≤ 1` over the slots covering each block.
//! - Objective: minimize `Σ start(s) · x[c, s]`, favouring early placements.
//!
//! Inadmissible slots never get a variable, which fixes them to zero.

use std::time::Instant;

use good_lp::solvers::microlp::microlp;
use good_lp::{constraint, variable, variables, Expression, Solution, SolverModel, Variable};
use tracing::debug;

use super::{SearchStats, Selection, SlotSolver, SolverConfig};
use crate::error::{ScheduleError, ScheduleResult};
use crate::grid::SlotGrid;

/// MILP slot solver backed by good_lp's pure-Rust `microlp` backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct MilpSolver;

impl MilpSolver {
    /// Creates the solver.
    pub fn new() -> Self {
        Self
    }
}

impl SlotSolver for MilpSolver {
    fn name(&self) -> &'static str {
        "milp"
    }

    fn solve(&self, grid: &SlotGrid, _config: &SolverConfig) -> ScheduleResult<Selection> {
        let started = Instant::now();
        let mut vars = variables!();

        // x[class][i] pairs with grid.candidates(class)[i]
        let x: Vec<Vec<Variable>> = (0..grid.class_count())
            .map(|class| {
                grid.candidates(class)
                    .iter()
                    .map(|_| vars.add(variable().binary()))
                    .collect()
            })
            .collect();

        let mut objective = Expression::with_capacity(grid.candidate_count());
        for (class, class_vars) in x.iter().enumerate() {
            for (&start, &var) in grid.candidates(class).iter().zip(class_vars) {
                objective.add_mul(start as f64, var);
            }
        }

        let mut problem = vars.minimise(objective).using(microlp);

        for class_vars in &x {
            let assigned: Expression = class_vars.iter().copied().sum();
            problem = problem.with(constraint!(assigned == 1.0));
        }

        let mut room_rows = 0usize;
        for covering in grid.coverage() {
            if covering.len() < 2 {
                continue;
            }
            let used: Expression = covering
                .iter()
                .map(|slot| {
                    let i = grid
                        .candidates(slot.class)
                        .binary_search(&slot.start)
                        .unwrap_or_default();
                    x[slot.class][i]
                })
                .sum();
            problem = problem.with(constraint!(used <= 1.0));
            room_rows += 1;
        }

        debug!(
            variables = grid.candidate_count(),
            room_rows,
            "milp model built"
        );

        let solution = problem.solve().map_err(|e| match e {
            good_lp::ResolutionError::Infeasible => ScheduleError::Infeasible { nodes: 0 },
            other => ScheduleError::Solver(other.to_string()),
        })?;

        let mut starts = Vec::with_capacity(grid.class_count());
        for (class, class_vars) in x.iter().enumerate() {
            let chosen = grid
                .candidates(class)
                .iter()
                .zip(class_vars)
                .find(|(_, var)| solution.value(**var) > 0.5)
                .map(|(&start, _)| start)
                .ok_or_else(|| {
                    ScheduleError::Solver(format!(
                        "no slot selected for class '{}'",
                        grid.class_id(class)
                    ))
                })?;
            starts.push(chosen);
        }

        Ok(Selection {
            starts,
            stats: SearchStats {
                nodes: 0,
                backtracks: 0,
                elapsed_ms: started.elapsed().as_millis() as u64,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Calendar, CourseClass, TimeWindow};
    use crate::scheduler::ScheduleRequest;
    use crate::solver::verify_selection;
    use chrono::NaiveDate;

    fn tiny_request() -> ScheduleRequest {
        let day = NaiveDate::from_ymd_opt(2017, 10, 16).unwrap();
        let calendar = Calendar::new(day, day)
            .with_operating_day(TimeWindow::hm(9, 0, 13, 0))
            .with_break(TimeWindow::hm(11, 0, 12, 0))
            .with_block_minutes(60);
        ScheduleRequest::new(calendar)
            .with_class(CourseClass::new("a", "A"))
            .with_class(CourseClass::new("b", "B").with_hours(2.0))
    }

    #[test]
    fn test_milp_finds_only_feasible_layout() {
        let request = tiny_request();
        let grid = SlotGrid::build(&request).unwrap();
        let sel = MilpSolver::new()
            .solve(&grid, &SolverConfig::default())
            .unwrap();
        assert!(verify_selection(&grid, &sel));
        assert_eq!(sel.starts, vec![12, 9]);
    }

    #[test]
    fn test_milp_infeasible() {
        let request = tiny_request().with_class(CourseClass::new("c", "C").with_hours(2.0));
        let grid = SlotGrid::build(&request).unwrap();
        let err = MilpSolver::new()
            .solve(&grid, &SolverConfig::default())
            .unwrap_err();
        assert!(matches!(err, ScheduleError::Infeasible { .. }));
    }
}
