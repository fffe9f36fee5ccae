//! Depth-first branch-and-bound over slots.
//!
//! # Algorithm
//!
//! 1. Order every candidate slot "most constrained first": pinned slots,
//!    then by start block (fill the week from its beginning), then by
//!    class order (by default, classes with more sessions first).
//! 2. Walk the order. At each slot try value 1 (place the class here)
//!    before value 0 (skip). Value 1 requires the class to be unplaced
//!    and all its blocks free.
//! 3. Bound: abandon a branch when some unplaced class has no candidate
//!    left in the order. With forward checking, also reject a placement
//!    that leaves an unplaced class no fitting candidate later on.
//! 4. The first complete assignment wins.
//!
//! The tree is walked with an explicit stack of value-1 decisions, so depth
//! never exceeds the number of classes.
//!
//! # Complexity
//! Worst case exponential in the number of classes; the ordering and
//! bounds keep typical weekly catalogs near-linear in candidate count.

use std::cmp::Reverse;
use std::time::Instant;

use tracing::{debug, trace};

use super::{ClassOrder, SearchStats, Selection, SlotSolver, SolverConfig};
use crate::error::{ScheduleError, ScheduleResult};
use crate::grid::{Slot, SlotGrid};

/// Nodes between wall-clock checks.
const CLOCK_INTERVAL: u64 = 256;

/// Depth-first branch-and-bound slot solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchAndBound;

impl BranchAndBound {
    /// Creates the solver.
    pub fn new() -> Self {
        Self
    }
}

impl SlotSolver for BranchAndBound {
    fn name(&self) -> &'static str {
        "branch_and_bound"
    }

    fn solve(&self, grid: &SlotGrid, config: &SolverConfig) -> ScheduleResult<Selection> {
        let started = Instant::now();
        let mut search = Search::new(grid, config.class_order);
        let result = search.run(config, started);
        let stats = SearchStats {
            nodes: search.nodes,
            backtracks: search.backtracks,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        debug!(
            solver = self.name(),
            nodes = stats.nodes,
            backtracks = stats.backtracks,
            elapsed_ms = stats.elapsed_ms,
            found = result.is_ok(),
            "search finished"
        );
        result.map(|starts| Selection { starts, stats })
    }
}

/// Rank of each class under a tie-break order (0 = first).
fn class_ranks(grid: &SlotGrid, order: ClassOrder) -> Vec<usize> {
    let mut classes: Vec<usize> = (0..grid.class_count()).collect();
    match order {
        ClassOrder::MostRecurrencesFirst => {
            classes.sort_by_key(|&c| (Reverse(grid.recurrences(c)), c));
        }
        ClassOrder::LongestFirst => {
            classes.sort_by_key(|&c| (Reverse(grid.recurrences(c) * grid.blocks_needed(c)), c));
        }
        ClassOrder::Declared => {}
    }
    let mut ranks = vec![0; classes.len()];
    for (rank, &class) in classes.iter().enumerate() {
        ranks[class] = rank;
    }
    ranks
}

struct Search<'a> {
    grid: &'a SlotGrid,
    /// Slots in visiting order.
    order: Vec<Slot>,
    /// Occupied blocks of each entry of `order`.
    footprint: Vec<Vec<usize>>,
    /// Positions in `order` of each class's slots, ascending.
    positions: Vec<Vec<usize>>,
    taken: Vec<bool>,
    starts: Vec<Option<usize>>,
    placed: usize,
    nodes: u64,
    backtracks: u64,
}

impl<'a> Search<'a> {
    fn new(grid: &'a SlotGrid, class_order: ClassOrder) -> Self {
        let ranks = class_ranks(grid, class_order);

        let mut order: Vec<Slot> = (0..grid.class_count())
            .flat_map(|class| {
                grid.candidates(class)
                    .iter()
                    .map(move |&start| Slot { class, start })
            })
            .collect();
        order.sort_by_key(|s| (!grid.is_pinned(s.class), s.start, ranks[s.class]));

        let footprint = order
            .iter()
            .map(|s| grid.occupied_blocks(s.class, s.start))
            .collect();

        let mut positions = vec![Vec::new(); grid.class_count()];
        for (pos, slot) in order.iter().enumerate() {
            positions[slot.class].push(pos);
        }

        Self {
            grid,
            order,
            footprint,
            positions,
            taken: vec![false; grid.timeline().len()],
            starts: vec![None; grid.class_count()],
            placed: 0,
            nodes: 0,
            backtracks: 0,
        }
    }

    fn fits(&self, pos: usize) -> bool {
        self.footprint[pos].iter().all(|&b| !self.taken[b])
    }

    fn place(&mut self, pos: usize) {
        let slot = self.order[pos];
        for &b in &self.footprint[pos] {
            self.taken[b] = true;
        }
        self.starts[slot.class] = Some(slot.start);
        self.placed += 1;
    }

    fn unplace(&mut self, pos: usize) {
        let slot = self.order[pos];
        for &b in &self.footprint[pos] {
            self.taken[b] = false;
        }
        self.starts[slot.class] = None;
        self.placed -= 1;
    }

    /// Whether an unplaced class has run out of slots at `pos`.
    fn exhausted(&self, pos: usize) -> bool {
        self.starts.iter().enumerate().any(|(class, start)| {
            start.is_none()
                && self.positions[class]
                    .last()
                    .map_or(true, |&last| last < pos)
        })
    }

    /// Whether every unplaced class still fits somewhere after `pos`.
    fn all_have_room(&self, pos: usize) -> bool {
        (0..self.grid.class_count())
            .filter(|&class| self.starts[class].is_none())
            .all(|class| {
                let list = &self.positions[class];
                let from = list.partition_point(|&p| p <= pos);
                list[from..].iter().any(|&p| self.fits(p))
            })
    }

    fn run(&mut self, config: &SolverConfig, started: Instant) -> ScheduleResult<Vec<usize>> {
        let class_count = self.grid.class_count();
        let mut decisions: Vec<usize> = Vec::with_capacity(class_count);
        let mut pos = 0;

        loop {
            if self.placed == class_count {
                return Ok(self.starts.iter().map(|s| s.unwrap_or_default()).collect());
            }

            if pos >= self.order.len() || self.exhausted(pos) {
                // Undo the most recent value-1 decision and take its value-0 branch.
                let Some(last) = decisions.pop() else {
                    return Err(ScheduleError::Infeasible { nodes: self.nodes });
                };
                self.unplace(last);
                self.backtracks += 1;
                trace!(pos = last, "backtrack");
                pos = last + 1;
                continue;
            }

            let slot = self.order[pos];
            if self.starts[slot.class].is_none() && self.fits(pos) {
                if let Some(limit) = config.node_limit {
                    if self.nodes >= limit {
                        return Err(ScheduleError::NodeLimit { nodes: self.nodes });
                    }
                }
                if let Some(limit_ms) = config.time_limit_ms {
                    if self.nodes % CLOCK_INTERVAL == 0
                        && started.elapsed().as_millis() as u64 >= limit_ms
                    {
                        return Err(ScheduleError::TimeLimit {
                            limit_ms,
                            nodes: self.nodes,
                        });
                    }
                }

                self.nodes += 1;
                self.place(pos);
                if config.forward_check && !self.all_have_room(pos) {
                    self.unplace(pos);
                    self.backtracks += 1;
                } else {
                    decisions.push(pos);
                }
            }
            pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Calendar, CourseClass, TimeWindow};
    use crate::scheduler::ScheduleRequest;
    use crate::solver::verify_selection;
    use chrono::NaiveDate;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 10, 16).unwrap()
    }

    /// One day in hourly blocks: open 09:00-13:00, closed 11:00-12:00.
    /// Operating blocks are 9, 10 and 12.
    fn tiny_calendar() -> Calendar {
        Calendar::new(monday(), monday())
            .with_operating_day(TimeWindow::hm(9, 0, 13, 0))
            .with_break(TimeWindow::hm(11, 0, 12, 0))
            .with_block_minutes(60)
    }

    #[test]
    fn test_solves_example_week() {
        let request = ScheduleRequest::example_week();
        let grid = SlotGrid::build(&request).unwrap();
        let sel = BranchAndBound::new()
            .solve(&grid, &SolverConfig::default())
            .unwrap();
        assert_eq!(sel.starts.len(), 10);
        assert!(verify_selection(&grid, &sel));
        assert!(sel.stats.nodes >= 10);
    }

    #[test]
    fn test_fills_from_start_of_week() {
        // English 101 is the first three-session class in the catalog,
        // so it takes Monday 08:00.
        let request = ScheduleRequest::example_week();
        let grid = SlotGrid::build(&request).unwrap();
        let sel = BranchAndBound::new()
            .solve(&grid, &SolverConfig::default())
            .unwrap();
        let english = 1;
        assert_eq!(sel.starts[english], 32);
        // Linear Algebra I follows at 09:30.
        let linear_algebra = 5;
        assert_eq!(sel.starts[linear_algebra], 38);
    }

    #[test]
    fn test_declared_order_tie_break() {
        let request = ScheduleRequest::new(tiny_calendar())
            .with_class(CourseClass::new("a", "A"))
            .with_class(CourseClass::new("b", "B"));
        let grid = SlotGrid::build(&request).unwrap();
        let cfg = SolverConfig::default().with_class_order(ClassOrder::Declared);
        let sel = BranchAndBound::new().solve(&grid, &cfg).unwrap();
        assert_eq!(sel.starts, vec![9, 10]);
    }

    #[test]
    fn test_backtracks_out_of_greedy_trap() {
        // A grabs 09:00 first, which leaves the two-hour class B nowhere.
        let request = ScheduleRequest::new(tiny_calendar())
            .with_class(CourseClass::new("a", "A"))
            .with_class(CourseClass::new("b", "B").with_hours(2.0));
        let grid = SlotGrid::build(&request).unwrap();
        let cfg = SolverConfig::default()
            .with_class_order(ClassOrder::Declared)
            .with_forward_check(false);
        let sel = BranchAndBound::new().solve(&grid, &cfg).unwrap();
        assert!(verify_selection(&grid, &sel));
        assert_eq!(sel.starts, vec![12, 9]);
        assert_eq!(sel.stats.backtracks, 1);
    }

    #[test]
    fn test_forward_check_rejects_blocking_placement() {
        let request = ScheduleRequest::new(tiny_calendar())
            .with_class(CourseClass::new("a", "A"))
            .with_class(CourseClass::new("b", "B").with_hours(2.0));
        let grid = SlotGrid::build(&request).unwrap();
        let cfg = SolverConfig::default().with_class_order(ClassOrder::Declared);
        let sel = BranchAndBound::new().solve(&grid, &cfg).unwrap();
        assert_eq!(sel.starts, vec![12, 9]);
        assert_eq!(sel.stats.nodes, 3);
        assert_eq!(sel.stats.backtracks, 1);
    }

    #[test]
    fn test_infeasible() {
        // Both two-hour classes can only run 09:00-11:00.
        let request = ScheduleRequest::new(tiny_calendar())
            .with_class(CourseClass::new("a", "A").with_hours(2.0))
            .with_class(CourseClass::new("b", "B").with_hours(2.0));
        let grid = SlotGrid::build(&request).unwrap();
        let err = BranchAndBound::new()
            .solve(&grid, &SolverConfig::default())
            .unwrap_err();
        assert!(matches!(err, ScheduleError::Infeasible { .. }));
    }

    #[test]
    fn test_node_limit() {
        let request = ScheduleRequest::example_week();
        let grid = SlotGrid::build(&request).unwrap();
        let cfg = SolverConfig::default().with_node_limit(3);
        let err = BranchAndBound::new().solve(&grid, &cfg).unwrap_err();
        assert!(matches!(err, ScheduleError::NodeLimit { nodes: 3 }));
    }

    #[test]
    fn test_time_limit() {
        let request = ScheduleRequest::example_week();
        let grid = SlotGrid::build(&request).unwrap();
        let cfg = SolverConfig::default().with_time_limit_ms(0);
        let err = BranchAndBound::new().solve(&grid, &cfg).unwrap_err();
        assert!(matches!(err, ScheduleError::TimeLimit { limit_ms: 0, .. }));
    }

    #[test]
    fn test_generous_time_limit_still_solves() {
        let request = ScheduleRequest::example_week();
        let grid = SlotGrid::build(&request).unwrap();
        let cfg = SolverConfig::default().with_time_limit_ms(60_000);
        let sel = BranchAndBound::new().solve(&grid, &cfg).unwrap();
        assert!(verify_selection(&grid, &sel));
    }

    #[test]
    fn test_longest_first_avoids_greedy_trap() {
        // The two-hour class outranks A and claims 09:00 before A can.
        let request = ScheduleRequest::new(tiny_calendar())
            .with_class(CourseClass::new("a", "A"))
            .with_class(CourseClass::new("b", "B").with_hours(2.0));
        let grid = SlotGrid::build(&request).unwrap();
        let cfg = SolverConfig::default()
            .with_class_order(ClassOrder::LongestFirst)
            .with_forward_check(false);
        let sel = BranchAndBound::new().solve(&grid, &cfg).unwrap();
        assert_eq!(sel.starts, vec![12, 9]);
        assert_eq!(sel.stats.nodes, 2);
        assert_eq!(sel.stats.backtracks, 0);
    }

    #[test]
    fn test_pinned_slot_placed_first() {
        let pin = monday().and_hms_opt(10, 0, 0).unwrap();
        let request = ScheduleRequest::new(tiny_calendar())
            .with_class(CourseClass::new("a", "A"))
            .with_class(CourseClass::new("b", "B").pinned_at(pin));
        let grid = SlotGrid::build(&request).unwrap();
        let sel = BranchAndBound::new()
            .solve(&grid, &SolverConfig::default())
            .unwrap();
        assert_eq!(sel.starts, vec![9, 10]);
    }

    #[test]
    fn test_class_ranks() {
        let request = ScheduleRequest::example_week();
        let grid = SlotGrid::build(&request).unwrap();
        let ranks = class_ranks(&grid, ClassOrder::MostRecurrencesFirst);
        // English 101 and Linear Algebra I are the two triples
        assert_eq!(ranks[1], 0);
        assert_eq!(ranks[5], 1);
        assert_eq!(ranks[9], 9); // Orientation 101 last

        // Weekly blocks: Linear Algebra I 24, Supply Chain 300 20, English 101 18
        let longest = class_ranks(&grid, ClassOrder::LongestFirst);
        assert_eq!(longest[5], 0);
        assert_eq!(longest[8], 1);
        assert_eq!(longest[1], 2);
        assert!(longest[5] < longest[1]);
        assert_eq!(longest[9], 9); // Orientation 101, 4 blocks

        let declared = class_ranks(&grid, ClassOrder::Declared);
        assert_eq!(declared, (0..10).collect::<Vec<_>>());
    }
}
