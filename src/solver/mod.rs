//! Slot-selection solvers.
//!
//! A solver picks exactly one candidate slot per class from a
//! [`SlotGrid`] so that no two selected slots occupy the same block.
//!
//! # Backends
//!
//! - [`BranchAndBound`]: depth-first binary search over slots with
//!   most-constrained-first ordering. Always available.
//! - `MilpSolver`: binary integer program solved through `good_lp`
//!   (cargo feature `milp`).

mod branch;
#[cfg(feature = "milp")]
mod milp;

pub use branch::BranchAndBound;
#[cfg(feature = "milp")]
pub use milp::MilpSolver;

use serde::{Deserialize, Serialize};

use crate::error::ScheduleResult;
use crate::grid::SlotGrid;

/// Which solver to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverBackend {
    /// Built-in depth-first branch-and-bound.
    #[default]
    BranchAndBound,
    /// Binary integer program via good_lp.
    Milp,
}

impl SolverBackend {
    /// Parses a backend name (`bnb`, `branch_and_bound`, `milp`).
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "bnb" | "branch_and_bound" | "branch-and-bound" => Some(Self::BranchAndBound),
            "milp" | "mip" => Some(Self::Milp),
            _ => None,
        }
    }
}

/// Tie-break order among classes competing for the same start block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassOrder {
    /// More sessions per week first, then catalog order.
    #[default]
    MostRecurrencesFirst,
    /// Larger weekly contact time first, then catalog order.
    LongestFirst,
    /// Catalog order.
    Declared,
}

/// Solver settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Backend to run.
    pub backend: SolverBackend,
    /// Class tie-break order (branch-and-bound only).
    pub class_order: ClassOrder,
    /// Maximum number of placements to try. `None` = unlimited.
    pub node_limit: Option<u64>,
    /// Wall-clock budget (ms). `None` = unlimited.
    pub time_limit_ms: Option<u64>,
    /// Prune placements that leave another class without room.
    pub forward_check: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: SolverBackend::default(),
            class_order: ClassOrder::default(),
            node_limit: None,
            time_limit_ms: None,
            forward_check: true,
        }
    }
}

impl SolverConfig {
    /// Sets the backend.
    pub fn with_backend(mut self, backend: SolverBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Sets the class order.
    pub fn with_class_order(mut self, order: ClassOrder) -> Self {
        self.class_order = order;
        self
    }

    /// Sets the node limit.
    pub fn with_node_limit(mut self, limit: u64) -> Self {
        self.node_limit = Some(limit);
        self
    }

    /// Sets the time limit.
    pub fn with_time_limit_ms(mut self, limit_ms: u64) -> Self {
        self.time_limit_ms = Some(limit_ms);
        self
    }

    /// Enables or disables forward checking.
    pub fn with_forward_check(mut self, enabled: bool) -> Self {
        self.forward_check = enabled;
        self
    }
}

/// Counters from a solver run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Placements tried.
    pub nodes: u64,
    /// Placements undone.
    pub backtracks: u64,
    /// Wall-clock time (ms).
    pub elapsed_ms: u64,
}

/// A solver's answer: the chosen start block per class.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Start block of each class, in catalog order.
    pub starts: Vec<usize>,
    /// Run statistics.
    pub stats: SearchStats,
}

/// A slot-selection algorithm.
pub trait SlotSolver {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Selects one candidate slot per class with no shared blocks.
    fn solve(&self, grid: &SlotGrid, config: &SolverConfig) -> ScheduleResult<Selection>;
}

/// Runs the backend named in `config`.
pub fn solve_with(grid: &SlotGrid, config: &SolverConfig) -> ScheduleResult<Selection> {
    match config.backend {
        SolverBackend::BranchAndBound => BranchAndBound::new().solve(grid, config),
        SolverBackend::Milp => solve_milp(grid, config),
    }
}

#[cfg(feature = "milp")]
fn solve_milp(grid: &SlotGrid, config: &SolverConfig) -> ScheduleResult<Selection> {
    MilpSolver::new().solve(grid, config)
}

#[cfg(not(feature = "milp"))]
fn solve_milp(_grid: &SlotGrid, _config: &SolverConfig) -> ScheduleResult<Selection> {
    Err(crate::error::ScheduleError::BackendUnavailable("milp".into()))
}

/// Checks that a selection picks admissible, non-overlapping slots.
pub fn verify_selection(grid: &SlotGrid, selection: &Selection) -> bool {
    if selection.starts.len() != grid.class_count() {
        return false;
    }
    let mut taken = vec![false; grid.timeline().len()];
    for (class, &start) in selection.starts.iter().enumerate() {
        if grid.candidates(class).binary_search(&start).is_err() {
            return false;
        }
        for b in grid.occupied_blocks(class, start) {
            if std::mem::replace(&mut taken[b], true) {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parse() {
        assert_eq!(SolverBackend::parse("bnb"), Some(SolverBackend::BranchAndBound));
        assert_eq!(SolverBackend::parse("MILP"), Some(SolverBackend::Milp));
        assert_eq!(SolverBackend::parse("simplex"), None);
    }

    #[test]
    fn test_config_json_defaults() {
        let cfg: SolverConfig = serde_json::from_str(r#"{"node_limit": 500}"#).unwrap();
        assert_eq!(cfg.node_limit, Some(500));
        assert!(cfg.forward_check);
        assert_eq!(cfg.backend, SolverBackend::BranchAndBound);
        assert_eq!(cfg.class_order, ClassOrder::MostRecurrencesFirst);

        let cfg: SolverConfig =
            serde_json::from_str(r#"{"backend": "milp", "class_order": "declared"}"#).unwrap();
        assert_eq!(cfg.backend, SolverBackend::Milp);
        assert_eq!(cfg.class_order, ClassOrder::Declared);
    }

    #[test]
    fn test_config_builder() {
        let cfg = SolverConfig::default()
            .with_node_limit(10)
            .with_time_limit_ms(250)
            .with_forward_check(false)
            .with_class_order(ClassOrder::LongestFirst);
        assert_eq!(cfg.node_limit, Some(10));
        assert_eq!(cfg.time_limit_ms, Some(250));
        assert!(!cfg.forward_check);
        assert_eq!(cfg.class_order, ClassOrder::LongestFirst);
    }

    #[cfg(not(feature = "milp"))]
    #[test]
    fn test_milp_unavailable_without_feature() {
        use crate::error::ScheduleError;

        let request = crate::scheduler::ScheduleRequest::example_week();
        let grid = SlotGrid::build(&request).unwrap();
        let cfg = SolverConfig::default().with_backend(SolverBackend::Milp);
        let err = solve_with(&grid, &cfg).unwrap_err();
        assert!(matches!(err, ScheduleError::BackendUnavailable(_)));
    }
}
