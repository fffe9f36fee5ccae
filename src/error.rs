//! Error types for request loading, slot-grid construction, and solving.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::validation::ValidationError;

/// Unified error type for scheduling operations.
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// The request failed input validation. All detected problems are kept.
    #[error("invalid schedule request: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),

    /// A class cannot start anywhere in the horizon.
    #[error("class '{class_id}' has no admissible start slot")]
    NoCandidateSlots { class_id: String },

    /// A pinned start falls on an inadmissible slot.
    #[error("class '{class_id}' is pinned to {start}, which is not an admissible slot")]
    PinnedSlotUnavailable {
        class_id: String,
        start: NaiveDateTime,
    },

    /// The search tree was exhausted without a complete assignment.
    #[error("no feasible schedule exists (explored {nodes} nodes)")]
    Infeasible { nodes: u64 },

    /// The node budget ran out before a schedule was found.
    #[error("search stopped after {nodes} nodes without finding a schedule")]
    NodeLimit { nodes: u64 },

    /// The time budget ran out before a schedule was found.
    #[error("search exceeded its {limit_ms} ms time limit after {nodes} nodes")]
    TimeLimit { limit_ms: u64, nodes: u64 },

    /// The selected backend was not compiled in.
    #[error("solver backend '{0}' is not available in this build")]
    BackendUnavailable(String),

    /// The external solver failed.
    #[error("solver error: {0}")]
    Solver(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Convenience alias for results carrying a [`ScheduleError`].
pub type ScheduleResult<T> = Result<T, ScheduleError>;

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_invalid_message_lists_all_errors() {
        let err = ScheduleError::Invalid(vec![
            ValidationError::new(ValidationErrorKind::EmptyCatalog, "no classes"),
            ValidationError::new(ValidationErrorKind::DuplicateId, "duplicate class ID: 1"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("no classes"));
        assert!(msg.contains("duplicate class ID: 1"));
    }

    #[test]
    fn test_parse_error_conversion() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: ScheduleError = parse.unwrap_err().into();
        assert!(matches!(err, ScheduleError::Parse(_)));
    }
}
