use thiserror::Error;

/// Failures reported by the assignment solvers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssignmentError {
    /// Empty, ragged or negative-valued input; rejected before any solver step runs.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// No finite augmenting path exists for `row`.
    #[error("infeasible: row {row} cannot be assigned at finite cost")]
    Infeasible { row: usize },

    /// An additive adjustment or a cost sum does not fit the cost type.
    #[error("numeric overflow: {0}")]
    NumericOverflow(String),

    /// The caller cancelled the solve between outer iterations.
    #[error("solve cancelled")]
    Cancelled,
}

pub type AssignmentResult<T> = Result<T, AssignmentError>;
