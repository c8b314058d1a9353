//! Errors raised by payout evaluation, hedge solving and record ingestion.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, HedgeError>;

/// Errors from the hedging engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HedgeError {
    /// Malformed wager or odds (negative wager, odds outside `(0, 1)`).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// More unknowns than the operation can resolve.
    #[error("Underdetermined: {0}")]
    Underdetermined(String),

    /// Nothing left to solve for.
    #[error("Overdetermined: {0}")]
    Overdetermined(String),

    /// No wager or odds satisfies the payout relation.
    #[error("No solution: {0}")]
    NoSolution(String),

    /// The requested unknown cannot be solved for this bet kind.
    #[error("Unsupported solve: {0}")]
    UnsupportedSolve(String),

    /// An event record failed validation at the ingestion boundary.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}
