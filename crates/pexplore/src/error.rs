//! Error types for explorer sessions

use crate::solver::SolverError;

/// Errors surfaced by session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Build was requested with blank formula text
    #[error("Formula is empty")]
    EmptyFormula,

    /// Operation needs a built automaton
    #[error("No automaton has been built")]
    NoAutomaton,

    /// Requested ordering is not a permutation of the automaton's variables
    #[error("Invalid variable order: {0}")]
    InvalidOrder(String),

    /// The solver call failed; displays the solver's text unchanged
    #[error(transparent)]
    Solver(#[from] SolverError),

    /// Reading a formula file or writing an artifact failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
