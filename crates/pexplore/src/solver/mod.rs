//! Remote solver client
//!
//! The solver service turns formulas into automata, enumerates example
//! solutions, and recomputes both under a new variable order. This module
//! provides the request/response types and a trait so the session logic can
//! run against the HTTP client or an in-process stand-in.
//!
//! ## Endpoints
//!
//! - `POST /automaton/dot`: build from formula text
//! - `POST /automaton/reorder`: new diagram and solutions under a new order
//! - `POST /automaton/solutions`: solutions up to a target total rank
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pexplore::solver::{BuildRequest, HttpSolverClient, SolverClient};
//! use pexplore::SolverConfig;
//!
//! let client = HttpSolverClient::new(SolverConfig::from_env())?;
//! let built = client
//!     .build(&BuildRequest {
//!         formula: "x + y = 5".to_string(),
//!         display_labels: true,
//!         display_atomic_construction: false,
//!     })
//!     .await?;
//! ```

mod client;
mod http;

pub use client::{
    BuildRequest, BuildResponse, ExampleSolution, ReorderRequest, ReorderResponse, SolverClient,
    SolutionsRequest, SolutionsResponse,
};
pub use http::HttpSolverClient;

/// Error type for solver operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolverError {
    /// Transport failure (connection refused, timeout, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// The solver answered with a non-success status; `message` is the raw body
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Response body was not the expected JSON
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Client could not be configured
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for SolverError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SolverError::Parse(err.to_string())
        } else {
            SolverError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_displays_raw_body() {
        let err = SolverError::Rejected {
            status: 400,
            message: "Syntax error:\n  x + = 3\n     ^".to_string(),
        };
        assert_eq!(err.to_string(), "Syntax error:\n  x + = 3\n     ^");
    }

    #[test]
    fn test_network_error_prefixed() {
        let err = SolverError::Network("connection refused".to_string());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }
}
