// Crate-level lint configuration for pedantic clippy
#![allow(clippy::must_use_candidate)] // Getters don't need must_use
#![allow(clippy::module_name_repetitions)] // solver::SolverClient is clear
#![allow(clippy::missing_errors_doc)] // Errors are the solver's text
#![allow(clippy::doc_markdown)] // Missing backticks - low priority
#![allow(clippy::uninlined_format_args)] // Named args are clearer
#![allow(clippy::return_self_not_must_use)] // Builder methods don't need must_use

//! # pexplore
//!
//! Client-side core for exploring automata built from Presburger arithmetic
//! formulas by a remote solver.
//!
//! The solver turns a formula into a finite automaton and enumerates example
//! solutions. This crate keeps the client side of that exchange consistent:
//!
//! - **Solution buffer**: a displayed prefix plus a prefetched hidden buffer,
//!   refilled from the solver before it runs dry
//! - **Variable order**: optimistic drag-reorder with a solver round trip that
//!   replaces the cached solutions while preserving exploration depth
//! - **Session**: build orchestration and stale-response handling, with no I/O
//! - **Explorer**: async driver that sends the session's requests
//!
//! ## Example
//!
//! ```rust,no_run
//! use pexplore::{Explorer, HttpSolverClient, SolverConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpSolverClient::new(SolverConfig::from_env())?;
//! let mut explorer = Explorer::with_client(Arc::new(client));
//!
//! explorer.build("exists z. x = 2 * z").await?;
//! explorer.reveal_next();
//! explorer.move_variable(0, 1).await?;
//! explorer.settle().await?;
//!
//! for solution in explorer.session().solutions().displayed() {
//!     println!("{}", solution.assignment());
//! }
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod explorer;
pub mod export;
pub mod order;
pub mod session;
pub mod solver;

pub use buffer::{BufferState, ReplenishTicket, RevealOutcome, SolutionBuffer};
pub use config::{BufferPolicy, DisplayOptions, SolverConfig};
pub use error::{Result, SessionError};
pub use explorer::Explorer;
pub use export::{export_artifacts, ExportedArtifacts};
pub use order::VariableOrder;
pub use session::{Automaton, Completion, Reveal, Session};
pub use solver::{ExampleSolution, HttpSolverClient, SolverClient, SolverError};
