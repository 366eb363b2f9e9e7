//! CLI command implementations
//!
//! Each command is in its own module for better organization.

pub mod build;
pub mod common;
pub mod interactive;

pub use build::{run_build, BuildCmdConfig};
pub use interactive::{run_interactive, InteractiveCmdConfig};
