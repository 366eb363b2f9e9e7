//! Common utilities shared across CLI commands

use pexplore::{Explorer, HttpSolverClient, Session, SolverConfig};
use pexplore::{BufferPolicy, DisplayOptions};
use std::sync::Arc;

/// Create an explorer talking to the configured solver
pub fn connect(solver: SolverConfig, display: DisplayOptions) -> anyhow::Result<Explorer> {
    let client = HttpSolverClient::new(solver)?;
    Ok(Explorer::new(
        Arc::new(client),
        Session::new(display, BufferPolicy::default()),
    ))
}

/// Automaton statistics and variable order
pub fn render_summary(session: &Session) -> String {
    let Some(automaton) = session.automaton() else {
        return "No automaton built".to_string();
    };
    let mut out = format!(
        "States: {} ({} final)\nVariables: {}",
        automaton.num_states,
        automaton.num_final_states,
        session.order().current().join(", ")
    );
    if session.order().current() != session.order().original() {
        out.push_str(&format!(
            " (built as {})",
            session.order().original().join(", ")
        ));
    }
    out
}

/// Numbered list of revealed examples plus the buffer status line
pub fn render_solutions(session: &Session) -> String {
    let solutions = session.solutions();
    let displayed = solutions.displayed();
    if displayed.is_empty() {
        return "No example solutions".to_string();
    }

    let mut out = String::from("Examples:\n");
    for (i, solution) in displayed.iter().enumerate() {
        out.push_str(&format!("  {:>3}. {}\n", i + 1, solution.assignment()));
    }

    let status = if solutions.is_full_set() && solutions.buffered_len() == 0 {
        "all solutions shown".to_string()
    } else if solutions.is_full_set() {
        format!("{} more, solution set complete", solutions.buffered_len())
    } else if solutions.is_reveal_disabled() {
        "fetching more...".to_string()
    } else {
        format!("{} more ready", solutions.buffered_len())
    };
    out.push_str(&format!("  ({})", status));
    out
}

/// Split a user-typed variable list on commas and whitespace
pub fn parse_order(input: &str) -> Vec<String> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
