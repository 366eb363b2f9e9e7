//! Explorer session state
//!
//! A [`Session`] holds everything derived from one built automaton: the
//! serialized automaton and its diagram, the variable orderings and the
//! solution cache. It performs no I/O. Every action is split in two:
//!
//! - `begin_*` applies the optimistic part of the action and returns a
//!   ticket holding the solver request to send.
//! - `complete_*` takes the ticket back together with the solver's answer
//!   and applies it in one step.
//!
//! Tickets carry a token. A completion whose token has been superseded (a
//! newer build or reorder was started after it) is discarded without
//! touching state, so the last action *issued* wins regardless of the order
//! in which answers arrive.

use tracing::{debug, info, warn};

use crate::buffer::{ReplenishTicket, SolutionBuffer};
use crate::config::{BufferPolicy, DisplayOptions};
use crate::error::{Result, SessionError};
use crate::order::VariableOrder;
use crate::solver::{
    BuildRequest, BuildResponse, ReorderRequest, ReorderResponse, SolutionsRequest,
    SolutionsResponse, SolverError,
};

/// A built automaton in both serializations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    /// Formula text the automaton was built from (trimmed)
    pub formula: String,
    /// Diagram serialization; replaced when a reorder returns a new one
    pub dot: String,
    /// Machine serialization sent back to the solver
    pub mata: String,
    pub num_states: usize,
    pub num_final_states: usize,
}

/// Whether a completion changed the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// Superseded by a later action and dropped
    Stale,
}

#[derive(Debug, Clone)]
pub struct BuildTicket {
    pub token: u64,
    pub request: BuildRequest,
}

#[derive(Debug, Clone)]
pub struct ReorderTicket {
    pub token: u64,
    pub request: ReorderRequest,
    /// Solutions displayed when the reorder was issued; the answer is split
    /// at this count even if more were revealed while it was in flight
    pub displayed: usize,
}

#[derive(Debug, Clone)]
pub struct ReplenishJob {
    pub ticket: ReplenishTicket,
    pub request: SolutionsRequest,
}

/// Outcome of revealing one more example
#[derive(Debug, Clone, Default)]
pub struct Reveal {
    /// Solutions that became visible
    pub revealed: usize,
    /// Fetch the caller must send to keep the buffer warm
    pub replenish: Option<ReplenishJob>,
}

#[derive(Debug, Clone)]
pub struct Session {
    options: DisplayOptions,
    automaton: Option<Automaton>,
    order: VariableOrder,
    solutions: SolutionBuffer,
    last_error: Option<String>,
    next_token: u64,
    pending_build: Option<u64>,
    pending_reorder: Option<u64>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DisplayOptions::default(), BufferPolicy::default())
    }
}

impl Session {
    pub fn new(options: DisplayOptions, policy: BufferPolicy) -> Self {
        Self {
            options,
            automaton: None,
            order: VariableOrder::default(),
            solutions: SolutionBuffer::new(policy),
            last_error: None,
            next_token: 1,
            pending_build: None,
            pending_reorder: None,
        }
    }

    pub fn options(&self) -> DisplayOptions {
        self.options
    }

    /// Options used by subsequent requests
    pub fn set_options(&mut self, options: DisplayOptions) {
        self.options = options;
    }

    pub fn automaton(&self) -> Option<&Automaton> {
        self.automaton.as_ref()
    }

    pub fn order(&self) -> &VariableOrder {
        &self.order
    }

    pub fn solutions(&self) -> &SolutionBuffer {
        &self.solutions
    }

    /// Message of the most recent failure, cleared when a new action starts
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// A build or reorder is waiting for the solver
    pub fn is_busy(&self) -> bool {
        self.pending_build.is_some() || self.pending_reorder.is_some()
    }

    pub fn is_reveal_disabled(&self) -> bool {
        self.solutions.is_reveal_disabled()
    }

    fn issue_token(&mut self) -> u64 {
        let token = self.next_token;
        self.next_token += 1;
        token
    }

    fn record(&mut self, err: SessionError) -> SessionError {
        self.last_error = Some(err.to_string());
        err
    }

    /// Start building from formula text
    ///
    /// All automaton, ordering and solution state is dropped right away, so
    /// a failed build never leaves the previous automaton on screen.
    pub fn begin_build(&mut self, formula: &str) -> Result<BuildTicket> {
        let formula = formula.trim();
        if formula.is_empty() {
            return Err(self.record(SessionError::EmptyFormula));
        }

        self.automaton = None;
        self.order = VariableOrder::default();
        self.solutions.clear();
        self.pending_reorder = None;
        self.last_error = None;

        let token = self.issue_token();
        self.pending_build = Some(token);
        debug!(token, "Starting build");

        Ok(BuildTicket {
            token,
            request: BuildRequest {
                formula: formula.to_string(),
                display_labels: self.options.display_labels,
                display_atomic_construction: self.options.display_atomic_construction,
            },
        })
    }

    /// Apply the solver's answer to a build
    pub fn complete_build(
        &mut self,
        ticket: BuildTicket,
        result: std::result::Result<BuildResponse, SolverError>,
    ) -> Result<Completion> {
        if self.pending_build != Some(ticket.token) {
            warn!(token = ticket.token, "Discarding superseded build result");
            return Ok(Completion::Stale);
        }
        self.pending_build = None;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "Build failed");
                return Err(self.record(err.into()));
            }
        };

        info!(
            variables = response.variables.len(),
            seed = response.example_solutions.len(),
            states = response.num_states,
            final_states = response.num_final_states,
            "Automaton built"
        );
        self.automaton = Some(Automaton {
            formula: ticket.request.formula,
            dot: response.dot,
            mata: response.mata,
            num_states: response.num_states,
            num_final_states: response.num_final_states,
        });
        self.order = VariableOrder::new(response.variables);
        self.solutions.seed(response.example_solutions);
        Ok(Completion::Applied)
    }

    /// Start a reorder to `new_order`
    ///
    /// `current` is updated immediately. The request asks for as many
    /// solutions as are known now so the user's exploration depth survives.
    pub fn begin_reorder(&mut self, new_order: Vec<String>) -> Result<ReorderTicket> {
        let (aut, formula) = match self.automaton.as_ref() {
            Some(automaton) => (
                automaton.mata.clone(),
                self.options
                    .display_atomic_construction
                    .then(|| automaton.formula.clone()),
            ),
            None => return Err(self.record(SessionError::NoAutomaton)),
        };

        if let Err(err) = self.order.set_current(new_order) {
            return Err(self.record(err));
        }
        self.last_error = None;

        let token = self.issue_token();
        self.pending_reorder = Some(token);
        let request = ReorderRequest {
            aut,
            k_solutions: self.solutions.known_count(),
            original_variable_order: self.order.original().to_vec(),
            new_variable_order: self.order.current().to_vec(),
            display_labels: self.options.display_labels,
            display_atomic_construction: self.options.display_atomic_construction,
            formula,
        };
        debug!(
            token,
            k_solutions = request.k_solutions,
            order = ?request.new_variable_order,
            "Starting reorder"
        );
        Ok(ReorderTicket {
            token,
            request,
            displayed: self.solutions.displayed().len(),
        })
    }

    /// Drag the variable at `from` to `to` and start the matching reorder
    pub fn begin_move(&mut self, from: usize, to: usize) -> Result<ReorderTicket> {
        if self.automaton.is_none() {
            return Err(self.record(SessionError::NoAutomaton));
        }
        match self.order.moved(from, to) {
            Ok(order) => self.begin_reorder(order),
            Err(err) => Err(self.record(err)),
        }
    }

    /// Apply the solver's answer to a reorder
    ///
    /// On failure `current` is rolled back to the ordering the cache still
    /// reflects and nothing else changes.
    pub fn complete_reorder(
        &mut self,
        ticket: ReorderTicket,
        result: std::result::Result<ReorderResponse, SolverError>,
    ) -> Result<Completion> {
        if self.pending_reorder != Some(ticket.token) {
            warn!(token = ticket.token, "Discarding superseded reorder result");
            return Ok(Completion::Stale);
        }
        self.pending_reorder = None;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "Reorder failed, restoring previous order");
                self.order.roll_back();
                return Err(self.record(err.into()));
            }
        };

        if let (Some(dot), Some(automaton)) = (response.dot, self.automaton.as_mut()) {
            automaton.dot = dot;
        }
        self.solutions.replace(
            response.reordered_solutions,
            ticket.displayed,
            ticket.request.k_solutions,
        );
        self.order.commit(ticket.request.new_variable_order);
        info!(
            order = ?self.order.current(),
            known = self.solutions.known_count(),
            full = self.solutions.is_full_set(),
            "Reorder applied"
        );
        Ok(Completion::Applied)
    }

    /// Reveal one more example, possibly asking for a replenishment
    ///
    /// Replenishment requests use the committed ordering, so a batch that
    /// lands while a reorder is still pending matches the cache it joins.
    pub fn reveal_next(&mut self) -> Reveal {
        let outcome = self.solutions.reveal_next();
        let Some(ticket) = outcome.replenish else {
            return Reveal {
                revealed: outcome.revealed,
                replenish: None,
            };
        };

        let request = match self.automaton.as_ref() {
            Some(automaton) => SolutionsRequest {
                aut: automaton.mata.clone(),
                k_solutions: ticket.target_total,
                original_variable_order: self.order.original().to_vec(),
                new_variable_order: self.order.committed().to_vec(),
                display_atomic_construction: self.options.display_atomic_construction,
                formula: self
                    .options
                    .display_atomic_construction
                    .then(|| automaton.formula.clone()),
            },
            None => {
                self.solutions.fail_replenishment(ticket.id);
                return Reveal {
                    revealed: outcome.revealed,
                    replenish: None,
                };
            }
        };
        self.last_error = None;
        Reveal {
            revealed: outcome.revealed,
            replenish: Some(ReplenishJob { ticket, request }),
        }
    }

    /// Apply the solver's answer to a replenishment
    pub fn complete_replenishment(
        &mut self,
        ticket: ReplenishTicket,
        result: std::result::Result<SolutionsResponse, SolverError>,
    ) -> Result<Completion> {
        match result {
            Ok(response) => {
                if self.solutions.apply_replenishment(ticket.id, response) {
                    Ok(Completion::Applied)
                } else {
                    Ok(Completion::Stale)
                }
            }
            Err(err) => {
                if !self.solutions.fail_replenishment(ticket.id) {
                    return Ok(Completion::Stale);
                }
                warn!(error = %err, ticket = ticket.id, "Replenishment failed");
                Err(self.record(err.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferState;
    use crate::solver::ExampleSolution;

    fn vars(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn solutions(range: std::ops::Range<i64>) -> Vec<ExampleSolution> {
        range
            .map(|i| ExampleSolution {
                variables: vars(&["x", "y"]),
                var_ints: [("x".to_string(), i), ("y".to_string(), 0)]
                    .into_iter()
                    .collect(),
                ..ExampleSolution::default()
            })
            .collect()
    }

    fn build_response(count: i64) -> BuildResponse {
        BuildResponse {
            dot: "digraph original {}".to_string(),
            mata: "@NFA-explicit".to_string(),
            variables: vars(&["x", "y"]),
            example_solutions: solutions(0..count),
            num_states: 3,
            num_final_states: 1,
        }
    }

    fn built(count: i64) -> Session {
        let mut session = Session::default();
        let ticket = session.begin_build("  x = y + 1  ").unwrap();
        session
            .complete_build(ticket, Ok(build_response(count)))
            .unwrap();
        session
    }

    fn rejected(message: &str) -> SolverError {
        SolverError::Rejected {
            status: 400,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_build_trims_formula_and_seeds() {
        let mut session = Session::default();
        let ticket = session.begin_build("  x = y + 1\n").unwrap();
        assert_eq!(ticket.request.formula, "x = y + 1");
        assert!(ticket.request.display_labels);
        assert!(session.is_busy());

        session
            .complete_build(ticket, Ok(build_response(12)))
            .unwrap();
        assert!(!session.is_busy());
        let automaton = session.automaton().unwrap();
        assert_eq!(automaton.num_states, 3);
        assert_eq!(automaton.formula, "x = y + 1");
        assert_eq!(session.order().original(), vars(&["x", "y"]).as_slice());
        assert_eq!(session.solutions().displayed().len(), 3);
        assert_eq!(session.solutions().buffered_len(), 9);
    }

    #[test]
    fn test_empty_formula_rejected() {
        let mut session = built(5);
        let err = session.begin_build("   \n").unwrap_err();
        assert!(matches!(err, SessionError::EmptyFormula));
        assert_eq!(session.last_error(), Some("Formula is empty"));
        assert!(session.automaton().is_some());
    }

    #[test]
    fn test_failed_build_clears_previous_state() {
        let mut session = built(12);
        let ticket = session.begin_build("x <").unwrap();
        assert!(session.automaton().is_none());

        let err = session
            .complete_build(ticket, Err(rejected("Syntax error:\nx <")))
            .unwrap_err();
        assert_eq!(err.to_string(), "Syntax error:\nx <");
        assert_eq!(session.last_error(), Some("Syntax error:\nx <"));
        assert!(session.automaton().is_none());
        assert!(session.order().original().is_empty());
        assert_eq!(session.solutions().known_count(), 0);
        assert!(!session.is_busy());
    }

    #[test]
    fn test_older_build_result_discarded() {
        let mut session = Session::default();
        let first = session.begin_build("x = 1").unwrap();
        let second = session.begin_build("x = 2").unwrap();

        let outcome = session.complete_build(first, Ok(build_response(12)));
        assert_eq!(outcome.unwrap(), Completion::Stale);
        assert!(session.automaton().is_none());

        session.complete_build(second, Ok(build_response(4))).unwrap();
        assert_eq!(session.automaton().unwrap().formula, "x = 2");
        assert!(session.solutions().is_full_set());
    }

    #[test]
    fn test_reorder_request_payload() {
        let mut session = built(12);
        session.reveal_next();
        let ticket = session.begin_reorder(vars(&["y", "x"])).unwrap();

        assert_eq!(ticket.request.k_solutions, 12);
        assert_eq!(ticket.request.aut, "@NFA-explicit");
        assert_eq!(ticket.request.original_variable_order, vars(&["x", "y"]));
        assert_eq!(ticket.request.new_variable_order, vars(&["y", "x"]));
        assert!(ticket.request.formula.is_none());
        assert_eq!(session.order().current(), vars(&["y", "x"]).as_slice());
        assert!(session.is_busy());
    }

    #[test]
    fn test_reorder_sends_formula_in_atomic_mode() {
        let mut session = built(12);
        session.set_options(DisplayOptions {
            display_labels: false,
            display_atomic_construction: true,
        });
        let ticket = session.begin_move(0, 1).unwrap();
        assert_eq!(ticket.request.formula.as_deref(), Some("x = y + 1"));
        assert!(!ticket.request.display_labels);
    }

    #[test]
    fn test_reorder_rejects_non_permutation() {
        let mut session = built(12);
        let err = session.begin_reorder(vars(&["x", "z"])).unwrap_err();
        assert!(matches!(err, SessionError::InvalidOrder(_)));
        assert_eq!(session.order().current(), vars(&["x", "y"]).as_slice());
        assert!(!session.is_busy());
    }

    #[test]
    fn test_reorder_without_automaton() {
        let mut session = Session::default();
        let err = session.begin_reorder(vars(&["x"])).unwrap_err();
        assert!(matches!(err, SessionError::NoAutomaton));
    }

    #[test]
    fn test_reorder_replaces_cache_and_diagram() {
        let mut session = built(12);
        session.reveal_next();
        let ticket = session.begin_reorder(vars(&["y", "x"])).unwrap();

        session
            .complete_reorder(
                ticket,
                Ok(ReorderResponse {
                    dot: Some("digraph reordered {}".to_string()),
                    reordered_solutions: solutions(100..112),
                }),
            )
            .unwrap();

        assert_eq!(session.automaton().unwrap().dot, "digraph reordered {}");
        assert_eq!(session.solutions().displayed().len(), 4);
        assert_eq!(session.solutions().displayed()[0].var_ints["x"], 100);
        assert_eq!(session.solutions().buffered_len(), 8);
        assert!(!session.solutions().is_full_set());
        assert_eq!(session.order().committed(), vars(&["y", "x"]).as_slice());
        assert!(!session.is_busy());
    }

    #[test]
    fn test_reorder_null_dot_keeps_diagram() {
        let mut session = built(12);
        let ticket = session.begin_move(1, 0).unwrap();
        session
            .complete_reorder(
                ticket,
                Ok(ReorderResponse {
                    dot: None,
                    reordered_solutions: solutions(0..12),
                }),
            )
            .unwrap();
        assert_eq!(session.automaton().unwrap().dot, "digraph original {}");
    }

    #[test]
    fn test_reorder_short_answer_forces_full_set() {
        let mut session = built(12);
        // 7 displayed, 5 buffered
        for _ in 0..4 {
            assert!(session.reveal_next().replenish.is_none());
        }
        let ticket = session.begin_move(0, 1).unwrap();
        assert_eq!(ticket.request.k_solutions, 12);

        session
            .complete_reorder(
                ticket,
                Ok(ReorderResponse {
                    dot: None,
                    reordered_solutions: solutions(0..6),
                }),
            )
            .unwrap();
        assert!(session.solutions().is_full_set());
        assert_eq!(session.solutions().displayed().len(), 6);
        assert_eq!(session.solutions().buffered_len(), 0);
    }

    #[test]
    fn test_reveals_during_reorder_keep_set_open() {
        let mut session = built(12);
        let ticket = session.begin_reorder(vars(&["y", "x"])).unwrap();
        assert_eq!(ticket.displayed, 3);
        assert_eq!(ticket.request.k_solutions, 12);

        // Drain the old cache while the reorder is in flight
        for _ in 0..9 {
            session.reveal_next();
        }
        assert_eq!(session.solutions().displayed().len(), 12);

        session
            .complete_reorder(
                ticket,
                Ok(ReorderResponse {
                    dot: None,
                    reordered_solutions: solutions(100..112),
                }),
            )
            .unwrap();

        assert!(!session.solutions().is_full_set());
        assert_eq!(session.solutions().state(), BufferState::Idle);
        assert_eq!(session.solutions().displayed().len(), 3);
        assert_eq!(session.solutions().buffered_len(), 9);
        assert_eq!(session.solutions().displayed()[0].var_ints["x"], 100);
    }

    #[test]
    fn test_failed_reorder_rolls_back_order() {
        let mut session = built(12);
        let ticket = session.begin_move(0, 1).unwrap();
        assert_eq!(session.order().current(), vars(&["y", "x"]).as_slice());

        let err = session
            .complete_reorder(ticket, Err(SolverError::Network("refused".to_string())))
            .unwrap_err();
        assert!(matches!(err, SessionError::Solver(_)));
        assert_eq!(session.order().current(), vars(&["x", "y"]).as_slice());
        assert_eq!(session.solutions().known_count(), 12);
        assert_eq!(session.last_error(), Some("Network error: refused"));
    }

    #[test]
    fn test_superseded_reorder_discarded() {
        let mut session = built(12);
        let first = session.begin_move(0, 1).unwrap();
        let second = session.begin_move(0, 1).unwrap();
        assert_eq!(second.request.new_variable_order, vars(&["x", "y"]));

        let stale = session.complete_reorder(first, Err(rejected("boom")));
        assert_eq!(stale.unwrap(), Completion::Stale);
        assert!(session.last_error().is_none());

        let applied = session.complete_reorder(
            second,
            Ok(ReorderResponse {
                dot: Some("digraph second {}".to_string()),
                reordered_solutions: solutions(0..12),
            }),
        );
        assert_eq!(applied.unwrap(), Completion::Applied);
        assert_eq!(session.automaton().unwrap().dot, "digraph second {}");
    }

    #[test]
    fn test_reorder_discarded_after_rebuild() {
        let mut session = built(12);
        let reorder = session.begin_move(0, 1).unwrap();
        let build = session.begin_build("x = 7").unwrap();

        let outcome = session.complete_reorder(
            reorder,
            Ok(ReorderResponse {
                dot: Some("digraph stale {}".to_string()),
                reordered_solutions: solutions(0..12),
            }),
        );
        assert_eq!(outcome.unwrap(), Completion::Stale);
        assert!(session.automaton().is_none());

        session.complete_build(build, Ok(build_response(12))).unwrap();
        assert_eq!(session.automaton().unwrap().dot, "digraph original {}");
    }

    #[test]
    fn test_replenishment_request_uses_committed_order() {
        let mut session = built(12);
        for _ in 0..4 {
            session.reveal_next();
        }
        let _pending = session.begin_move(0, 1).unwrap();

        let reveal = session.reveal_next();
        let job = reveal.replenish.expect("watermark reached");
        assert_eq!(job.request.k_solutions, 17);
        assert_eq!(job.request.new_variable_order, vars(&["x", "y"]));
        assert_eq!(job.request.original_variable_order, vars(&["x", "y"]));
        assert!(job.request.formula.is_none());
    }

    #[test]
    fn test_replenishment_applies_and_fails() {
        let mut session = built(12);
        let job = (0..5)
            .filter_map(|_| session.reveal_next().replenish)
            .last()
            .unwrap();

        let err = session
            .complete_replenishment(job.ticket, Err(rejected("solver down")))
            .unwrap_err();
        assert_eq!(err.to_string(), "solver down");
        assert_eq!(session.solutions().state(), BufferState::Idle);
        assert_eq!(session.solutions().known_count(), 12);

        let retry = session.reveal_next().replenish.unwrap();
        assert!(session.last_error().is_none());
        let outcome = session.complete_replenishment(
            retry.ticket,
            Ok(SolutionsResponse {
                example_solutions: solutions(12..17),
                solution_set_full: false,
            }),
        );
        assert_eq!(outcome.unwrap(), Completion::Applied);
        assert_eq!(session.solutions().known_count(), 17);
    }

    #[test]
    fn test_replenishment_after_reorder_is_stale() {
        let mut session = built(12);
        let job = (0..5)
            .filter_map(|_| session.reveal_next().replenish)
            .last()
            .unwrap();
        let reorder = session.begin_move(0, 1).unwrap();
        session
            .complete_reorder(
                reorder,
                Ok(ReorderResponse {
                    dot: None,
                    reordered_solutions: solutions(200..212),
                }),
            )
            .unwrap();

        let outcome = session.complete_replenishment(
            job.ticket,
            Ok(SolutionsResponse {
                example_solutions: solutions(12..17),
                solution_set_full: true,
            }),
        );
        assert_eq!(outcome.unwrap(), Completion::Stale);
        assert_eq!(session.solutions().known_count(), 12);
        assert!(!session.solutions().is_full_set());
    }
}
