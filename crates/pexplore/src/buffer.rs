//! Progressive solution buffer
//!
//! Solutions known to the client are split into a `displayed` prefix the
//! user has already seen and a hidden `buffer` that was prefetched. Each
//! reveal moves one solution across; when the hidden part runs low the
//! buffer asks its owner to fetch more, so the user never waits on the
//! solver for "one more example".
//!
//! The buffer does not talk to the solver itself. [`SolutionBuffer::reveal_next`]
//! hands back a [`ReplenishTicket`] when a fetch is due, and the owner reports
//! the outcome through [`SolutionBuffer::apply_replenishment`] or
//! [`SolutionBuffer::fail_replenishment`]. Results for tickets that are no
//! longer outstanding are dropped.

use std::collections::VecDeque;

use tracing::debug;

use crate::config::BufferPolicy;
use crate::solver::{ExampleSolution, SolutionsResponse};

/// Replenishment state of the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// More solutions may exist; nothing is in flight
    Idle,
    /// A fetch for more solutions is outstanding
    Replenishing { ticket: u64 },
    /// The solver confirmed there are no further solutions
    Exhausted,
}

/// A replenishment the owner must send to the solver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplenishTicket {
    pub id: u64,
    /// Total number of solutions the solver should enumerate up to
    pub target_total: usize,
}

/// Result of a single reveal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RevealOutcome {
    /// Solutions moved from the hidden buffer to the displayed list
    pub revealed: usize,
    /// Fetch the owner must now issue
    pub replenish: Option<ReplenishTicket>,
}

/// Displayed and prefetched example solutions for one variable ordering
#[derive(Debug, Clone)]
pub struct SolutionBuffer {
    policy: BufferPolicy,
    displayed: Vec<ExampleSolution>,
    buffer: VecDeque<ExampleSolution>,
    state: BufferState,
    next_ticket: u64,
}

impl Default for SolutionBuffer {
    fn default() -> Self {
        Self::new(BufferPolicy::default())
    }
}

impl SolutionBuffer {
    pub fn new(policy: BufferPolicy) -> Self {
        Self {
            policy,
            displayed: Vec::new(),
            buffer: VecDeque::new(),
            state: BufferState::Exhausted,
            next_ticket: 1,
        }
    }

    pub fn policy(&self) -> &BufferPolicy {
        &self.policy
    }

    pub fn state(&self) -> BufferState {
        self.state
    }

    /// Solutions revealed to the user, in order
    pub fn displayed(&self) -> &[ExampleSolution] {
        &self.displayed
    }

    /// Prefetched solutions not yet revealed
    pub fn buffered(&self) -> impl ExactSizeIterator<Item = &ExampleSolution> {
        self.buffer.iter()
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Every solution accepted for the current ordering
    pub fn known_count(&self) -> usize {
        self.displayed.len() + self.buffer.len()
    }

    pub fn is_full_set(&self) -> bool {
        self.state == BufferState::Exhausted
    }

    pub fn is_replenishing(&self) -> bool {
        matches!(self.state, BufferState::Replenishing { .. })
    }

    /// True while there is nothing left to reveal and a fetch is outstanding
    pub fn is_reveal_disabled(&self) -> bool {
        self.buffer.is_empty() && self.is_replenishing()
    }

    /// Drop everything; any outstanding ticket becomes stale
    pub fn clear(&mut self) {
        self.displayed.clear();
        self.buffer.clear();
        self.state = BufferState::Exhausted;
    }

    /// Seed from the solutions that came with a fresh build
    ///
    /// A seed smaller than the fan-out threshold is the whole solution set
    /// and is shown at once. Otherwise only the first few are shown and the
    /// rest stay hidden.
    pub fn seed(&mut self, solutions: Vec<ExampleSolution>) {
        if solutions.len() < self.policy.seed_fanout {
            self.displayed = solutions;
            self.buffer.clear();
            self.state = BufferState::Exhausted;
        } else {
            let mut solutions = solutions.into_iter();
            self.displayed = solutions
                .by_ref()
                .take(self.policy.initial_display)
                .collect();
            self.buffer = solutions.collect();
            self.state = BufferState::Idle;
        }
        debug!(
            displayed = self.displayed.len(),
            buffered = self.buffer.len(),
            full = self.is_full_set(),
            "Seeded solution buffer"
        );
    }

    /// Replace the whole cache with solutions recomputed under a new order
    ///
    /// The first `displayed_count` become the displayed list and the rest, up
    /// to `requested_total`, the hidden buffer. Getting back no more than was
    /// displayed, or fewer than requested, means the solver has nothing more.
    pub fn replace(
        &mut self,
        solutions: Vec<ExampleSolution>,
        displayed_count: usize,
        requested_total: usize,
    ) {
        let returned = solutions.len();
        let full = returned <= displayed_count || returned < requested_total;

        let mut solutions = solutions.into_iter();
        self.displayed = solutions.by_ref().take(displayed_count).collect();
        self.buffer = solutions
            .take(requested_total.saturating_sub(self.displayed.len()))
            .collect();
        self.state = if full {
            BufferState::Exhausted
        } else {
            BufferState::Idle
        };
        debug!(
            returned,
            displayed = self.displayed.len(),
            buffered = self.buffer.len(),
            full,
            "Replaced solution buffer"
        );
    }

    /// Reveal the next solution, or everything once the set is known complete
    ///
    /// An idle buffer requests more once it is at or below the low
    /// watermark, so a refill that failed is retried on the next reveal.
    pub fn reveal_next(&mut self) -> RevealOutcome {
        match self.state {
            BufferState::Exhausted => {
                let revealed = self.buffer.len();
                self.displayed.extend(self.buffer.drain(..));
                RevealOutcome {
                    revealed,
                    replenish: None,
                }
            }
            BufferState::Replenishing { .. } => RevealOutcome {
                revealed: self.pop_one(),
                replenish: None,
            },
            BufferState::Idle => {
                let revealed = self.pop_one();
                let replenish = if self.buffer.len() <= self.policy.low_watermark {
                    Some(self.start_replenishment())
                } else {
                    None
                };
                RevealOutcome {
                    revealed,
                    replenish,
                }
            }
        }
    }

    /// Append a fetched batch if `ticket` is the outstanding one
    ///
    /// The full-set flag is taken from the solver, never inferred from the
    /// batch size. Returns whether the batch was applied.
    pub fn apply_replenishment(&mut self, ticket: u64, response: SolutionsResponse) -> bool {
        if self.state != (BufferState::Replenishing { ticket }) {
            debug!(ticket, "Dropping stale replenishment");
            return false;
        }
        let added = response.example_solutions.len();
        self.buffer.extend(response.example_solutions);
        self.state = if response.solution_set_full {
            BufferState::Exhausted
        } else {
            BufferState::Idle
        };
        debug!(
            ticket,
            added,
            buffered = self.buffer.len(),
            full = response.solution_set_full,
            "Applied replenishment"
        );
        true
    }

    /// Release the in-flight guard after a failed fetch; contents are untouched
    pub fn fail_replenishment(&mut self, ticket: u64) -> bool {
        if self.state != (BufferState::Replenishing { ticket }) {
            return false;
        }
        self.state = BufferState::Idle;
        true
    }

    fn pop_one(&mut self) -> usize {
        match self.buffer.pop_front() {
            Some(solution) => {
                self.displayed.push(solution);
                1
            }
            None => 0,
        }
    }

    fn start_replenishment(&mut self) -> ReplenishTicket {
        let id = self.next_ticket;
        self.next_ticket += 1;
        self.state = BufferState::Replenishing { ticket: id };
        // Ranks already held plus one fresh batch; with the watermark reached
        // exactly this is displayed + low_watermark + replenish_batch.
        let target_total = self.known_count() + self.policy.replenish_batch;
        debug!(
            ticket = id,
            target_total,
            displayed = self.displayed.len(),
            buffered = self.buffer.len(),
            "Buffer low, requesting more solutions"
        );
        ReplenishTicket { id, target_total }
    }
}
