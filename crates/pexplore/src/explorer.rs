//! Async driver pairing a [`Session`] with a solver client
//!
//! Requests run concurrently inside a `FuturesUnordered`, but their results
//! are applied one at a time on the caller's task, so the session is only
//! ever touched by one handler at once. Builds and reorders wait for their
//! own answer (applying anything else that lands first); replenishments
//! triggered by [`Explorer::reveal_next`] stay in flight until the caller
//! polls [`Explorer::next_completion`] or [`Explorer::settle`].

use std::path::Path;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tracing::{debug, warn};

use crate::buffer::ReplenishTicket;
use crate::error::{Result, SessionError};
use crate::export::{export_artifacts, ExportedArtifacts};
use crate::session::{BuildTicket, Completion, ReorderTicket, ReplenishJob, Session};
use crate::solver::{BuildResponse, ReorderResponse, SolutionsResponse, SolverClient, SolverError};

enum Finished {
    Build(BuildTicket, std::result::Result<BuildResponse, SolverError>),
    Reorder(ReorderTicket, std::result::Result<ReorderResponse, SolverError>),
    Replenish(ReplenishTicket, std::result::Result<SolutionsResponse, SolverError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKey {
    Build(u64),
    Reorder(u64),
    Replenish(u64),
}

impl Finished {
    fn key(&self) -> RequestKey {
        match self {
            Finished::Build(ticket, _) => RequestKey::Build(ticket.token),
            Finished::Reorder(ticket, _) => RequestKey::Reorder(ticket.token),
            Finished::Replenish(ticket, _) => RequestKey::Replenish(ticket.id),
        }
    }
}

pub struct Explorer {
    client: Arc<dyn SolverClient>,
    session: Session,
    pending: FuturesUnordered<BoxFuture<'static, Finished>>,
}

impl Explorer {
    pub fn new(client: Arc<dyn SolverClient>, session: Session) -> Self {
        Self {
            client,
            session,
            pending: FuturesUnordered::new(),
        }
    }

    pub fn with_client(client: Arc<dyn SolverClient>) -> Self {
        Self::new(client, Session::default())
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Requests sent but not yet applied
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Build from formula text and wait for the result
    pub async fn build(&mut self, formula: &str) -> Result<Completion> {
        let ticket = self.session.begin_build(formula)?;
        let key = RequestKey::Build(ticket.token);
        let client = Arc::clone(&self.client);
        self.pending.push(
            async move {
                let result = client.build(&ticket.request).await;
                Finished::Build(ticket, result)
            }
            .boxed(),
        );
        self.wait_for(key).await
    }

    /// Build from the contents of a formula file
    pub async fn build_from_file(&mut self, path: impl AsRef<Path>) -> Result<Completion> {
        let formula = tokio::fs::read_to_string(path.as_ref()).await?;
        self.build(&formula).await
    }

    /// Reorder variables and wait for the recomputed diagram and solutions
    pub async fn reorder(&mut self, new_order: Vec<String>) -> Result<Completion> {
        let ticket = self.session.begin_reorder(new_order)?;
        self.send_reorder(ticket).await
    }

    /// Drag the variable at `from` to `to` and wait for the reorder
    pub async fn move_variable(&mut self, from: usize, to: usize) -> Result<Completion> {
        let ticket = self.session.begin_move(from, to)?;
        self.send_reorder(ticket).await
    }

    async fn send_reorder(&mut self, ticket: ReorderTicket) -> Result<Completion> {
        let key = RequestKey::Reorder(ticket.token);
        let client = Arc::clone(&self.client);
        self.pending.push(
            async move {
                let result = client.reorder(&ticket.request).await;
                Finished::Reorder(ticket, result)
            }
            .boxed(),
        );
        self.wait_for(key).await
    }

    /// Reveal one more example without waiting on the solver
    ///
    /// Returns how many solutions became visible. A replenishment, if the
    /// buffer ran low, is left in flight.
    pub fn reveal_next(&mut self) -> usize {
        let reveal = self.session.reveal_next();
        if let Some(ReplenishJob { ticket, request }) = reveal.replenish {
            let client = Arc::clone(&self.client);
            self.pending.push(
                async move {
                    let result = client.solutions(&request).await;
                    Finished::Replenish(ticket, result)
                }
                .boxed(),
            );
        }
        reveal.revealed
    }

    /// Wait for the next in-flight request and apply it
    ///
    /// Returns `None` when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Result<Completion>> {
        let finished = self.pending.next().await?;
        Some(self.apply(finished))
    }

    /// Apply every in-flight request; the last failure, if any, is returned
    pub async fn settle(&mut self) -> Result<()> {
        let mut last_error = None;
        while let Some(result) = self.next_completion().await {
            if let Err(err) = result {
                last_error = Some(err);
            }
        }
        match last_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Write the current diagram and automaton to `dir`
    pub async fn export(&self, dir: impl AsRef<Path>) -> Result<ExportedArtifacts> {
        let automaton = self
            .session
            .automaton()
            .ok_or(SessionError::NoAutomaton)?;
        export_artifacts(automaton, dir.as_ref()).await
    }

    async fn wait_for(&mut self, key: RequestKey) -> Result<Completion> {
        while let Some(finished) = self.pending.next().await {
            let finished_key = finished.key();
            let result = self.apply(finished);
            if finished_key == key {
                return result;
            }
            if let Err(err) = result {
                debug!(error = %err, "Background request failed while waiting");
            }
        }
        warn!(?key, "Request vanished before completing");
        Ok(Completion::Stale)
    }

    fn apply(&mut self, finished: Finished) -> Result<Completion> {
        match finished {
            Finished::Build(ticket, result) => self.session.complete_build(ticket, result),
            Finished::Reorder(ticket, result) => self.session.complete_reorder(ticket, result),
            Finished::Replenish(ticket, result) => {
                self.session.complete_replenishment(ticket, result)
            }
        }
    }
}
