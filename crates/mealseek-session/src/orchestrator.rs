//! Issues search calls and decides which outcomes are still wanted.
//!
//! Every [`FetchOrchestrator::submit`] mints a fresh [`FetchToken`], strictly
//! greater than any minted before. Outcomes come back through a channel as
//! [`Settled`] messages and are passed to [`FetchOrchestrator::accept`], which
//! hands back an [`Accepted`] outcome only for the newest token. There is no
//! network-level cancellation: a superseded call runs to completion and its
//! outcome is dropped on arrival.
//!
//! ## Calls vs tokens
//!
//! A token names a *request*, a call names one outbound HTTP exchange. They
//! usually coincide, but submitting a request equal to one whose call is
//! still outstanding mints a new token and binds it to the existing call
//! instead of issuing a second one. So a redundant URL notification never
//! doubles the traffic, yet the latest-token rule stays the only rule.

use std::fmt;
use std::sync::Arc;

use mealseek_client::{ClientError, SearchPage};
use mealseek_core::SearchCriteria;
use tokio::sync::mpsc;

use crate::backend::SearchBackend;

/// Monotonic sequence number identifying one submitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchToken(u64);

impl fmt::Display for FetchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One page of one search.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub criteria: SearchCriteria,
    pub page: u32,
}

pub type FetchOutcome = Result<SearchPage, ClientError>;

/// A finished call, as delivered by the spawned fetch task.
#[derive(Debug)]
pub struct Settled {
    call: FetchToken,
    outcome: FetchOutcome,
}

/// An outcome that passed the staleness check and may be applied.
#[derive(Debug)]
pub struct Accepted {
    pub token: FetchToken,
    pub request: PageRequest,
    pub outcome: FetchOutcome,
}

#[derive(Debug, Clone, Copy)]
struct Current {
    token: FetchToken,
    call: FetchToken,
}

pub struct FetchOrchestrator<B> {
    backend: Arc<B>,
    last_minted: u64,
    current: Option<Current>,
    in_flight: Vec<(FetchToken, PageRequest)>,
    settled_tx: mpsc::UnboundedSender<Settled>,
}

impl<B: SearchBackend> FetchOrchestrator<B> {
    /// Creates an orchestrator and the receiving end its calls settle into.
    pub fn new(backend: Arc<B>) -> (Self, mpsc::UnboundedReceiver<Settled>) {
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        let orchestrator = Self {
            backend,
            last_minted: 0,
            current: None,
            in_flight: Vec::new(),
            settled_tx,
        };
        (orchestrator, settled_rx)
    }

    /// Submits `request`, joining an outstanding call for an equal request
    /// when there is one.
    pub fn submit(&mut self, request: PageRequest) -> FetchToken {
        let token = self.mint();
        let outstanding = self
            .in_flight
            .iter()
            .find(|(_, pending)| *pending == request)
            .map(|(call, _)| *call);

        let call = if let Some(call) = outstanding {
            tracing::debug!(%token, %call, page = request.page, "joining outstanding call");
            call
        } else {
            self.spawn_call(token, request);
            token
        };
        self.current = Some(Current { token, call });
        token
    }

    /// Submits `request` with a fresh call even if an equal one is
    /// outstanding (explicit user retry).
    pub fn resubmit(&mut self, request: PageRequest) -> FetchToken {
        let token = self.mint();
        self.spawn_call(token, request);
        self.current = Some(Current { token, call: token });
        token
    }

    /// Makes every outstanding call stale without submitting anything new.
    pub fn supersede(&mut self) {
        if let Some(current) = self.current.take() {
            tracing::debug!(token = %current.token, "superseded without replacement");
        }
    }

    /// Staleness check for a settled call.
    ///
    /// Returns the outcome only if the call backs the newest token, and at
    /// most once per token.
    pub fn accept(&mut self, settled: Settled) -> Option<Accepted> {
        let Settled { call, outcome } = settled;
        let position = self.in_flight.iter().position(|(c, _)| *c == call)?;
        let (_, request) = self.in_flight.swap_remove(position);

        let current = self.current;
        match current {
            Some(current) if current.call == call => {
                self.current = None;
                Some(Accepted {
                    token: current.token,
                    request,
                    outcome,
                })
            }
            current => {
                tracing::debug!(
                    %call,
                    current = ?current.map(|c| c.token),
                    page = request.page,
                    "discarding stale outcome"
                );
                None
            }
        }
    }

    /// Newest minted token, if its outcome is still awaited.
    #[must_use]
    pub fn pending_token(&self) -> Option<FetchToken> {
        self.current.map(|c| c.token)
    }

    /// Number of outbound calls that have not settled yet.
    #[must_use]
    pub fn in_flight_calls(&self) -> usize {
        self.in_flight.len()
    }

    fn mint(&mut self) -> FetchToken {
        self.last_minted += 1;
        FetchToken(self.last_minted)
    }

    fn spawn_call(&mut self, call: FetchToken, request: PageRequest) {
        tracing::debug!(%call, page = request.page, "issuing search call");
        self.in_flight.push((call, request.clone()));

        let backend = Arc::clone(&self.backend);
        let settled_tx = self.settled_tx.clone();
        tokio::spawn(async move {
            let outcome = backend.search(&request.criteria, request.page).await;
            // The receiver only goes away when the session is torn down.
            let _ = settled_tx.send(Settled { call, outcome });
        });
    }
}
