//! Single-flight token refresh.
//!
//! ## State Diagram
//!
//! ```text
//!        Start (first caller)
//!   Idle ───────────────────► Refreshing ──┐ later callers queue (FIFO)
//!    ▲                            │ ◄──────┘
//!    │  Succeeded / Failed        │
//!    └────────────────────────────┘
//!         (after the queue is flushed)
//! ```
//!
//! The first caller moves the machine to `Refreshing` and the refresh call is
//! spawned on its own task, so it always runs to completion and always
//! flushes the queue even if every caller has gone away. A refresh task
//! that unwinds is treated as a failed refresh.

use crate::state::{AuthStore, Transition};
use crate::transport::{ApiRequest, HttpTransport, Method};
use crate::{ApiError, ApiResult};
use parking_lot::Mutex;
use rust_fsm::*;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Arc;
use token_store::{TokenPair, TokenStore};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

pub const REFRESH_PATH: &str = "/api/auth/refresh";

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub refresh_machine(Idle)

    Idle => {
        Start => Refreshing
    },
    Refreshing => {
        Succeeded => Idle,
        Failed => Idle
    }
}

pub use refresh_machine::Input as RefreshMachineInput;
pub use refresh_machine::State as RefreshMachineState;
pub use refresh_machine::StateMachine as RefreshMachine;

/// Result delivered to every caller of one refresh round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New pair, already persisted.
    Refreshed(TokenPair),
    /// Tokens cleared, session logged out.
    Failed,
}

impl RefreshOutcome {
    pub fn access_token(&self) -> Option<&str> {
        match self {
            RefreshOutcome::Refreshed(pair) => Some(pair.access_token.as_str()),
            RefreshOutcome::Failed => None,
        }
    }

    pub fn is_refreshed(&self) -> bool {
        matches!(self, RefreshOutcome::Refreshed(_))
    }
}

struct CoordinatorState {
    machine: RefreshMachine,
    waiters: VecDeque<oneshot::Sender<RefreshOutcome>>,
}

struct Inner {
    transport: Arc<dyn HttpTransport>,
    tokens: TokenStore,
    auth: AuthStore,
    state: Mutex<CoordinatorState>,
}

/// Ensures at most one refresh call is in flight. Clones share the queue.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

enum Role {
    Leader,
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

impl RefreshCoordinator {
    pub fn new(transport: Arc<dyn HttpTransport>, tokens: TokenStore, auth: AuthStore) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                tokens,
                auth,
                state: Mutex::new(CoordinatorState {
                    machine: RefreshMachine::new(),
                    waiters: VecDeque::new(),
                }),
            }),
        }
    }

    pub fn is_refreshing(&self) -> bool {
        *self.inner.state.lock().machine.state() == RefreshMachineState::Refreshing
    }

    /// Number of callers waiting on the in-flight refresh.
    pub fn queued(&self) -> usize {
        self.inner.state.lock().waiters.len()
    }

    /// Exchange `refresh_token` for a new pair, or join the refresh already
    /// in flight.
    ///
    /// On success the new pair is persisted before any caller resumes. On
    /// failure tokens are cleared and the session is logged out.
    pub async fn refresh(&self, refresh_token: String) -> RefreshOutcome {
        let role = {
            let mut state = self.inner.state.lock();
            match state.machine.state() {
                RefreshMachineState::Refreshing => {
                    let (tx, rx) = oneshot::channel();
                    state.waiters.push_back(tx);
                    debug!(queued = state.waiters.len(), "Refresh in flight, queued");
                    Role::Waiter(rx)
                }
                RefreshMachineState::Idle => {
                    // Flag is set before the network call begins.
                    if state.machine.consume(&RefreshMachineInput::Start).is_err() {
                        error!("Refresh machine rejected Start from Idle");
                        return RefreshOutcome::Failed;
                    }
                    Role::Leader
                }
            }
        };

        match role {
            Role::Waiter(rx) => rx.await.unwrap_or(RefreshOutcome::Failed),
            Role::Leader => {
                let inner = self.inner.clone();
                let task = tokio::spawn(async move { inner.run(refresh_token).await });
                match task.await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        error!(error = %e, "Refresh task did not complete");
                        RefreshOutcome::Failed
                    }
                }
            }
        }
    }
}

/// Flushes the queue as failed if the refresh task unwinds before finishing.
struct FlushGuard {
    inner: Arc<Inner>,
    armed: bool,
}

impl Drop for FlushGuard {
    fn drop(&mut self) {
        if self.armed {
            error!("Refresh task unwound, clearing session");
            self.inner.tokens.clear();
            self.inner.auth.apply(Transition::Logout);
            self.inner.finish(RefreshOutcome::Failed);
        }
    }
}

impl Inner {
    async fn run(self: Arc<Self>, refresh_token: String) -> RefreshOutcome {
        let mut guard = FlushGuard {
            inner: self.clone(),
            armed: true,
        };

        let outcome = match self.request_pair(refresh_token).await {
            Ok(pair) => {
                self.tokens.persist(&pair);
                info!("Token refresh succeeded");
                RefreshOutcome::Refreshed(pair)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, clearing session");
                self.tokens.clear();
                self.auth.apply(Transition::Logout);
                RefreshOutcome::Failed
            }
        };

        guard.armed = false;
        self.finish(outcome.clone());
        outcome
    }

    /// Raw refresh call. Goes straight to the transport, never through the
    /// client core, so it can never recurse into another refresh.
    async fn request_pair(&self, refresh_token: String) -> ApiResult<TokenPair> {
        let request = ApiRequest::new(Method::Post, REFRESH_PATH)
            .with_body(json!({ "refreshToken": refresh_token }));
        debug!(path = REFRESH_PATH, "Refreshing token");

        let response = self.transport.send(&request).await?;
        if !response.is_success() {
            return Err(ApiError::Status {
                status: response.status,
                path: request.path,
                body: response.body,
            });
        }

        let pair: TokenPair = response.json(REFRESH_PATH)?;
        if pair.access_token.is_empty() || pair.refresh_token.is_empty() {
            return Err(ApiError::Protocol {
                path: request.path,
                reason: "refresh returned an empty token".to_string(),
            });
        }
        Ok(pair)
    }

    /// Resume every waiter in FIFO order, then return to Idle.
    fn finish(&self, outcome: RefreshOutcome) {
        let mut state = self.state.lock();
        let waiters = std::mem::take(&mut state.waiters);

        debug!(
            waiters = waiters.len(),
            refreshed = outcome.is_refreshed(),
            "Flushing refresh queue"
        );
        for waiter in waiters {
            // A dropped receiver is an abandoned caller.
            let _ = waiter.send(outcome.clone());
        }

        let input = if outcome.is_refreshed() {
            RefreshMachineInput::Succeeded
        } else {
            RefreshMachineInput::Failed
        };
        if state.machine.consume(&input).is_err() {
            warn!(state = ?state.machine.state(), "Refresh finished while not refreshing");
        }
    }
}
