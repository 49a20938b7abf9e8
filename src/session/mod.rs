//! Request lifecycle management
//!
//! A `Session` owns the single in-flight suggestion request of one
//! client. Submitting preempts whatever is running: the superseded
//! request gets its cancelled sentinel immediately, its token fires,
//! and any late events it produces are dropped by request-id
//! comparison. Every accepted request yields exactly one terminal
//! event.
//!
//! The session itself does no I/O and never blocks on workers; each
//! submission runs on its own thread and reports back through the
//! session's event channel.

use crate::core::GuessEntry;
use crate::engine::{CancelToken, Engine, EngineError, Policy, ScoredGuess};
use crossbeam_channel::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Opaque request identifier carried by every event
pub type RequestId = Uuid;

/// Terminal status carried by the sentinel event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    Completed,
    Cancelled,
}

/// Events a session emits, tagged with the request they belong to
///
/// Consumers that race against preemption filter by the latest request
/// id they have observed.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A ranking snapshot; `depth` counts merged shards so far
    Suggestions {
        request_id: RequestId,
        ranked: Vec<ScoredGuess>,
        remaining_answers: usize,
        depth: usize,
    },
    /// The sentinel: emitted exactly once per request on completion or
    /// cancellation
    Completed {
        request_id: RequestId,
        status: StreamStatus,
    },
    /// Terminal failure (timeout or worker error) for one request
    Failed {
        request_id: RequestId,
        error: EngineError,
    },
}

impl SessionEvent {
    /// The request this event belongs to
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        match self {
            Self::Suggestions { request_id, .. }
            | Self::Completed { request_id, .. }
            | Self::Failed { request_id, .. } => *request_id,
        }
    }

    /// Whether this event ends its request
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Suggestions { .. })
    }
}

/// Session tuning knobs
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Wall-clock budget per request
    pub timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

struct Running {
    request_id: RequestId,
    cancel: CancelToken,
    /// Set once the terminal event for this request went out
    terminated: bool,
}

struct State {
    current: Option<Running>,
}

/// Owner of one client's suggestion requests
pub struct Session {
    engine: Arc<Engine>,
    config: SessionConfig,
    state: Arc<Mutex<State>>,
    events: Sender<SessionEvent>,
}

impl Session {
    /// Create a session over a shared engine
    ///
    /// Returns the session and the receiving end of its event stream.
    #[must_use]
    pub fn new(engine: Arc<Engine>, config: SessionConfig) -> (Self, Receiver<SessionEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (
            Self {
                engine,
                config,
                state: Arc::new(Mutex::new(State { current: None })),
                events: tx,
            },
            rx,
        )
    }

    /// Submit a request, preempting any in-flight one
    ///
    /// Returns the fresh request id. The preempted request resolves as
    /// cancelled before any event of the new request is emitted.
    pub fn submit(&self, history: Vec<GuessEntry>, policy: Policy) -> RequestId {
        let request_id = Uuid::new_v4();
        let cancel = CancelToken::new();

        {
            let mut state = self.state.lock().expect("session state poisoned");
            if let Some(old) = state.current.take() {
                old.cancel.cancel();
                if !old.terminated {
                    log::debug!(
                        "request {} superseded by {}",
                        old.request_id,
                        request_id
                    );
                    // The superseded worker's own terminal is dropped later
                    // by id comparison; the sentinel goes out here so event
                    // order matches submission order
                    let _ = self.events.send(SessionEvent::Completed {
                        request_id: old.request_id,
                        status: StreamStatus::Cancelled,
                    });
                }
            }
            state.current = Some(Running {
                request_id,
                cancel: cancel.clone(),
                terminated: false,
            });
        }

        let engine = Arc::clone(&self.engine);
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let timeout = self.config.timeout;

        std::thread::Builder::new()
            .name(format!("session-{request_id}"))
            .spawn(move || {
                run_request(
                    &engine, &state, &events, request_id, &cancel, timeout, history, policy,
                );
            })
            .expect("failed to spawn session worker");

        request_id
    }

    /// Cancel a request by id
    ///
    /// Idempotent; unknown or already-finished ids are a no-op. The
    /// worker notices within one shard and emits the cancelled sentinel
    /// itself.
    pub fn cancel(&self, request_id: RequestId) {
        let state = self.state.lock().expect("session state poisoned");
        if let Some(running) = &state.current {
            if running.request_id == request_id {
                running.cancel.cancel();
            }
        }
    }

    /// Id of the request currently in flight, if any
    #[must_use]
    pub fn current_request(&self) -> Option<RequestId> {
        let state = self.state.lock().expect("session state poisoned");
        state
            .current
            .as_ref()
            .filter(|r| !r.terminated)
            .map(|r| r.request_id)
    }
}

/// Emit `event` unless its request has been superseded or already closed
///
/// Terminal events flip the terminated flag under the same lock, which
/// is what makes the one-sentinel guarantee hold against racing
/// preemption.
fn emit_gated(
    state: &Mutex<State>,
    events: &Sender<SessionEvent>,
    event: SessionEvent,
) -> bool {
    let mut state = state.lock().expect("session state poisoned");
    let current = match &mut state.current {
        Some(running) if running.request_id == event.request_id() => running,
        _ => return false, // superseded: drop at the source
    };
    if current.terminated {
        return false;
    }
    if event.is_terminal() {
        current.terminated = true;
    }
    events.send(event).is_ok()
}

#[allow(clippy::too_many_arguments)]
fn run_request(
    engine: &Engine,
    state: &Mutex<State>,
    events: &Sender<SessionEvent>,
    request_id: RequestId,
    cancel: &CancelToken,
    timeout: Duration,
    history: Vec<GuessEntry>,
    policy: Policy,
) {
    let deadline = Instant::now() + timeout;
    let started = Instant::now();

    let outcome = engine.suggest_stream(
        &history,
        &policy,
        cancel,
        Some(deadline),
        |ranked, depth, remaining| {
            emit_gated(
                state,
                events,
                SessionEvent::Suggestions {
                    request_id,
                    ranked: ranked.to_vec(),
                    remaining_answers: remaining,
                    depth,
                },
            )
        },
    );

    let terminal = match outcome {
        Ok(report) => {
            log::debug!(
                "request {request_id} completed in {:?}: {} suggestions, {} answers remain",
                started.elapsed(),
                report.ranked.len(),
                report.remaining_answers
            );
            SessionEvent::Completed {
                request_id,
                status: StreamStatus::Completed,
            }
        }
        Err(EngineError::Cancelled) => {
            log::debug!("request {request_id} cancelled after {:?}", started.elapsed());
            SessionEvent::Completed {
                request_id,
                status: StreamStatus::Cancelled,
            }
        }
        Err(error) => {
            log::warn!("request {request_id} failed: {error}");
            SessionEvent::Failed { request_id, error }
        }
    };

    emit_gated(state, events, terminal);
}
