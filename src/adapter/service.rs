//! In-process messaging adapter
//!
//! A background compute loop that speaks the INIT / SOLVE / CANCEL
//! protocol over channels. The loop owns an optional engine (SOLVE
//! before INIT is an error response, not a crash) and at most one
//! pending solve; a newer SOLVE preempts the old one, which then
//! resolves silently, and CANCEL drops the pending request without a
//! completion message.

use super::wire::{self, ComputeRequest, ComputeResponse};
use crate::engine::{Engine, EngineConfig, EngineError, Policy, ScoredGuess};
use crate::session::{RequestId, Session, SessionConfig, SessionEvent, StreamStatus};
use crate::wordlists::parse_words;
use crossbeam_channel::{never, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Channel ends for talking to a spawned compute loop
pub struct ComputeHandle {
    pub requests: Sender<ComputeRequest>,
    pub responses: Receiver<ComputeResponse>,
    handle: JoinHandle<()>,
}

impl ComputeHandle {
    /// Drop the request side and wait for the loop to drain
    pub fn shutdown(self) {
        drop(self.requests);
        let _ = self.handle.join();
    }
}

/// Spawn the compute loop on a background thread
#[must_use]
pub fn spawn(engine_config: EngineConfig, session_config: SessionConfig) -> ComputeHandle {
    let (request_tx, request_rx) = crossbeam_channel::unbounded();
    let (response_tx, response_rx) = crossbeam_channel::unbounded();

    let handle = std::thread::Builder::new()
        .name("suggest-compute".to_owned())
        .spawn(move || run(&request_rx, &response_tx, engine_config, session_config))
        .expect("failed to spawn compute loop");

    ComputeHandle {
        requests: request_tx,
        responses: response_rx,
        handle,
    }
}

struct Pending {
    internal: RequestId,
    external: String,
    /// Latest ranking snapshot seen for the request
    last: Option<(Vec<ScoredGuess>, usize)>,
}

struct Runtime {
    session: Session,
    events: Receiver<SessionEvent>,
    pending: Option<Pending>,
}

/// Drive the protocol until the request channel closes
pub fn run(
    requests: &Receiver<ComputeRequest>,
    responses: &Sender<ComputeResponse>,
    engine_config: EngineConfig,
    session_config: SessionConfig,
) {
    let mut runtime: Option<Runtime> = None;

    loop {
        // A session only exists after INIT; select against a channel
        // that never fires until then
        let events = runtime
            .as_ref()
            .map_or_else(never, |r| r.events.clone());

        crossbeam_channel::select! {
            recv(requests) -> request => match request {
                Ok(request) => {
                    handle_request(request, &mut runtime, responses, engine_config, session_config);
                }
                Err(_) => break,
            },
            recv(events) -> event => {
                if let Ok(event) = event {
                    handle_event(event, &mut runtime, responses);
                }
            }
        }
    }

    log::debug!("compute loop shutting down");
}

fn handle_request(
    request: ComputeRequest,
    runtime: &mut Option<Runtime>,
    responses: &Sender<ComputeResponse>,
    engine_config: EngineConfig,
    session_config: SessionConfig,
) {
    match request {
        ComputeRequest::Init { answers, guesses } => {
            match build_runtime(&answers, &guesses, engine_config, session_config) {
                Ok(built) => {
                    log::info!(
                        "compute loop initialized: {} answers, {} guesses",
                        answers.len(),
                        guesses.len()
                    );
                    *runtime = Some(built);
                    let _ = responses.send(ComputeResponse::InitComplete);
                }
                Err(error) => {
                    let _ = responses.send(ComputeResponse::Error {
                        request_id: None,
                        error,
                    });
                }
            }
        }

        ComputeRequest::Solve {
            request_id,
            history,
            strict_guesses,
            typed_prefix,
        } => {
            let Some(runtime) = runtime.as_mut() else {
                let _ = responses.send(ComputeResponse::Error {
                    request_id: Some(request_id),
                    error: EngineError::NotInitialized.to_string(),
                });
                return;
            };

            let history = match wire::decode_history(&history) {
                Ok(history) => history,
                Err(error) => {
                    let _ = responses.send(ComputeResponse::Error {
                        request_id: Some(request_id),
                        error: error.to_string(),
                    });
                    return;
                }
            };

            let policy = Policy {
                strict_guesses,
                typed_prefix,
                ..Policy::default()
            }
            .normalize();

            let internal = runtime.session.submit(history, policy);
            // A preempted solve resolves silently; only the latest one
            // reports back
            runtime.pending = Some(Pending {
                internal,
                external: request_id,
                last: None,
            });
        }

        ComputeRequest::Cancel { request_id } => {
            if let Some(runtime) = runtime.as_mut() {
                let matches = runtime
                    .pending
                    .as_ref()
                    .is_some_and(|p| p.external == request_id);
                if matches {
                    let internal = runtime.pending.as_ref().map(|p| p.internal);
                    if let Some(internal) = internal {
                        runtime.session.cancel(internal);
                    }
                }
            }
        }
    }
}

fn handle_event(
    event: SessionEvent,
    runtime: &mut Option<Runtime>,
    responses: &Sender<ComputeResponse>,
) {
    let Some(runtime) = runtime.as_mut() else {
        return;
    };
    let current = runtime
        .pending
        .as_ref()
        .is_some_and(|p| p.internal == event.request_id());
    if !current {
        return; // stale event from a superseded request
    }

    match event {
        SessionEvent::Suggestions {
            ranked,
            remaining_answers,
            ..
        } => {
            if let Some(pending) = runtime.pending.as_mut() {
                pending.last = Some((ranked, remaining_answers));
            }
        }

        SessionEvent::Completed { status, .. } => {
            let pending = runtime.pending.take().expect("pending checked above");
            if status == StreamStatus::Completed {
                let (ranked, remaining_answers) = pending.last.unwrap_or_default();
                let _ = responses.send(ComputeResponse::SolveComplete {
                    request_id: pending.external,
                    suggestions: wire::encode_suggestions(&ranked),
                    remaining_answers,
                });
            }
            // Cancelled solves end without a completion message
        }

        SessionEvent::Failed { error, .. } => {
            let pending = runtime.pending.take().expect("pending checked above");
            let _ = responses.send(ComputeResponse::Error {
                request_id: Some(pending.external),
                error: error.to_string(),
            });
        }
    }
}

fn build_runtime(
    answers: &[String],
    guesses: &[String],
    engine_config: EngineConfig,
    session_config: SessionConfig,
) -> Result<Runtime, String> {
    let answers = parse_lines(answers).map_err(|e| format!("answers: {e}"))?;
    let guesses = parse_lines(guesses).map_err(|e| format!("guesses: {e}"))?;

    let engine =
        Engine::new(answers, guesses, engine_config).map_err(|e| e.to_string())?;
    let (session, events) = Session::new(Arc::new(engine), session_config);

    Ok(Runtime {
        session,
        events,
        pending: None,
    })
}

fn parse_lines(entries: &[String]) -> Result<Vec<crate::core::Word>, String> {
    // Reuse the word-list ingest rules: every entry must be a valid word
    parse_words(&entries.join("\n")).map_err(|e| e.to_string())
}
