//! SSE HTTP adapter
//!
//! `POST /api/v1/suggest/stream` opens a Server-Sent-Events response:
//! first a `stream-created` frame carrying the stream id, then
//! `suggestions` frames as shards merge, then a terminal
//! `stream-completed` (or `error`) frame. `POST /api/v1/suggest/close`
//! signals cancellation for a live stream by id; `GET /health` answers
//! liveness probes.
//!
//! Each stream gets its own `Session`; a registry keyed by stream id
//! lets the close endpoint reach across connections, and a dropped
//! client cancels its request instead of leaving workers running.

use super::wire::{
    self, CloseRequest, CloseResponse, StreamCompleted, StreamCreated, StreamError,
    SuggestStreamRequest, SuggestionsEvent,
};
use crate::engine::{Engine, Policy};
use crate::session::{RequestId, Session, SessionConfig, SessionEvent, StreamStatus};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use crossbeam_channel::Receiver;
use rustc_hash::FxHashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

type SseFrame = Result<Event, Infallible>;

/// Shared state behind the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    engine: Arc<Engine>,
    session_config: SessionConfig,
    streams: Arc<Mutex<FxHashMap<RequestId, Arc<Session>>>>,
}

impl AppState {
    #[must_use]
    pub fn new(engine: Arc<Engine>, session_config: SessionConfig) -> Self {
        Self {
            engine,
            session_config,
            streams: Arc::new(Mutex::new(FxHashMap::default())),
        }
    }

    /// Number of streams currently live (close-endpoint reachable)
    #[must_use]
    pub fn active_streams(&self) -> usize {
        self.streams.lock().expect("stream registry poisoned").len()
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/suggest/stream", post(suggest_stream))
        .route("/api/v1/suggest/close", post(close_stream))
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
}

/// Serve the API until a shutdown signal arrives
///
/// # Errors
/// Returns the bind or accept error; callers map it to a non-zero exit.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        log::info!("shutdown signal received");
    }
}

async fn suggest_stream(
    State(state): State<AppState>,
    Json(request): Json<SuggestStreamRequest>,
) -> Response {
    let history = match wire::decode_history(&request.history) {
        Ok(history) => history,
        Err(error) => {
            log::warn!("rejecting stream request: {error}");
            return (StatusCode::BAD_REQUEST, error.to_string()).into_response();
        }
    };

    let policy = Policy {
        strict_guesses: request.strict_guesses,
        typed_prefix: request.typed_prefix.clone(),
        ..Policy::default()
    }
    .normalize();

    let (session, events) = Session::new(Arc::clone(&state.engine), state.session_config);
    let session = Arc::new(session);
    let stream_id = session.submit(history, policy);

    state
        .streams
        .lock()
        .expect("stream registry poisoned")
        .insert(stream_id, Arc::clone(&session));

    log::info!(
        "stream {stream_id} created: {} history entries, maxDepth {:?}",
        request.history.len(),
        request.max_depth
    );

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<SseFrame>();
    send_frame(
        &tx,
        "stream-created",
        &StreamCreated {
            stream_id: stream_id.to_string(),
        },
    );

    let streams = Arc::clone(&state.streams);
    let max_depth = request.max_depth;
    tokio::task::spawn_blocking(move || {
        pump_stream(&events, &session, stream_id, max_depth, &tx);
        streams
            .lock()
            .expect("stream registry poisoned")
            .remove(&stream_id);
        log::debug!("stream {stream_id} closed");
    });

    Sse::new(UnboundedReceiverStream::new(rx))
        .keep_alive(KeepAlive::default())
        .into_response()
}

/// Forward session events as SSE frames until the request terminates
fn pump_stream(
    events: &Receiver<SessionEvent>,
    session: &Session,
    stream_id: RequestId,
    max_depth: Option<usize>,
    tx: &UnboundedSender<SseFrame>,
) {
    let id = stream_id.to_string();

    for event in events {
        if event.request_id() != stream_id {
            continue;
        }
        match event {
            SessionEvent::Suggestions {
                ranked,
                remaining_answers,
                depth,
                ..
            } => {
                if max_depth.is_some_and(|cap| depth > cap) {
                    continue;
                }
                let payload =
                    SuggestionsEvent::new(id.clone(), &ranked, depth, remaining_answers);
                if !send_frame(tx, "suggestions", &payload) {
                    // Client went away: stop the work it was paying for
                    log::debug!("stream {stream_id} consumer gone, cancelling");
                    session.cancel(stream_id);
                }
            }

            SessionEvent::Completed { status, .. } => {
                let status = match status {
                    StreamStatus::Completed => "completed",
                    StreamStatus::Cancelled => "cancelled",
                };
                log::info!("stream {stream_id} finished: {status}");
                send_frame(
                    tx,
                    "stream-completed",
                    &StreamCompleted {
                        stream_id: id,
                        status: status.to_owned(),
                    },
                );
                return;
            }

            SessionEvent::Failed { error, .. } => {
                log::warn!("stream {stream_id} failed: {error}");
                send_frame(
                    tx,
                    "error",
                    &StreamError {
                        stream_id: id,
                        error: error.to_string(),
                    },
                );
                return;
            }
        }
    }
}

/// Serialize and enqueue one SSE frame; false when the client is gone
fn send_frame<T: serde::Serialize>(
    tx: &UnboundedSender<SseFrame>,
    name: &'static str,
    payload: &T,
) -> bool {
    match Event::default().event(name).json_data(payload) {
        Ok(frame) => tx.send(Ok(frame)).is_ok(),
        Err(error) => {
            log::error!("failed to encode {name} frame: {error}");
            false
        }
    }
}

async fn close_stream(
    State(state): State<AppState>,
    Json(request): Json<CloseRequest>,
) -> Response {
    let Ok(stream_id) = Uuid::parse_str(&request.stream_id) else {
        return (StatusCode::NOT_FOUND, "stream not found").into_response();
    };

    let session = {
        let streams = state.streams.lock().expect("stream registry poisoned");
        streams.get(&stream_id).cloned()
    };

    match session {
        Some(session) => {
            log::info!("close requested for stream {stream_id}");
            session.cancel(stream_id);
            Json(CloseResponse {
                status: "closed".to_owned(),
            })
            .into_response()
        }
        None => {
            log::debug!("close requested for unknown stream {stream_id}");
            (StatusCode::NOT_FOUND, "stream not found").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Word;
    use crate::engine::EngineConfig;

    fn test_state() -> AppState {
        let words: Vec<Word> = ["IRATE", "CRATE", "GRATE", "SLATE", "CRANE"]
            .iter()
            .map(|s| Word::new(s).unwrap())
            .collect();
        let engine = Engine::new(
            words.clone(),
            words,
            EngineConfig {
                workers: Some(2),
                shard_count: Some(2),
            },
        )
        .unwrap();
        AppState::new(Arc::new(engine), SessionConfig::default())
    }

    #[test]
    fn router_builds_with_state() {
        let _router = router(test_state());
    }

    #[test]
    fn registry_starts_empty() {
        assert_eq!(test_state().active_streams(), 0);
    }

    #[tokio::test]
    async fn close_of_unknown_stream_is_not_found() {
        let state = test_state();
        let response = close_stream(
            State(state),
            Json(CloseRequest {
                stream_id: Uuid::new_v4().to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn close_with_malformed_id_is_not_found() {
        let state = test_state();
        let response = close_stream(
            State(state),
            Json(CloseRequest {
                stream_id: "not-a-uuid".into(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
