//! Session lifecycle behavior: preemption, cancellation, event tagging

use std::sync::Arc;
use std::time::Duration;
use wordle_suggest::core::Word;
use wordle_suggest::engine::{Engine, EngineConfig, Policy};
use wordle_suggest::session::{RequestId, Session, SessionConfig, SessionEvent, StreamStatus};

fn synthetic_universe() -> Vec<Word> {
    // 676 distinct words: enough work that a request does not finish
    // before the test gets to preempt it
    let mut words = Vec::new();
    for a in b'A'..=b'Z' {
        for b in b'A'..=b'Z' {
            let text = format!("{}{}AAA", a as char, b as char);
            words.push(Word::new(&text).unwrap());
        }
    }
    words
}

fn session_over(words: Vec<Word>) -> (Session, crossbeam_channel::Receiver<SessionEvent>) {
    let engine = Engine::new(
        words.clone(),
        words,
        EngineConfig {
            workers: Some(2),
            shard_count: Some(4),
        },
    )
    .unwrap();
    Session::new(Arc::new(engine), SessionConfig::default())
}

fn collect_until_terminal(
    rx: &crossbeam_channel::Receiver<SessionEvent>,
    rid: RequestId,
) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.recv_timeout(Duration::from_secs(10)) {
        let stop = event.is_terminal() && event.request_id() == rid;
        events.push(event);
        if stop {
            break;
        }
    }
    events
}

#[test]
fn completed_request_streams_then_closes() {
    let (session, rx) = session_over(synthetic_universe());
    let rid = session.submit(Vec::new(), Policy::default());

    let events = collect_until_terminal(&rx, rid);

    let depths: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::Suggestions { depth, .. } => Some(*depth),
            _ => None,
        })
        .collect();
    assert!(!depths.is_empty());
    assert!(depths.windows(2).all(|p| p[1] > p[0]), "depth must improve");

    assert!(matches!(
        events.last(),
        Some(SessionEvent::Completed {
            status: StreamStatus::Completed,
            ..
        })
    ));
}

#[test]
fn preempted_request_never_outlives_its_successor() {
    let (session, rx) = session_over(synthetic_universe());

    let first = session.submit(Vec::new(), Policy::default());
    let second = session.submit(
        Vec::new(),
        Policy {
            typed_prefix: "Q".into(),
            ..Policy::default()
        },
    );

    let events = collect_until_terminal(&rx, second);

    // The first request resolves exactly once, as cancelled
    let first_terminals: Vec<&SessionEvent> = events
        .iter()
        .filter(|e| e.request_id() == first && e.is_terminal())
        .collect();
    assert_eq!(first_terminals.len(), 1);
    assert!(matches!(
        first_terminals[0],
        SessionEvent::Completed {
            status: StreamStatus::Cancelled,
            ..
        }
    ));

    // A consumer keyed to the latest request id sees no stale data
    let last_event_per_request: Vec<RequestId> =
        events.iter().map(SessionEvent::request_id).collect();
    let first_terminal_at = events
        .iter()
        .position(|e| e.request_id() == first && e.is_terminal())
        .unwrap();
    assert!(last_event_per_request[first_terminal_at + 1..]
        .iter()
        .all(|rid| *rid != first));

    // The successor runs to completion
    assert!(matches!(
        events.last(),
        Some(SessionEvent::Completed {
            status: StreamStatus::Completed,
            ..
        })
    ));
}

#[test]
fn external_cancel_yields_one_cancelled_sentinel() {
    let (session, rx) = session_over(synthetic_universe());
    let rid = session.submit(Vec::new(), Policy::default());

    session.cancel(rid);
    session.cancel(rid); // idempotent

    let events = collect_until_terminal(&rx, rid);
    let terminals = events.iter().filter(|e| e.is_terminal()).count();
    assert_eq!(terminals, 1);
    assert!(matches!(
        events.last(),
        Some(SessionEvent::Completed {
            status: StreamStatus::Cancelled,
            ..
        })
    ));
}

#[test]
fn sequential_requests_each_get_a_fresh_id() {
    let small: Vec<Word> = ["IRATE", "CRATE", "GRATE"]
        .iter()
        .map(|s| Word::new(s).unwrap())
        .collect();
    let (session, rx) = session_over(small);

    let first = session.submit(Vec::new(), Policy::default());
    collect_until_terminal(&rx, first);

    let second = session.submit(Vec::new(), Policy::default());
    let events = collect_until_terminal(&rx, second);

    assert_ne!(first, second);
    assert!(events.iter().all(|e| e.request_id() == second));
}
