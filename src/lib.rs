//! Wordle suggestion engine
//!
//! After every observed round of guess and colored feedback, recomputes
//! a ranked list of next best guesses by expected information gain,
//! together with the number of answers still consistent with the
//! history. Scoring is parallel, cancellable mid-flight, and exposed
//! through an in-process message protocol and an SSE HTTP endpoint.
//!
//! # Quick start
//!
//! ```
//! use wordle_suggest::core::{Feedback, GuessEntry, Word};
//! use wordle_suggest::engine::{CancelToken, Engine, EngineConfig, Policy};
//!
//! let answers = vec![Word::new("crane").unwrap(), Word::new("slate").unwrap()];
//! let guesses = answers.clone();
//! let engine = Engine::new(answers, guesses, EngineConfig::default()).unwrap();
//!
//! let guess = Word::new("slate").unwrap();
//! let history = vec![GuessEntry::new(guess, Feedback::parse("BBGBG").unwrap())];
//!
//! let report = engine
//!     .suggest(&history, &Policy::default(), &CancelToken::new(), None)
//!     .unwrap();
//! assert_eq!(report.remaining_answers, 1);
//! ```

// Core domain types
pub mod core;

// The suggestion engine: filtering, scoring, parallel dispatch
pub mod engine;

// Request lifecycle: preemption, cancellation, event streams
pub mod session;

// Transports: wire formats, in-process protocol, SSE server
pub mod adapter;

// Word list ingest
pub mod wordlists;
