//! The suggestion engine
//!
//! Owns the immutable answer/guess universes and a rayon pool, and turns
//! a guess history plus policy flags into a ranked list of next guesses.
//! All per-request state lives on the caller's stack; the engine itself
//! is shared freely behind an `Arc`.

pub mod cancel;
pub mod dispatch;
pub mod filter;
pub mod scorer;

pub use cancel::CancelToken;
pub use scorer::{information_gain, ScoredGuess};

use crate::core::{GuessEntry, Word};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Default number of suggestions returned
pub const DEFAULT_TOP_K: usize = 5;

/// Default number of contiguous shards per request
pub const DEFAULT_SHARD_COUNT: usize = 4;

/// Upper bound on worker threads regardless of core count
const MAX_WORKERS: usize = 8;

/// Errors the engine raises
///
/// Per-request conditions (`Cancelled`, `Timeout`, `Internal`) are
/// confined to their request and never poison the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("engine not initialized")]
    NotInitialized,
    #[error("request cancelled")]
    Cancelled,
    #[error("request timed out")]
    Timeout,
    #[error("internal error: {0}")]
    Internal(String),
}

/// Per-request policy flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    /// Candidate guesses must themselves satisfy the history
    pub strict_guesses: bool,
    /// Candidate guesses must begin with this prefix (0-5 letters)
    pub typed_prefix: String,
    /// Maximum number of suggestions returned
    pub top_k: usize,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            strict_guesses: false,
            typed_prefix: String::new(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl Policy {
    /// The typed prefix normalized for byte-wise matching
    #[must_use]
    pub fn typed_prefix(&self) -> &str {
        &self.typed_prefix
    }

    /// Normalize the prefix to uppercase in place
    pub fn normalize(mut self) -> Self {
        self.typed_prefix = self.typed_prefix.trim().to_ascii_uppercase();
        self
    }
}

/// Final outcome of one suggestion request
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionReport {
    /// Top suggestions, best first
    pub ranked: Vec<ScoredGuess>,
    /// Number of answers still consistent with the history
    pub remaining_answers: usize,
}

/// Engine tuning knobs
///
/// Defaults follow the sizing policy: `min(max(cores − 1, 1), 8)`
/// workers and 4 shards. Neither is a correctness property.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    /// Worker thread count; `None` derives from the core count
    pub workers: Option<usize>,
    /// Target shard count per request; `None` uses the default
    pub shard_count: Option<usize>,
}

impl EngineConfig {
    fn resolved_workers(self) -> usize {
        self.workers.unwrap_or_else(default_workers).max(1)
    }

    fn resolved_shards(self) -> usize {
        self.shard_count.unwrap_or(DEFAULT_SHARD_COUNT).max(1)
    }
}

fn default_workers() -> usize {
    let cores = std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1);
    cores.saturating_sub(1).clamp(1, MAX_WORKERS)
}

/// The suggestion engine handle
pub struct Engine {
    answers: Arc<Vec<Word>>,
    guesses: Arc<Vec<Word>>,
    pool: rayon::ThreadPool,
    shard_count: usize,
}

impl Engine {
    /// Build an engine over the two word universes
    ///
    /// Universes are immutable for the engine's lifetime and shared
    /// read-only with every worker.
    ///
    /// # Errors
    /// Returns `EngineError::Internal` if the thread pool cannot be
    /// built.
    pub fn new(
        answers: Vec<Word>,
        guesses: Vec<Word>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.resolved_workers())
            .thread_name(|i| format!("suggest-worker-{i}"))
            .build()
            .map_err(|e| EngineError::Internal(e.to_string()))?;

        Ok(Self {
            answers: Arc::new(answers),
            guesses: Arc::new(guesses),
            pool,
            shard_count: config.resolved_shards(),
        })
    }

    /// The full answer universe
    #[must_use]
    pub fn answer_universe(&self) -> &[Word] {
        &self.answers
    }

    /// The full guess universe
    #[must_use]
    pub fn guess_universe(&self) -> &[Word] {
        &self.guesses
    }

    /// Single-shot suggestion: compute the final ranking in one call
    ///
    /// # Errors
    /// `Cancelled` if the token fires mid-request, `Timeout` if the
    /// deadline passes, `Internal` on a worker failure.
    pub fn suggest(
        &self,
        history: &[GuessEntry],
        policy: &Policy,
        cancel: &CancelToken,
        deadline: Option<Instant>,
    ) -> Result<SuggestionReport, EngineError> {
        self.suggest_stream(history, policy, cancel, deadline, |_, _, _| true)
    }

    /// Streaming suggestion: report a progressively improving ranking
    ///
    /// `on_progress(ranked_so_far, depth, remaining_answers)` runs on
    /// the calling thread after every merged shard; `depth` counts
    /// merged shards. Returning `false` finishes the request early with
    /// the ranking accumulated so far. Degenerate requests (no or one
    /// surviving answer, no candidates) report exactly once at depth 1.
    ///
    /// # Errors
    /// Same conditions as [`Engine::suggest`].
    pub fn suggest_stream<F>(
        &self,
        history: &[GuessEntry],
        policy: &Policy,
        cancel: &CancelToken,
        deadline: Option<Instant>,
        mut on_progress: F,
    ) -> Result<SuggestionReport, EngineError>
    where
        F: FnMut(&[ScoredGuess], usize, usize) -> bool,
    {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let survivors = filter::surviving_answers(&self.answers, history);
        let remaining = survivors.len();

        // Fail-soft: a contradictory history is an empty ranking
        if remaining == 0 {
            on_progress(&[], 1, 0);
            return Ok(SuggestionReport {
                ranked: Vec::new(),
                remaining_answers: 0,
            });
        }

        // Forced win: the lone survivor is the guaranteed next guess
        if remaining == 1 {
            let ranked = vec![ScoredGuess::new(survivors[0], f64::INFINITY)];
            on_progress(&ranked, 1, 1);
            return Ok(SuggestionReport {
                ranked,
                remaining_answers: 1,
            });
        }

        let policy = policy.clone().normalize();
        let candidates = filter::candidate_guesses(&self.guesses, history, &policy);
        if candidates.is_empty() {
            on_progress(&[], 1, remaining);
            return Ok(SuggestionReport {
                ranked: Vec::new(),
                remaining_answers: remaining,
            });
        }

        let ranked = dispatch::score_candidates(
            &self.pool,
            Arc::new(candidates),
            Arc::new(survivors),
            policy.top_k,
            self.shard_count,
            cancel,
            deadline,
            &mut |ranked, depth| on_progress(ranked, depth, remaining),
        )?;

        Ok(SuggestionReport {
            ranked,
            remaining_answers: remaining,
        })
    }
}
