//! Parallel shard dispatch
//!
//! Candidate guesses are split into contiguous shards and scored on the
//! engine's rayon pool. Per-shard results stream back over a channel to
//! the submitting thread, which merges them incrementally, re-ranks, and
//! reports progress after every merge. Cancellation and the per-request
//! deadline are observed inside the shards, so an abandoned request stops
//! within one shard of work.

use super::cancel::CancelToken;
use super::scorer::{rank_top_k, score_shard, ScoredGuess};
use super::EngineError;
use crate::core::Word;
use std::sync::Arc;
use std::time::Instant;

/// Progress callback: `(ranked_so_far, shards_merged)`
///
/// Return `false` to stop early with the ranking accumulated so far, as
/// when a consumer has seen enough depth.
pub type ProgressFn<'a> = dyn FnMut(&[ScoredGuess], usize) -> bool + 'a;

/// Why a shard stopped before scoring every guess
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    Cancelled,
    TimedOut,
}

enum ShardOutcome {
    Scored(Vec<ScoredGuess>),
    Stopped(Interrupt),
}

/// Score `candidates` against `survivors` on `pool`, top `k` of the merge
///
/// `shard_count` is a target: the actual shard count is the number of
/// contiguous `ceil(len / shard_count)`-sized chunks. Progress is
/// reported after each merged shard with the shard ordinal as depth.
pub fn score_candidates(
    pool: &rayon::ThreadPool,
    candidates: Arc<Vec<Word>>,
    survivors: Arc<Vec<Word>>,
    k: usize,
    shard_count: usize,
    cancel: &CancelToken,
    deadline: Option<Instant>,
    on_progress: &mut ProgressFn<'_>,
) -> Result<Vec<ScoredGuess>, EngineError> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let shard_size = candidates.len().div_ceil(shard_count.max(1));
    let shards = candidates.len().div_ceil(shard_size);

    let (tx, rx) = crossbeam_channel::unbounded();
    {
        let candidates = Arc::clone(&candidates);
        let survivors = Arc::clone(&survivors);
        let cancel = cancel.clone();
        pool.spawn(move || {
            use rayon::prelude::*;

            (0..shards).into_par_iter().for_each_with(tx, |tx, index| {
                let start = index * shard_size;
                let end = (start + shard_size).min(candidates.len());

                let mut interrupt = None;
                let scored = score_shard(&candidates[start..end], &survivors, || {
                    if cancel.is_cancelled() {
                        interrupt = Some(Interrupt::Cancelled);
                    } else if deadline.is_some_and(|d| Instant::now() >= d) {
                        interrupt = Some(Interrupt::TimedOut);
                    }
                    interrupt.is_some()
                });

                let outcome = match scored {
                    Some(scored) => ShardOutcome::Scored(scored),
                    None => ShardOutcome::Stopped(
                        interrupt.unwrap_or(Interrupt::Cancelled),
                    ),
                };
                // The receiver may have bailed out already
                let _ = tx.send(outcome);
            });
        });
    }

    let mut merged: Vec<ScoredGuess> = Vec::with_capacity(candidates.len());
    let mut depth = 0usize;

    for outcome in rx {
        match outcome {
            ShardOutcome::Scored(scored) => {
                merged.extend(scored);
                depth += 1;

                let mut snapshot = merged.clone();
                rank_top_k(&mut snapshot, k);
                if !on_progress(&snapshot, depth) {
                    // Consumer asked to stop: the snapshot is the result
                    return Ok(snapshot);
                }
                if depth == shards {
                    return Ok(snapshot);
                }
            }
            ShardOutcome::Stopped(Interrupt::Cancelled) => {
                return Err(EngineError::Cancelled);
            }
            ShardOutcome::Stopped(Interrupt::TimedOut) => {
                return Err(EngineError::Timeout);
            }
        }
    }

    // All senders dropped without a final merge: a worker panicked
    Err(EngineError::Internal(
        "scoring pool dropped its result channel".to_owned(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Word {
        Word::new(s).unwrap()
    }

    fn pool() -> rayon::ThreadPool {
        rayon::ThreadPoolBuilder::new()
            .num_threads(2)
            .build()
            .unwrap()
    }

    fn sample_sets() -> (Arc<Vec<Word>>, Arc<Vec<Word>>) {
        let candidates = Arc::new(vec![
            word("CRANE"),
            word("SLATE"),
            word("AUDIO"),
            word("IRATE"),
            word("ZZZZZ"),
        ]);
        let survivors = Arc::new(vec![word("IRATE"), word("CRATE"), word("GRATE")]);
        (candidates, survivors)
    }

    #[test]
    fn scores_all_candidates_and_ranks() {
        let (candidates, survivors) = sample_sets();
        let ranked = score_candidates(
            &pool(),
            Arc::clone(&candidates),
            survivors,
            3,
            4,
            &CancelToken::new(),
            None,
            &mut |_, _| true,
        )
        .unwrap();

        assert_eq!(ranked.len(), 3);
        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn reports_progress_per_shard() {
        let (candidates, survivors) = sample_sets();
        let mut depths = Vec::new();

        score_candidates(
            &pool(),
            candidates,
            survivors,
            5,
            2,
            &CancelToken::new(),
            None,
            &mut |_, depth| {
                depths.push(depth);
                true
            },
        )
        .unwrap();

        assert_eq!(depths, vec![1, 2]);
    }

    #[test]
    fn cancelled_token_surfaces_as_cancelled() {
        let (candidates, survivors) = sample_sets();
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = score_candidates(
            &pool(),
            candidates,
            survivors,
            5,
            2,
            &cancel,
            None,
            &mut |_, _| true,
        );
        assert!(matches!(result, Err(EngineError::Cancelled)));
    }

    #[test]
    fn expired_deadline_surfaces_as_timeout() {
        let (candidates, survivors) = sample_sets();
        let result = score_candidates(
            &pool(),
            candidates,
            survivors,
            5,
            2,
            &CancelToken::new(),
            Some(Instant::now() - std::time::Duration::from_millis(1)),
            &mut |_, _| true,
        );
        assert!(matches!(result, Err(EngineError::Timeout)));
    }

    #[test]
    fn progress_false_stops_early_with_partial_ranking() {
        let (candidates, survivors) = sample_sets();
        let ranked = score_candidates(
            &pool(),
            candidates,
            survivors,
            5,
            5,
            &CancelToken::new(),
            None,
            &mut |_, depth| depth < 1,
        )
        .unwrap();

        assert!(!ranked.is_empty());
    }

    #[test]
    fn empty_candidates_yield_empty_ranking() {
        let ranked = score_candidates(
            &pool(),
            Arc::new(Vec::new()),
            Arc::new(vec![word("IRATE"), word("CRATE")]),
            5,
            4,
            &CancelToken::new(),
            None,
            &mut |_, _| true,
        )
        .unwrap();
        assert!(ranked.is_empty());
    }
}
