//! Information-gain scoring
//!
//! For each candidate guess the surviving answers are partitioned into
//! the 243 feedback buckets it can produce; the gain of the guess is the
//! expected entropy reduction over that partition. Buckets are a dense
//! count array keyed by packed feedback, so the hot loop allocates
//! nothing.

use crate::core::{Feedback, Word, FEEDBACK_STATES};
use std::cmp::Ordering;

/// A candidate guess with its information gain in bits
///
/// `f64::INFINITY` is the forced-win sentinel: the lone surviving answer
/// itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredGuess {
    pub word: Word,
    pub score: f64,
}

impl ScoredGuess {
    #[must_use]
    pub const fn new(word: Word, score: f64) -> Self {
        Self { word, score }
    }
}

/// Ranking comparator: score descending, ties broken by word ascending
///
/// Total and deterministic, so identical inputs always rank identically.
#[must_use]
pub fn compare(a: &ScoredGuess, b: &ScoredGuess) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.word.cmp(&b.word))
}

/// Sort `scored` by [`compare`] and truncate to the top `k`
pub fn rank_top_k(scored: &mut Vec<ScoredGuess>, k: usize) {
    scored.sort_unstable_by(compare);
    scored.truncate(k);
}

/// Expected information gain of `guess` over the surviving answers
///
/// Let N be the number of survivors. Before the guess the entropy is
/// log2(N); after observing feedback f the survivors shrink to the
/// bucket B_f, leaving log2(|B_f|) bits. The gain is
///
/// ```text
/// log2(N) − Σ_f (|B_f|/N) · log2(|B_f|)
/// ```
///
/// A guess whose buckets all hold at most one answer achieves the full
/// log2(N).
///
/// # Examples
/// ```
/// use wordle_suggest::core::Word;
/// use wordle_suggest::engine::information_gain;
///
/// let survivors = vec![Word::new("AAAAA").unwrap(), Word::new("AAAAB").unwrap()];
/// let gain = information_gain(&Word::new("AAAAA").unwrap(), &survivors);
/// assert!((gain - 1.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn information_gain(guess: &Word, survivors: &[Word]) -> f64 {
    if survivors.len() < 2 {
        return 0.0;
    }

    let mut buckets = [0u32; FEEDBACK_STATES];
    for answer in survivors {
        buckets[Feedback::of(guess, answer).value() as usize] += 1;
    }

    let total = survivors.len() as f64;
    let entropy_before = total.log2();

    // Buckets of size 0 or 1 contribute no residual entropy
    let entropy_after: f64 = buckets
        .iter()
        .filter(|&&count| count > 1)
        .map(|&count| {
            let count = f64::from(count);
            (count / total) * count.log2()
        })
        .sum();

    entropy_before - entropy_after
}

/// Score every guess in `shard` against the shared survivors
///
/// Returns the unsorted per-shard scores, or `None` if `should_stop`
/// reports an interruption first. The callback is consulted once per
/// guess, which bounds abandon latency well inside a shard.
pub fn score_shard<F>(
    shard: &[Word],
    survivors: &[Word],
    mut should_stop: F,
) -> Option<Vec<ScoredGuess>>
where
    F: FnMut() -> bool,
{
    let mut scored = Vec::with_capacity(shard.len());
    for guess in shard {
        if should_stop() {
            return None;
        }
        scored.push(ScoredGuess::new(*guess, information_gain(guess, survivors)));
    }
    Some(scored)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Word {
        Word::new(s).unwrap()
    }

    fn words(list: &[&str]) -> Vec<Word> {
        list.iter().map(|s| word(s)).collect()
    }

    #[test]
    fn gain_is_zero_for_degenerate_survivor_sets() {
        assert_eq!(information_gain(&word("CRANE"), &[]), 0.0);
        assert_eq!(information_gain(&word("CRANE"), &[word("SLATE")]), 0.0);
    }

    #[test]
    fn gain_of_fully_separating_guess_is_log2_n() {
        // AAAAA vs {AAAAA, AAAAB}: GGGGG and GGGGB, two singleton buckets
        let survivors = words(&["AAAAA", "AAAAB"]);
        let gain = information_gain(&word("AAAAA"), &survivors);
        assert!((gain - 1.0).abs() < 1e-9);
    }

    #[test]
    fn gain_of_non_separating_guess_is_zero() {
        // ZZZZZ shares no letter with either survivor: one bucket of two
        let survivors = words(&["AAAAA", "AAAAB"]);
        let gain = information_gain(&word("ZZZZZ"), &survivors);
        assert!(gain.abs() < 1e-9);
    }

    #[test]
    fn gain_stays_within_bounds() {
        let survivors = words(&["IRATE", "CRATE", "GRATE", "SLATE", "AUDIO"]);
        let limit = (survivors.len() as f64).log2();

        for s in ["CRANE", "SALET", "ZZZZZ", "IRATE"] {
            let gain = information_gain(&word(s), &survivors);
            assert!(gain >= 0.0, "{s} produced negative gain {gain}");
            assert!(gain <= limit + 1e-9, "{s} exceeded log2(N): {gain}");
        }
    }

    #[test]
    fn gain_is_deterministic() {
        let survivors = words(&["IRATE", "CRATE", "GRATE", "SLATE"]);
        let guess = word("CRANE");
        assert_eq!(
            information_gain(&guess, &survivors).to_bits(),
            information_gain(&guess, &survivors).to_bits()
        );
    }

    #[test]
    fn ranking_orders_by_score_then_word() {
        let mut scored = vec![
            ScoredGuess::new(word("ZZZZZ"), 1.0),
            ScoredGuess::new(word("AAAAB"), 1.0),
            ScoredGuess::new(word("AAAAA"), 1.0),
            ScoredGuess::new(word("BBBBB"), 2.0),
        ];
        rank_top_k(&mut scored, 3);

        let names: Vec<&str> = scored.iter().map(|s| s.word.as_str()).collect();
        assert_eq!(names, vec!["BBBBB", "AAAAA", "AAAAB"]);
    }

    #[test]
    fn ranking_places_sentinel_first() {
        let mut scored = vec![
            ScoredGuess::new(word("AAAAA"), 3.5),
            ScoredGuess::new(word("CRANE"), f64::INFINITY),
        ];
        rank_top_k(&mut scored, 2);
        assert_eq!(scored[0].word, word("CRANE"));
    }

    #[test]
    fn ranking_truncates_to_k() {
        let mut scored = vec![
            ScoredGuess::new(word("AAAAA"), 0.1),
            ScoredGuess::new(word("BBBBB"), 0.2),
            ScoredGuess::new(word("CCCCC"), 0.3),
        ];
        rank_top_k(&mut scored, 2);
        assert_eq!(scored.len(), 2);
    }

    #[test]
    fn shard_scoring_covers_every_guess() {
        let survivors = words(&["IRATE", "CRATE", "GRATE"]);
        let shard = words(&["CRANE", "SLATE"]);

        let scored = score_shard(&shard, &survivors, || false).unwrap();
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].word, word("CRANE"));
    }

    #[test]
    fn shard_scoring_stops_when_interrupted() {
        let survivors = words(&["IRATE", "CRATE"]);
        let shard = words(&["CRANE", "SLATE", "AUDIO"]);

        let mut budget = 2;
        let scored = score_shard(&shard, &survivors, move || {
            budget -= 1;
            budget < 0
        });
        assert!(scored.is_none());
    }
}
