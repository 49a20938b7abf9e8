//! Constraint filtering and candidate-set derivation
//!
//! A candidate is consistent with an observed round exactly when the
//! judge would have emitted the observed colors for that guess against
//! it. Replaying the feedback rule this way handles duplicate letters
//! for free, which the green/yellow/gray bookkeeping formulations get
//! wrong at the edges.

use super::Policy;
use crate::core::{Feedback, GuessEntry, Word};

/// Whether `candidate` is consistent with a single observed round
#[inline]
#[must_use]
pub fn consistent_with(candidate: &Word, entry: &GuessEntry) -> bool {
    Feedback::of(&entry.guess, candidate) == entry.feedback
}

/// Whether `candidate` is consistent with every observed round
///
/// Order of entries does not matter: each entry is an independent
/// constraint, and the result is their conjunction.
#[must_use]
pub fn consistent_with_history(candidate: &Word, history: &[GuessEntry]) -> bool {
    history.iter().all(|entry| consistent_with(candidate, entry))
}

/// The subset of `answers` still consistent with `history`
///
/// Universe order is preserved.
#[must_use]
pub fn surviving_answers(answers: &[Word], history: &[GuessEntry]) -> Vec<Word> {
    answers
        .iter()
        .filter(|answer| consistent_with_history(answer, history))
        .copied()
        .collect()
}

/// The subset of `guesses` eligible under the active policy
///
/// Applies the typed-prefix filter and, when `strict_guesses` is set,
/// the history constraints as well. Universe order is preserved.
#[must_use]
pub fn candidate_guesses(guesses: &[Word], history: &[GuessEntry], policy: &Policy) -> Vec<Word> {
    guesses
        .iter()
        .filter(|guess| guess.starts_with(policy.typed_prefix()))
        .filter(|guess| !policy.strict_guesses || consistent_with_history(guess, history))
        .copied()
        .collect()
}
