//! Core domain types
//!
//! The fundamental Wordle types with no engine dependencies: words,
//! feedback colors, and observed guess rounds. Everything here is pure
//! and cheap to copy.

mod feedback;
mod word;

pub use feedback::{Color, Feedback, GuessEntry, FEEDBACK_STATES};
pub use word::{Word, WordError, ALPHABET, WORD_LEN};
