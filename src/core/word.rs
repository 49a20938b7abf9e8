//! Wordle word representation
//!
//! A Word is exactly 5 ASCII letters, normalized to uppercase. It is a
//! `Copy` 5-byte array so universes and shards can share words without
//! allocation, and byte-level ordering doubles as the lexicographic
//! tie-break for rankings.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of letters in a Wordle word
pub const WORD_LEN: usize = 5;

/// Size of the letter alphabet (A-Z)
pub const ALPHABET: usize = 26;

/// A 5-letter Wordle word stored as uppercase ASCII bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Word([u8; WORD_LEN]);

/// Error type for invalid words
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WordError {
    #[error("word must be exactly {WORD_LEN} letters, got {0}")]
    InvalidLength(usize),
    #[error("word must contain only ASCII letters, got {0:?}")]
    InvalidCharacter(char),
}

impl Word {
    /// Create a new Word from a string
    ///
    /// Input is case-insensitive and normalized to uppercase.
    ///
    /// # Errors
    /// Returns `WordError` if the input is not exactly 5 ASCII letters.
    ///
    /// # Examples
    /// ```
    /// use wordle_suggest::core::Word;
    ///
    /// let word = Word::new("crane").unwrap();
    /// assert_eq!(word.as_str(), "CRANE");
    ///
    /// assert!(Word::new("too long").is_err());
    /// assert!(Word::new("sh0rt").is_err());
    /// ```
    pub fn new(text: &str) -> Result<Self, WordError> {
        let trimmed = text.trim();
        let len = trimmed.chars().count();
        if len != WORD_LEN {
            return Err(WordError::InvalidLength(len));
        }

        let mut bytes = [0u8; WORD_LEN];
        for (i, ch) in trimmed.chars().enumerate() {
            if !ch.is_ascii_alphabetic() {
                return Err(WordError::InvalidCharacter(ch));
            }
            bytes[i] = ch.to_ascii_uppercase() as u8;
        }

        Ok(Self(bytes))
    }

    /// Get the word as a byte array
    #[inline]
    #[must_use]
    pub const fn bytes(&self) -> &[u8; WORD_LEN] {
        &self.0
    }

    /// Get the word as a string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Construction only admits ASCII letters
        std::str::from_utf8(&self.0).expect("word bytes are ASCII")
    }

    /// Zero-based alphabet index of the letter at `position`
    #[inline]
    #[must_use]
    pub const fn letter_index(&self, position: usize) -> usize {
        (self.0[position] - b'A') as usize
    }

    /// Count of each letter in the word, indexed by alphabet position
    ///
    /// Used for feedback calculation with duplicate letters.
    #[inline]
    #[must_use]
    pub fn letter_counts(&self) -> [u8; ALPHABET] {
        let mut counts = [0u8; ALPHABET];
        for i in 0..WORD_LEN {
            counts[self.letter_index(i)] += 1;
        }
        counts
    }

    /// Whether this word starts with the given prefix, byte-for-byte
    ///
    /// The prefix is expected to be uppercase already; an empty prefix
    /// matches every word.
    #[inline]
    #[must_use]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix.as_bytes())
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Word {
    type Err = WordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Word {
    type Error = WordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Word> for String {
    fn from(word: Word) -> Self {
        word.as_str().to_owned()
    }
}
