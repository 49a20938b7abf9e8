//! Word list loading
//!
//! Blank lines are ignored; every other line must parse as a 5-letter
//! word or the whole load fails. Input case is normalized to uppercase
//! by `Word` construction.

use crate::core::{Word, WordError};
use std::io;
use std::path::Path;
use thiserror::Error;

/// Errors raised while ingesting a word list
#[derive(Debug, Error)]
pub enum WordListError {
    #[error("failed to read word list: {0}")]
    Io(#[from] io::Error),
    #[error("invalid word at line {line}: {source}")]
    InvalidWord { line: usize, source: WordError },
}

/// Parse a word list from text
///
/// # Errors
/// Returns `WordListError::InvalidWord` naming the first malformed line.
pub fn parse_words(content: &str) -> Result<Vec<Word>, WordListError> {
    let mut words = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let word = Word::new(trimmed).map_err(|source| WordListError::InvalidWord {
            line: index + 1,
            source,
        })?;
        words.push(word);
    }
    Ok(words)
}

/// Load a word list from a file
///
/// # Errors
/// Returns an I/O error if the file cannot be read, or the first ingest
/// error in its content.
///
/// # Examples
/// ```no_run
/// use wordle_suggest::wordlists::load_words;
///
/// let answers = load_words("data/answers.txt").unwrap();
/// println!("loaded {} answers", answers.len());
/// ```
pub fn load_words<P: AsRef<Path>>(path: P) -> Result<Vec<Word>, WordListError> {
    let content = std::fs::read_to_string(path)?;
    parse_words(&content)
}
