//! Word list ingest
//!
//! Word lists are plain text, one word per line, case-insensitive.
//! Ingest errors are fatal: a malformed entry aborts the load and names
//! the offending line.

pub mod loader;

pub use loader::{load_words, parse_words, WordListError};
