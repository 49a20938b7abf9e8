//! Wire formats
//!
//! The only place where engine types meet the outside world's encoding.
//! Both transports share the history/suggestion DTOs; the in-process
//! protocol adds its tagged request/response envelopes and the SSE
//! transport its event payloads.
//!
//! JSON has no +infinity, so the forced-win sentinel crosses the wire as
//! the largest finite f64. Receivers treat any score at or above
//! [`SENTINEL_SCORE`] as a guaranteed solve.

use crate::core::{Color, Feedback, GuessEntry, Word, WORD_LEN};
use crate::engine::ScoredGuess;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wire encoding of the forced-win score
pub const SENTINEL_SCORE: f64 = f64::MAX;

/// Errors decoding wire payloads into engine types
#[derive(Debug, Error)]
pub enum WireError {
    #[error("history entry {index}: {source}")]
    InvalidWord {
        index: usize,
        source: crate::core::WordError,
    },
    #[error("history entry {index}: feedback must have {WORD_LEN} colors, got {got}")]
    InvalidFeedback { index: usize, got: usize },
}

/// One observed round as it appears on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntryDto {
    pub word: String,
    pub feedback: FeedbackDto,
}

/// Tile colors for one guess
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackDto {
    pub colors: Vec<Color>,
}

impl HistoryEntryDto {
    /// Encode an engine-side entry for the wire
    #[must_use]
    pub fn from_entry(entry: &GuessEntry) -> Self {
        Self {
            word: entry.guess.as_str().to_owned(),
            feedback: FeedbackDto {
                colors: entry.feedback.colors().to_vec(),
            },
        }
    }
}

/// Decode a wire history into engine entries
///
/// # Errors
/// Returns the first malformed entry, identified by its index.
pub fn decode_history(entries: &[HistoryEntryDto]) -> Result<Vec<GuessEntry>, WireError> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let guess = Word::new(&entry.word)
                .map_err(|source| WireError::InvalidWord { index, source })?;

            let colors: [Color; WORD_LEN] =
                entry.feedback.colors.as_slice().try_into().map_err(|_| {
                    WireError::InvalidFeedback {
                        index,
                        got: entry.feedback.colors.len(),
                    }
                })?;

            Ok(GuessEntry::new(guess, Feedback::from_colors(colors)))
        })
        .collect()
}

/// One ranked suggestion on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionDto {
    pub word: String,
    pub score: f64,
}

impl SuggestionDto {
    /// Encode a scored guess, rewriting the infinite sentinel
    #[must_use]
    pub fn from_scored(scored: &ScoredGuess) -> Self {
        Self {
            word: scored.word.as_str().to_owned(),
            score: if scored.score.is_infinite() {
                SENTINEL_SCORE
            } else {
                scored.score
            },
        }
    }

    /// Whether this score marks a guaranteed solve
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.score >= SENTINEL_SCORE
    }
}

/// Encode a full ranking for the wire
#[must_use]
pub fn encode_suggestions(ranked: &[ScoredGuess]) -> Vec<SuggestionDto> {
    ranked.iter().map(SuggestionDto::from_scored).collect()
}

// ---------------------------------------------------------------------------
// In-process messaging protocol
// ---------------------------------------------------------------------------

/// Requests accepted by the in-process compute loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ComputeRequest {
    #[serde(rename = "INIT")]
    Init {
        answers: Vec<String>,
        guesses: Vec<String>,
    },
    #[serde(rename = "SOLVE", rename_all = "camelCase")]
    Solve {
        request_id: String,
        history: Vec<HistoryEntryDto>,
        #[serde(default)]
        strict_guesses: bool,
        #[serde(default)]
        typed_prefix: String,
    },
    #[serde(rename = "CANCEL", rename_all = "camelCase")]
    Cancel { request_id: String },
}

/// Responses the compute loop posts back
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ComputeResponse {
    #[serde(rename = "INIT_COMPLETE")]
    InitComplete,
    #[serde(rename = "SOLVE_COMPLETE", rename_all = "camelCase")]
    SolveComplete {
        request_id: String,
        suggestions: Vec<SuggestionDto>,
        remaining_answers: usize,
    },
    #[serde(rename = "ERROR", rename_all = "camelCase")]
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
        error: String,
    },
}

// ---------------------------------------------------------------------------
// SSE transport payloads
// ---------------------------------------------------------------------------

/// Body of `POST /api/v1/suggest/stream`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestStreamRequest {
    #[serde(default)]
    pub history: Vec<HistoryEntryDto>,
    #[serde(default)]
    pub max_depth: Option<usize>,
    #[serde(default)]
    pub strict_guesses: bool,
    #[serde(default)]
    pub typed_prefix: String,
}

/// Payload of the `stream-created` frame
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamCreated {
    pub stream_id: String,
}

/// Payload of a `suggestions` frame
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsEvent {
    pub stream_id: String,
    pub suggestions: Vec<SuggestionDto>,
    pub top_suggestion: Option<SuggestionDto>,
    pub depth: usize,
    pub remaining_answers: usize,
}

impl SuggestionsEvent {
    /// Build a frame payload from a ranking snapshot
    #[must_use]
    pub fn new(
        stream_id: String,
        ranked: &[ScoredGuess],
        depth: usize,
        remaining_answers: usize,
    ) -> Self {
        let suggestions = encode_suggestions(ranked);
        let top_suggestion = suggestions.first().cloned();
        Self {
            stream_id,
            suggestions,
            top_suggestion,
            depth,
            remaining_answers,
        }
    }
}

/// Payload of the `stream-completed` frame
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamCompleted {
    pub stream_id: String,
    pub status: String,
}

/// Payload of a terminal `error` frame
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamError {
    pub stream_id: String,
    pub error: String,
}

/// Body of `POST /api/v1/suggest/close`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseRequest {
    pub stream_id: String,
}

/// Body of the close endpoint's success response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseResponse {
    pub status: String,
}
