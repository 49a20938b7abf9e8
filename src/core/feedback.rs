//! Wordle feedback calculation and representation
//!
//! Feedback encodes the 5 tile colors of a guess using base-3 encoding:
//! - 0 = Gray (letter not in word)
//! - 1 = Yellow (letter in word, wrong position)
//! - 2 = Green (letter in correct position)
//!
//! The whole feedback is a single u8 value (0-242), where position i
//! contributes digit × 3^i to the total. Packed feedback doubles as a
//! dense partition key, so scoring never allocates a map.

use super::word::{Word, ALPHABET, WORD_LEN};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of distinct feedback values (3^5)
pub const FEEDBACK_STATES: usize = 243;

/// Color of a single feedback tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Gray,
    Yellow,
    Green,
}

impl Color {
    const fn digit(self) -> u8 {
        match self {
            Self::Gray => 0,
            Self::Yellow => 1,
            Self::Green => 2,
        }
    }

    const fn from_digit(digit: u8) -> Self {
        match digit {
            2 => Self::Green,
            1 => Self::Yellow,
            _ => Self::Gray,
        }
    }
}

/// Feedback for a full 5-letter guess, packed base-3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Feedback(u8);

impl Feedback {
    /// All greens (the guess is the answer)
    pub const PERFECT: Self = Self(242); // 2 + 2×3 + 2×9 + 2×27 + 2×81

    /// Create feedback from a raw packed value
    ///
    /// # Panics
    /// Panics in debug mode if value >= 243
    #[inline]
    #[must_use]
    pub const fn from_value(value: u8) -> Self {
        debug_assert!(value < FEEDBACK_STATES as u8);
        Self(value)
    }

    /// Get the raw packed value (0-242)
    #[inline]
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Check whether every tile is green
    #[inline]
    #[must_use]
    pub const fn is_perfect(self) -> bool {
        self.0 == Self::PERFECT.0
    }

    /// Feedback a Wordle judge emits for `guess` against `answer`
    ///
    /// Implements the de facto duplicate-letter rules with two passes:
    /// greens first, consuming the answer's letter pool, then yellows from
    /// whatever pool remains. Green always wins the slot over yellow.
    ///
    /// Not symmetric: `Feedback::of(g, a)` differs from `Feedback::of(a, g)`
    /// in general.
    ///
    /// # Examples
    /// ```
    /// use wordle_suggest::core::{Feedback, Word};
    ///
    /// let guess = Word::new("crane").unwrap();
    /// let answer = Word::new("slate").unwrap();
    ///
    /// // C(gray) R(gray) A(green) N(gray) E(green)
    /// // 0 + 0×3 + 2×9 + 0×27 + 2×81 = 180
    /// assert_eq!(Feedback::of(&guess, &answer).value(), 180);
    /// ```
    #[must_use]
    pub fn of(guess: &Word, answer: &Word) -> Self {
        let mut digits = [0u8; WORD_LEN];
        let mut remaining: [u8; ALPHABET] = answer.letter_counts();

        // Green pass: exact matches consume from the pool first
        for i in 0..WORD_LEN {
            if guess.bytes()[i] == answer.bytes()[i] {
                digits[i] = 2;
                remaining[guess.letter_index(i)] -= 1;
            }
        }

        // Yellow pass: misplaced letters draw from whatever is left
        for i in 0..WORD_LEN {
            if digits[i] == 0 {
                let counter = &mut remaining[guess.letter_index(i)];
                if *counter > 0 {
                    *counter -= 1;
                    digits[i] = 1;
                }
            }
        }

        let mut packed = 0u8;
        let mut multiplier = 1u8;
        for &digit in &digits {
            packed += digit * multiplier;
            multiplier = multiplier.wrapping_mul(3);
        }

        Self(packed)
    }

    /// Build feedback from five tile colors, position 0 first
    #[must_use]
    pub fn from_colors(colors: [Color; WORD_LEN]) -> Self {
        let mut packed = 0u8;
        let mut multiplier = 1u8;
        for color in colors {
            packed += color.digit() * multiplier;
            multiplier = multiplier.wrapping_mul(3);
        }
        Self(packed)
    }

    /// Decode the packed value back into five tile colors
    #[must_use]
    pub fn colors(self) -> [Color; WORD_LEN] {
        let mut colors = [Color::Gray; WORD_LEN];
        let mut value = self.0;
        for slot in &mut colors {
            *slot = Color::from_digit(value % 3);
            value /= 3;
        }
        colors
    }

    /// Parse feedback from a string like "GYBBG"
    ///
    /// Accepts 'G'/'g' for green, 'Y'/'y' for yellow, and 'B'/'b', '-' or
    /// '_' for gray.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.chars().count() != WORD_LEN {
            return None;
        }

        let mut colors = [Color::Gray; WORD_LEN];
        for (i, ch) in s.chars().enumerate() {
            colors[i] = match ch {
                'G' | 'g' => Color::Green,
                'Y' | 'y' => Color::Yellow,
                'B' | 'b' | '-' | '_' => Color::Gray,
                _ => return None,
            };
        }

        Some(Self::from_colors(colors))
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for color in self.colors() {
            f.write_str(match color {
                Color::Green => "G",
                Color::Yellow => "Y",
                Color::Gray => "B",
            })?;
        }
        Ok(())
    }
}

/// A single observed round: the guess and the colors it earned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessEntry {
    pub guess: Word,
    pub feedback: Feedback,
}

impl GuessEntry {
    #[must_use]
    pub const fn new(guess: Word, feedback: Feedback) -> Self {
        Self { guess, feedback }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn word(s: &str) -> Word {
        Word::new(s).unwrap()
    }

    #[test]
    fn perfect_constant_is_all_green() {
        assert_eq!(Feedback::PERFECT.value(), 242);
        assert!(Feedback::PERFECT.is_perfect());
        assert_eq!(Feedback::PERFECT.colors(), [Color::Green; 5]);
    }

    #[test]
    fn feedback_self_identity() {
        // Guessing the answer itself is always all green
        for s in ["CRANE", "SLATE", "AUDIO", "ZZZZZ", "AAAAA"] {
            let w = word(s);
            assert_eq!(Feedback::of(&w, &w), Feedback::PERFECT);
        }
    }

    // guess vs answer, expected colors low position first
    #[test_case("SPEED", "ERASE", "YBYYB" ; "duplicate letters in guess, both yellow")]
    #[test_case("EEEEE", "SPEED", "BBGGB" ; "triple in guess vs double in answer")]
    #[test_case("SLATE", "SLATE", "GGGGG" ; "all green")]
    #[test_case("CRANE", "SLATE", "BBGBG" ; "classic opener")]
    #[test_case("ROBOT", "FLOOR", "YYBGB" ; "green takes priority over yellow")]
    #[test_case("ABCDE", "FGHIJ", "BBBBB" ; "all gray")]
    fn feedback_duplicate_rules(guess: &str, answer: &str, expected: &str) {
        let observed = Feedback::of(&word(guess), &word(answer));
        assert_eq!(
            observed,
            Feedback::parse(expected).unwrap(),
            "guess={guess}, answer={answer}, got {observed}"
        );
    }

    #[test]
    fn feedback_not_symmetric() {
        let speed = word("SPEED");
        let erase = word("ERASE");
        assert_ne!(Feedback::of(&speed, &erase), Feedback::of(&erase, &speed));
    }

    #[test]
    fn packed_encoding_round_trips() {
        for value in 0..FEEDBACK_STATES as u8 {
            let feedback = Feedback::from_value(value);
            assert_eq!(Feedback::from_colors(feedback.colors()), feedback);
        }
    }

    #[test]
    fn packed_values_are_unique() {
        let mut seen = [false; FEEDBACK_STATES];
        for value in 0..FEEDBACK_STATES as u8 {
            let idx = Feedback::from_value(value).value() as usize;
            assert!(!seen[idx], "duplicate packed value {idx}");
            seen[idx] = true;
        }
    }

    #[test]
    fn parse_accepts_spec_letters() {
        let parsed = Feedback::parse("GYB-_").unwrap();
        assert_eq!(
            parsed.colors(),
            [
                Color::Green,
                Color::Yellow,
                Color::Gray,
                Color::Gray,
                Color::Gray
            ]
        );

        assert!(Feedback::parse("GYBG").is_none()); // too short
        assert!(Feedback::parse("GYBGGG").is_none()); // too long
        assert!(Feedback::parse("GYXBG").is_none()); // bad letter
    }

    #[test]
    fn display_matches_parse() {
        let feedback = Feedback::parse("YBYYB").unwrap();
        assert_eq!(feedback.to_string(), "YBYYB");
    }

    #[test]
    fn color_wire_names_are_lowercase() {
        assert_eq!(serde_json::to_string(&Color::Gray).unwrap(), "\"gray\"");
        assert_eq!(serde_json::to_string(&Color::Yellow).unwrap(), "\"yellow\"");
        assert_eq!(serde_json::to_string(&Color::Green).unwrap(), "\"green\"");
    }
}
