//! Answer checking.
//!
//! Numbers are compared after rounding both sides to `round_level` decimal
//! places. Anything that does not parse as a number on either side falls back
//! to a trimmed, case-insensitive string comparison. That fallback is the
//! normal path for symbolic answers, not an error.

use serde::{Deserialize, Serialize};

use crate::model::Answer;

/// Decimal places compared by default.
pub const DEFAULT_ROUND_LEVEL: u32 = 2;

/// How raw input is read before comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryMode {
    /// Taken as typed (after trimming).
    #[default]
    Verbatim,
    /// Integer answers: `_` and `,` group separators are dropped, and a
    /// leading `r` means the digits were typed right to left (`r12.34` is 4321).
    Integer,
}

/// Compares user input against expected answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerValidator {
    round_level: u32,
    entry_mode: EntryMode,
}

impl Default for AnswerValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl AnswerValidator {
    pub fn new() -> Self {
        Self {
            round_level: DEFAULT_ROUND_LEVEL,
            entry_mode: EntryMode::Verbatim,
        }
    }

    pub fn with_round_level(mut self, round_level: u32) -> Self {
        self.round_level = round_level;
        self
    }

    pub fn with_entry_mode(mut self, entry_mode: EntryMode) -> Self {
        self.entry_mode = entry_mode;
        self
    }

    pub fn round_level(&self) -> u32 {
        self.round_level
    }

    pub fn entry_mode(&self) -> EntryMode {
        self.entry_mode
    }

    /// The text that is actually compared for a raw input.
    pub fn normalize(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        match self.entry_mode {
            EntryMode::Verbatim => trimmed.to_string(),
            EntryMode::Integer => reversed_entry(trimmed).unwrap_or_else(|| {
                trimmed
                    .chars()
                    .filter(|c| !matches!(c, '_' | ','))
                    .collect()
            }),
        }
    }

    /// Whether `raw` answers `correct`.
    pub fn validate(&self, raw: &str, correct: &Answer) -> bool {
        let user = self.normalize(raw);

        let user_num = user.parse::<f64>().ok();
        if let (Some(u), Some(c)) = (user_num, correct.as_f64()) {
            return round_to(u, self.round_level) == round_to(c, self.round_level);
        }

        user.trim().to_lowercase() == correct.to_string().trim().to_lowercase()
    }
}

/// Round to `places` decimals, judged on the exact binary value of `x`.
///
/// `2.675` is stored as 2.67499999..., so it rounds down to 2.67; exact
/// ties go to the even digit.
pub fn round_to(x: f64, places: u32) -> f64 {
    format!("{x:.prec$}", prec = places as usize)
        .parse()
        .unwrap_or(x)
}

/// Read an `r`-prefixed entry right to left, keeping only its digits.
fn reversed_entry(input: &str) -> Option<String> {
    let rest = input
        .strip_prefix('r')
        .or_else(|| input.strip_prefix('R'))?;
    let digits: String = rest.chars().filter(char::is_ascii_digit).rev().collect();
    if digits.is_empty() {
        Some("0".to_string())
    } else {
        Some(digits)
    }
}
