//! Core data model types for drillbook.
//!
//! Answers, persisted records, generated questions and per-question results.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An expected answer: a number or a symbolic value.
///
/// Integers and floats are kept apart so prompts render the way the values
/// were written (`R2(2) = ?` but `R2^-1(2.0) = ?`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Answer {
    /// Numeric view, parsing text answers when they hold a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Answer::Integer(n) => Some(*n as f64),
            Answer::Float(x) => Some(*x),
            Answer::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Answer::Text(_))
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Integer(n) => write!(f, "{n}"),
            Answer::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            Answer::Float(x) => write!(f, "{x}"),
            Answer::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Answer {
    fn from(n: i64) -> Self {
        Answer::Integer(n)
    }
}

impl From<f64> for Answer {
    fn from(x: f64) -> Self {
        Answer::Float(x)
    }
}

impl From<&str> for Answer {
    fn from(s: &str) -> Self {
        Answer::Text(s.to_string())
    }
}

/// Which bounded collection a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Error,
    Timeout,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Error => write!(f, "error"),
            RecordKind::Timeout => write!(f, "timeout"),
        }
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(RecordKind::Error),
            "timeout" => Ok(RecordKind::Timeout),
            other => Err(format!("unknown record kind: {other}")),
        }
    }
}

/// A missed or slow question kept for replay.
///
/// Two records occupy the same slot when their `question` text is equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Prompt text, verbatim.
    pub question: String,
    /// Expected answer.
    pub correct: Answer,
    /// What the user typed.
    #[serde(default)]
    pub user: String,
    /// Seconds taken to answer.
    #[serde(rename = "time", default)]
    pub elapsed_secs: f64,
    /// `None` for legacy records whose kind cannot be determined.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<RecordKind>,
}

impl Record {
    pub fn new(
        question: impl Into<String>,
        correct: Answer,
        user: impl Into<String>,
        elapsed_secs: f64,
        kind: RecordKind,
    ) -> Self {
        Self {
            question: question.into(),
            correct,
            user: user.into(),
            elapsed_secs,
            kind: Some(kind),
        }
    }

    /// Provenance of a question replayed from this record.
    pub fn provenance(&self) -> Provenance {
        match self.kind {
            Some(RecordKind::Error) => Provenance::Error,
            Some(RecordKind::Timeout) => Provenance::Timeout,
            None => Provenance::Legacy,
        }
    }
}

/// Where a generated question came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Freshly generated.
    New,
    /// Replayed from the error collection.
    Error,
    /// Replayed from the timeout collection.
    Timeout,
    /// Replayed from a record of unknown kind.
    #[serde(rename = "old")]
    Legacy,
}

impl Provenance {
    pub fn is_replay(&self) -> bool {
        !matches!(self, Provenance::New)
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::New => write!(f, "new"),
            Provenance::Error => write!(f, "error"),
            Provenance::Timeout => write!(f, "timeout"),
            Provenance::Legacy => write!(f, "old"),
        }
    }
}

/// A prompt ready to be asked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub answer: Answer,
    pub provenance: Provenance,
}

/// Outcome of one asked question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    /// 1-based position within the batch.
    pub number: usize,
    pub question: String,
    pub correct: Answer,
    pub user: String,
    #[serde(rename = "time")]
    pub elapsed_secs: f64,
    pub is_correct: bool,
    pub provenance: Provenance,
}
