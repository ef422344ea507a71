//! Error types for operand specifications and record persistence.
//!
//! Spec errors come in two kinds that callers report differently: a term
//! that does not parse at all, and a spec that parses but can only ever
//! produce the excluded value 1.

use thiserror::Error;

/// Errors produced while parsing or accepting a range specification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    /// The spec contained no terms at all.
    #[error("specification is empty")]
    Empty,

    /// A comma-separated term was blank.
    #[error("empty term at position {position}")]
    EmptyTerm { position: usize },

    /// A term could not be read as an integer or an `int~int` range.
    #[error("invalid term '{term}': {reason}")]
    Syntax { term: String, reason: String },

    /// The spec parsed, but every component can only produce 1.
    #[error("'{spec}' can only produce the value 1; include at least one other value")]
    OnlyOnes { spec: String },
}

impl SpecError {
    /// Returns `true` if the input text itself is malformed.
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            SpecError::Empty | SpecError::EmptyTerm { .. } | SpecError::Syntax { .. }
        )
    }

    /// Returns `true` if the spec parsed but failed the non-1 coverage check.
    pub fn is_constraint(&self) -> bool {
        matches!(self, SpecError::OnlyOnes { .. })
    }
}

/// Errors from reading or writing the persisted record blob.
///
/// `RecordStore::load` never surfaces these; it logs them and starts empty.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure while reading or replacing the blob.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The blob exists but is not valid JSON of a known shape.
    #[error("malformed record blob: {0}")]
    Malformed(String),
}
