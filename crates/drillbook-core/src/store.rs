//! Bounded, deduplicated record store of missed and slow questions.
//!
//! Two independent FIFO collections, `errors` and `timeouts`, each hold at
//! most one record per question text and at most `capacity` records. The
//! oldest record is evicted when a new question arrives at capacity, and a
//! correct answer clears the question from both collections.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;
use crate::model::{Answer, Record, RecordKind};
use crate::persistence::BlobStore;

/// Records kept per collection.
pub const DEFAULT_CAPACITY: usize = 20;

/// Answers slower than this many seconds are recorded as timeouts.
pub const DEFAULT_TIMEOUT_SECS: f64 = 20.0;

/// Canonical persisted shape: `{"errors": [...], "timeouts": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordBlob {
    #[serde(default)]
    pub errors: Vec<Record>,
    #[serde(default)]
    pub timeouts: Vec<Record>,
}

/// What a single `record_result` call did to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordEffect {
    /// An error entry was (re)appended.
    pub error_recorded: bool,
    /// A timeout entry was (re)appended.
    pub timeout_recorded: bool,
    /// The answer was correct and the question was cleared from both collections.
    pub cleared: bool,
    /// Records pushed out by the capacity limit.
    pub evicted: usize,
}

/// The error and timeout collections.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordStore {
    errors: VecDeque<Record>,
    timeouts: VecDeque<Record>,
    capacity: usize,
    timeout_secs: f64,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    /// An empty store with the default capacity and timeout threshold.
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_CAPACITY, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_limits(capacity: usize, timeout_secs: f64) -> Self {
        Self {
            errors: VecDeque::with_capacity(capacity),
            timeouts: VecDeque::with_capacity(capacity),
            capacity,
            timeout_secs,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn timeout_secs(&self) -> f64 {
        self.timeout_secs
    }

    /// Error records, oldest first.
    pub fn errors(&self) -> impl ExactSizeIterator<Item = &Record> {
        self.errors.iter()
    }

    /// Timeout records, oldest first.
    pub fn timeouts(&self) -> impl ExactSizeIterator<Item = &Record> {
        self.timeouts.iter()
    }

    /// Size of the replay pool (errors followed by timeouts).
    pub fn len(&self) -> usize {
        self.errors.len() + self.timeouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.timeouts.is_empty()
    }

    pub fn contains(&self, kind: RecordKind, question: &str) -> bool {
        self.collection(kind).iter().any(|r| r.question == question)
    }

    /// Pick one record uniformly from the concatenated pool.
    ///
    /// A question present in both collections is twice as likely.
    pub fn choose_replay<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Record> {
        if self.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.len());
        if index < self.errors.len() {
            self.errors.get(index)
        } else {
            self.timeouts.get(index - self.errors.len())
        }
    }

    /// Update the store with the outcome of one answered question.
    ///
    /// Steps run in a fixed order: a wrong answer refreshes the error entry,
    /// a slow answer refreshes the timeout entry, and a correct answer then
    /// removes the question from both collections. A slow but correct answer
    /// therefore leaves no timeout behind.
    pub fn record_result(
        &mut self,
        question: &str,
        correct: &Answer,
        user_answer: &str,
        elapsed_secs: f64,
        is_correct: bool,
    ) -> RecordEffect {
        let mut effect = RecordEffect::default();

        if !is_correct {
            let record = Record::new(
                question,
                correct.clone(),
                user_answer,
                elapsed_secs,
                RecordKind::Error,
            );
            effect.evicted += self.append(RecordKind::Error, record);
            effect.error_recorded = true;
        }

        if elapsed_secs > self.timeout_secs {
            let record = Record::new(
                question,
                correct.clone(),
                user_answer,
                elapsed_secs,
                RecordKind::Timeout,
            );
            effect.evicted += self.append(RecordKind::Timeout, record);
            effect.timeout_recorded = true;
        }

        if is_correct {
            self.remove(question);
            effect.cleared = true;
        }

        tracing::debug!(
            question,
            is_correct,
            elapsed_secs,
            errors = self.errors.len(),
            timeouts = self.timeouts.len(),
            "recorded result"
        );
        effect
    }

    /// Append to one collection, replacing any entry for the same question.
    ///
    /// Returns how many records were evicted by the capacity limit.
    pub fn append(&mut self, kind: RecordKind, record: Record) -> usize {
        let capacity = self.capacity;
        let queue = self.collection_mut(kind);
        queue.retain(|r| r.question != record.question);
        queue.push_back(record);

        let mut evicted = 0;
        while queue.len() > capacity {
            queue.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// Remove a question from both collections. Returns `true` if anything was removed.
    pub fn remove(&mut self, question: &str) -> bool {
        let before = self.len();
        self.errors.retain(|r| r.question != question);
        self.timeouts.retain(|r| r.question != question);
        self.len() != before
    }

    pub fn clear(&mut self) {
        self.errors.clear();
        self.timeouts.clear();
    }

    pub fn to_blob(&self) -> RecordBlob {
        RecordBlob {
            errors: self.errors.iter().cloned().collect(),
            timeouts: self.timeouts.iter().cloned().collect(),
        }
    }

    /// Rebuild a store from a persisted value.
    ///
    /// Accepts the canonical two-collection object, or a flat list of records
    /// from the older single-queue format, which lands in `errors`. Entries
    /// go through [`append`](Self::append), so duplicates keep their latest
    /// occurrence and oversized collections keep their newest records.
    pub fn from_blob(blob: Value, capacity: usize, timeout_secs: f64) -> Result<Self, StoreError> {
        let parsed = match blob {
            Value::Array(_) => RecordBlob {
                errors: serde_json::from_value(blob)
                    .map_err(|e| StoreError::Malformed(e.to_string()))?,
                timeouts: Vec::new(),
            },
            Value::Object(_) => serde_json::from_value(blob)
                .map_err(|e| StoreError::Malformed(e.to_string()))?,
            other => {
                return Err(StoreError::Malformed(format!(
                    "expected an object or a list, found {other}"
                )))
            }
        };

        let mut store = Self::with_limits(capacity, timeout_secs);
        for record in parsed.errors {
            store.append(RecordKind::Error, record);
        }
        for record in parsed.timeouts {
            store.append(RecordKind::Timeout, record);
        }
        Ok(store)
    }

    /// Load with default limits. See [`load_with_limits`](Self::load_with_limits).
    pub fn load(blobs: &dyn BlobStore) -> Self {
        Self::load_with_limits(blobs, DEFAULT_CAPACITY, DEFAULT_TIMEOUT_SECS)
    }

    /// Load from the blob store, falling back to an empty store.
    ///
    /// A missing blob is normal on first run. A corrupt or unreadable blob is
    /// logged and discarded; it never fails the session.
    pub fn load_with_limits(blobs: &dyn BlobStore, capacity: usize, timeout_secs: f64) -> Self {
        let blob = match blobs.load_blob() {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                tracing::debug!(source = %blobs.describe(), "no saved records, starting empty");
                return Self::with_limits(capacity, timeout_secs);
            }
            Err(e) => {
                tracing::warn!(source = %blobs.describe(), "ignoring saved records: {e}");
                return Self::with_limits(capacity, timeout_secs);
            }
        };

        match Self::from_blob(blob, capacity, timeout_secs) {
            Ok(store) => {
                tracing::info!(
                    source = %blobs.describe(),
                    errors = store.errors.len(),
                    timeouts = store.timeouts.len(),
                    "loaded saved records"
                );
                store
            }
            Err(e) => {
                tracing::warn!(source = %blobs.describe(), "ignoring saved records: {e}");
                Self::with_limits(capacity, timeout_secs)
            }
        }
    }

    /// Persist both collections in the canonical shape.
    pub fn save(&self, blobs: &dyn BlobStore) -> Result<(), StoreError> {
        let value = serde_json::to_value(self.to_blob())
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        blobs.save_blob(&value)?;
        tracing::info!(
            target_store = %blobs.describe(),
            errors = self.errors.len(),
            timeouts = self.timeouts.len(),
            "saved records"
        );
        Ok(())
    }

    fn collection(&self, kind: RecordKind) -> &VecDeque<Record> {
        match kind {
            RecordKind::Error => &self.errors,
            RecordKind::Timeout => &self.timeouts,
        }
    }

    fn collection_mut(&mut self, kind: RecordKind) -> &mut VecDeque<Record> {
        match kind {
            RecordKind::Error => &mut self.errors,
            RecordKind::Timeout => &mut self.timeouts,
        }
    }
}
