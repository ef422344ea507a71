//! Session orchestration: fixed-size batches of questions.
//!
//! The runner owns the record store for the whole session. Each answer
//! updates the store immediately; the store is saved after every batch and
//! whenever input ends early.

use std::time::Instant;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::generator::{QuestionGenerator, UsedPrompts};
use crate::model::{Question, QuestionResult};
use crate::persistence::BlobStore;
use crate::statistics::BatchStats;
use crate::store::RecordStore;
use crate::validator::AnswerValidator;

/// Questions per batch.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Supplies user answers. Blocking; there is no deadline on a reply.
pub trait AnswerSource {
    /// Ask `prompt` and wait for the reply. `Ok(None)` means input has ended.
    fn read_answer(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Asked after each completed batch; `false` ends the session.
    fn keep_going(&mut self, report: &BatchReport) -> Result<bool>;
}

/// Progress callbacks for a running session.
pub trait ProgressReporter {
    fn on_question(&self, batch: u32, number: usize, question: &Question);
    fn on_answer(&self, result: &QuestionResult);
    fn on_batch_complete(&self, report: &BatchReport);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_question(&self, _: u32, _: usize, _: &Question) {}
    fn on_answer(&self, _: &QuestionResult) {}
    fn on_batch_complete(&self, _: &BatchReport) {}
}

/// Everything that happened in one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// 1-based batch number within the session.
    pub batch: u32,
    pub results: Vec<QuestionResult>,
    pub stats: BatchStats,
    /// Whether the record store was persisted after this batch.
    pub saved: bool,
    /// Input ended before the batch was complete.
    pub interrupted: bool,
}

/// Drives batches of questions against one record store.
pub struct SessionRunner {
    generator: QuestionGenerator,
    validator: AnswerValidator,
    store: RecordStore,
    blobs: Box<dyn BlobStore>,
    batch_size: usize,
    rng: StdRng,
    batches_run: u32,
}

impl SessionRunner {
    /// Create a runner. The validator's entry mode follows the quiz variant.
    pub fn new(generator: QuestionGenerator, store: RecordStore, blobs: Box<dyn BlobStore>) -> Self {
        let validator = AnswerValidator::new().with_entry_mode(generator.source().entry_mode());
        Self {
            generator,
            validator,
            store,
            blobs,
            batch_size: DEFAULT_BATCH_SIZE,
            rng: StdRng::from_os_rng(),
            batches_run: 0,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Result<Self> {
        anyhow::ensure!(batch_size >= 1, "batch size must be at least 1");
        self.batch_size = batch_size;
        Ok(self)
    }

    pub fn with_round_level(mut self, round_level: u32) -> Self {
        self.validator = self.validator.with_round_level(round_level);
        self
    }

    /// Fix the random seed, for reproducible sessions.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn validator(&self) -> &AnswerValidator {
        &self.validator
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Warn when the fresh prompt space cannot fill a batch on its own.
    ///
    /// Generation never gives up on duplicates, so such a batch may never
    /// finish unless stored records supply the missing prompts.
    pub fn check_prompt_space(&self) -> bool {
        match self.generator.source().distinct_prompts() {
            Some(n) if n < self.batch_size as u64 => {
                tracing::warn!(
                    quiz = self.generator.source().name(),
                    distinct_prompts = n,
                    batch_size = self.batch_size,
                    "fewer distinct questions than the batch size; the batch may not finish"
                );
                false
            }
            _ => true,
        }
    }

    /// Run batches until input ends or the answer source declines to continue.
    pub fn run(
        &mut self,
        input: &mut dyn AnswerSource,
        reporter: &dyn ProgressReporter,
    ) -> Result<Vec<BatchReport>> {
        let mut reports = Vec::new();
        loop {
            let report = self.run_batch(input, reporter)?;
            let interrupted = report.interrupted;
            let keep_going = !interrupted && input.keep_going(&report)?;
            reports.push(report);
            if !keep_going {
                break;
            }
        }
        Ok(reports)
    }

    /// Ask one batch of unique questions, then persist the store.
    pub fn run_batch(
        &mut self,
        input: &mut dyn AnswerSource,
        reporter: &dyn ProgressReporter,
    ) -> Result<BatchReport> {
        self.batches_run += 1;
        let batch = self.batches_run;
        let mut used = UsedPrompts::new();
        let mut results = Vec::with_capacity(self.batch_size);
        let mut interrupted = false;

        for number in 1..=self.batch_size {
            let question = self
                .generator
                .next_question(&self.store, &mut used, &mut self.rng);
            reporter.on_question(batch, number, &question);

            let start = Instant::now();
            let reply = match input.read_answer(&question.prompt) {
                Ok(reply) => reply,
                Err(e) => {
                    self.persist();
                    return Err(e);
                }
            };
            let elapsed_secs = start.elapsed().as_secs_f64();

            let Some(raw) = reply else {
                tracing::info!(batch, answered = results.len(), "input ended mid-batch");
                interrupted = true;
                break;
            };

            let user = raw.trim().to_string();
            let is_correct = self.validator.validate(&user, &question.answer);
            self.store.record_result(
                &question.prompt,
                &question.answer,
                &user,
                elapsed_secs,
                is_correct,
            );

            let result = QuestionResult {
                number,
                question: question.prompt,
                correct: question.answer,
                user,
                elapsed_secs,
                is_correct,
                provenance: question.provenance,
            };
            reporter.on_answer(&result);
            results.push(result);
        }

        let saved = self.persist();
        let stats = BatchStats::compute(&results, self.store.timeout_secs());
        let report = BatchReport {
            batch,
            results,
            stats,
            saved,
            interrupted,
        };
        reporter.on_batch_complete(&report);
        Ok(report)
    }

    fn persist(&self) -> bool {
        match self.store.save(self.blobs.as_ref()) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(target_store = %self.blobs.describe(), "failed to save records: {e}");
                false
            }
        }
    }
}

impl std::fmt::Debug for SessionRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRunner")
            .field("generator", &self.generator)
            .field("validator", &self.validator)
            .field("batch_size", &self.batch_size)
            .field("batches_run", &self.batches_run)
            .finish()
    }
}
