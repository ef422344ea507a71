//! Question generation: replay of stored records mixed with fresh questions.
//!
//! Each call flips a biased coin between replaying a stored record and asking
//! a fresh question from the quiz's [`QuestionSource`]. A prompt already used
//! in the current session is thrown away and the coin is flipped again, so a
//! duplicate replay may turn into a fresh question and vice versa.

use std::collections::HashSet;

use anyhow::Result;
use rand::{Rng, RngCore};

use crate::catalog::{Direction, FunctionTable, TableCatalog};
use crate::model::{Answer, Provenance, Question};
use crate::range_spec::OperandSpec;
use crate::store::RecordStore;
use crate::validator::EntryMode;

/// Replay probability for the table quiz.
pub const TABLE_REPLAY_PROBABILITY: f64 = 0.6;

/// Replay probability for the arithmetic quiz.
pub const ARITHMETIC_REPLAY_PROBABILITY: f64 = 0.5;

/// Prompts already asked in the current session.
pub type UsedPrompts = HashSet<String>;

/// Produces fresh questions for one quiz variant.
pub trait QuestionSource {
    /// Short name of the variant (e.g. "tables").
    fn name(&self) -> &str;

    /// Generate one fresh prompt and its expected answer.
    fn fresh(&self, rng: &mut dyn RngCore) -> (String, Answer);

    /// How many distinct prompts `fresh` can produce, when that is countable.
    fn distinct_prompts(&self) -> Option<u64>;

    /// How answers to this variant should be read.
    fn entry_mode(&self) -> EntryMode {
        EntryMode::Verbatim
    }

    /// Replay probability used when none is configured.
    fn default_replay_probability(&self) -> f64;
}

/// Function-table lookups in both directions.
#[derive(Debug, Clone)]
pub struct TableQuiz {
    tables: Vec<FunctionTable>,
}

impl TableQuiz {
    /// Build from a catalog. Tables without pairs are skipped.
    pub fn new(catalog: &TableCatalog) -> Result<Self> {
        let tables: Vec<FunctionTable> = catalog
            .tables()
            .iter()
            .filter(|t| !t.pairs().is_empty())
            .cloned()
            .collect();
        anyhow::ensure!(!tables.is_empty(), "table catalog has no usable tables");
        Ok(Self { tables })
    }
}

impl QuestionSource for TableQuiz {
    fn name(&self) -> &str {
        "tables"
    }

    fn fresh(&self, rng: &mut dyn RngCore) -> (String, Answer) {
        let table = &self.tables[rng.random_range(0..self.tables.len())];
        let pair = &table.pairs()[rng.random_range(0..table.pairs().len())];
        let direction = if rng.random_bool(0.5) {
            Direction::Forward
        } else {
            Direction::Inverse
        };
        table.ask(pair, direction)
    }

    fn distinct_prompts(&self) -> Option<u64> {
        Some(TableCatalog::new(self.tables.clone()).distinct_prompts() as u64)
    }

    fn default_replay_probability(&self) -> f64 {
        TABLE_REPLAY_PROBABILITY
    }
}

/// Products of two operands drawn from range specs.
#[derive(Debug, Clone)]
pub struct ArithmeticQuiz {
    left: OperandSpec,
    right: OperandSpec,
}

impl ArithmeticQuiz {
    pub fn new(left: OperandSpec, right: OperandSpec) -> Self {
        Self { left, right }
    }

    /// `n`-digit by `m`-digit multiplication.
    pub fn digits(n: u32, m: u32) -> Result<Self> {
        Ok(Self::new(OperandSpec::digits(n)?, OperandSpec::digits(m)?))
    }

    pub fn left(&self) -> &OperandSpec {
        &self.left
    }

    pub fn right(&self) -> &OperandSpec {
        &self.right
    }

    /// Render a product prompt.
    pub fn prompt(a: i32, b: i32) -> String {
        format!("{a} × {b} = ?")
    }
}

impl QuestionSource for ArithmeticQuiz {
    fn name(&self) -> &str {
        "arithmetic"
    }

    fn fresh(&self, rng: &mut dyn RngCore) -> (String, Answer) {
        let a = self.left.sample(rng);
        let b = self.right.sample(rng);
        (Self::prompt(a, b), Answer::Integer(i64::from(a) * i64::from(b)))
    }

    fn distinct_prompts(&self) -> Option<u64> {
        Some(
            self.left
                .distinct_values()
                .saturating_mul(self.right.distinct_values()),
        )
    }

    fn entry_mode(&self) -> EntryMode {
        EntryMode::Integer
    }

    fn default_replay_probability(&self) -> f64 {
        ARITHMETIC_REPLAY_PROBABILITY
    }
}

/// Chooses between replayed and fresh questions.
pub struct QuestionGenerator {
    source: Box<dyn QuestionSource>,
    replay_probability: f64,
}

impl QuestionGenerator {
    /// Use the source's default replay probability.
    pub fn new(source: Box<dyn QuestionSource>) -> Self {
        let replay_probability = source.default_replay_probability();
        Self {
            source,
            replay_probability,
        }
    }

    pub fn with_replay_probability(mut self, probability: f64) -> Result<Self> {
        anyhow::ensure!(
            (0.0..=1.0).contains(&probability),
            "replay probability must be between 0.0 and 1.0, got {probability}"
        );
        self.replay_probability = probability;
        Ok(self)
    }

    pub fn source(&self) -> &dyn QuestionSource {
        self.source.as_ref()
    }

    pub fn replay_probability(&self) -> f64 {
        self.replay_probability
    }

    /// Produce a question whose prompt is not in `used`, and mark it used.
    ///
    /// The retry loop has no cap. It ends as soon as either branch produces
    /// an unused prompt; if every reachable prompt is already used it never
    /// ends, so callers keep sessions smaller than the prompt space.
    pub fn next_question(
        &self,
        store: &RecordStore,
        used: &mut UsedPrompts,
        rng: &mut dyn RngCore,
    ) -> Question {
        let mut attempts = 0u64;
        loop {
            attempts += 1;
            let question = self.draw(store, rng);
            if used.insert(question.prompt.clone()) {
                tracing::debug!(
                    prompt = %question.prompt,
                    provenance = %question.provenance,
                    attempts,
                    "generated question"
                );
                return question;
            }
            tracing::trace!(prompt = %question.prompt, "prompt already used, redrawing");
        }
    }

    /// One draw from either branch, without the uniqueness check.
    pub fn draw(&self, store: &RecordStore, rng: &mut dyn RngCore) -> Question {
        if !store.is_empty() && rng.random_bool(self.replay_probability) {
            if let Some(record) = store.choose_replay(rng) {
                return Question {
                    prompt: record.question.clone(),
                    answer: record.correct.clone(),
                    provenance: record.provenance(),
                };
            }
        }

        let (prompt, answer) = self.source.fresh(rng);
        Question {
            prompt,
            answer,
            provenance: Provenance::New,
        }
    }
}

impl std::fmt::Debug for QuestionGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestionGenerator")
            .field("source", &self.source.name())
            .field("replay_probability", &self.replay_probability)
            .finish()
    }
}
