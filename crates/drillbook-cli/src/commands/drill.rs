//! Shared plumbing for the quiz commands: config resolution, console I/O,
//! and the batch summary.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use drillbook_core::config::{load_config_from, DrillConfig, Quiz};
use drillbook_core::generator::QuestionGenerator;
use drillbook_core::model::{Question, QuestionResult};
use drillbook_core::persistence::JsonFileBlobStore;
use drillbook_core::report::{QuizSummary, SessionReport};
use drillbook_core::session::{AnswerSource, BatchReport, ProgressReporter, SessionRunner};
use drillbook_core::statistics::BatchStats;
use drillbook_core::store::RecordStore;
use drillbook_core::validator::round_to;

use crate::SessionArgs;

/// Load the config file and layer the command-line flags over it.
///
/// `--notes` replaces the record file of `quiz` only.
pub fn resolve_config(args: &SessionArgs, quiz: Quiz) -> Result<DrillConfig> {
    let mut config = load_config_from(args.config.as_deref())?;
    if let Some(notes) = &args.notes {
        config.set_notes_path(quiz, notes.clone());
    }
    if let Some(level) = args.round_level {
        config.round_level = level;
    }
    if let Some(size) = args.batch_size {
        config.batch_size = size;
    }
    if let Some(dir) = &args.report_dir {
        config.report_dir = Some(dir.clone());
    }
    config.validate()?;
    Ok(config)
}

/// Run an interactive session on stdin/stdout.
pub fn run_session(
    generator: QuestionGenerator,
    detail: String,
    config: &DrillConfig,
    variant: Quiz,
    seed: Option<u64>,
) -> Result<()> {
    let notes_path = config.notes_path_for(variant);
    let blobs = JsonFileBlobStore::new(notes_path);
    let store = RecordStore::load_with_limits(&blobs, config.capacity, config.timeout_secs);
    if !store.is_empty() {
        println!(
            "Loaded {} error(s) and {} timeout(s) from {}",
            store.errors().len(),
            store.timeouts().len(),
            notes_path.display()
        );
    }

    let quiz = QuizSummary {
        name: generator.source().name().to_string(),
        detail,
        replay_probability: generator.replay_probability(),
    };

    let mut runner = SessionRunner::new(generator, store, Box::new(blobs))
        .with_batch_size(config.batch_size)?
        .with_round_level(config.round_level);
    if let Some(seed) = seed {
        runner = runner.with_seed(seed);
    }
    runner.check_prompt_space();

    let started_at = chrono::Utc::now();
    let stdin = std::io::stdin();
    let mut input = ConsoleInput::new(stdin.lock());
    let reports = runner.run(&mut input, &ConsoleReporter)?;

    if reports.len() > 1 {
        let stats: Vec<BatchStats> = reports.iter().map(|r| r.stats.clone()).collect();
        let total = BatchStats::combine(&stats);
        println!(
            "\nSession: {}/{} correct over {} batches ({:.0}%)",
            total.correct,
            total.total,
            reports.len(),
            total.accuracy * 100.0
        );
    }

    if let Some(dir) = &config.report_dir {
        let store = runner.store();
        let report = SessionReport::new(started_at, quiz, reports)
            .with_remaining(store.errors().len(), store.timeouts().len());
        let path = report
            .save_in(dir)
            .context("failed to write session report")?;
        eprintln!("Session report: {}", path.display());
    }

    Ok(())
}

/// Line-based answers from any buffered reader. End of input ends the session.
pub struct ConsoleInput<R> {
    reader: R,
}

impl<R: BufRead> ConsoleInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        print!("{prompt}");
        std::io::stdout().flush()?;
        let mut line = String::new();
        let n = self
            .reader
            .read_line(&mut line)
            .context("failed to read from stdin")?;
        if n == 0 {
            println!();
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

impl<R: BufRead> AnswerSource for ConsoleInput<R> {
    fn read_answer(&mut self, _prompt: &str) -> Result<Option<String>> {
        self.read_line("Answer: ")
    }

    fn keep_going(&mut self, _report: &BatchReport) -> Result<bool> {
        Ok(self
            .read_line("\nContinue? (Y/N): ")?
            .is_some_and(|reply| reply.trim().eq_ignore_ascii_case("y")))
    }
}

/// Console progress reporter.
pub struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_question(&self, _batch: u32, number: usize, question: &Question) {
        println!("\nQuestion {number}: {}", question.prompt);
    }

    fn on_answer(&self, _result: &QuestionResult) {}

    fn on_batch_complete(&self, report: &BatchReport) {
        print_batch(report);
        if !report.saved {
            eprintln!("Warning: records could not be saved; see the log above.");
        }
    }
}

fn print_batch(report: &BatchReport) {
    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Your answer", "Correct", "Time", "", "Source"]);

    for r in &report.results {
        table.add_row(vec![
            Cell::new(r.number),
            Cell::new(&r.question),
            Cell::new(&r.user),
            Cell::new(&r.correct),
            Cell::new(format!("{:.1}s", round_to(r.elapsed_secs, 1))),
            Cell::new(if r.is_correct { "✓" } else { "✗" }),
            Cell::new(r.provenance),
        ]);
    }

    let stats = &report.stats;
    println!("\nBatch {} results:\n{table}", report.batch);
    println!(
        "Accuracy: {}/{} ({:.0}%), mean {:.1}s, {} replayed, {} slow",
        stats.correct,
        stats.total,
        stats.accuracy * 100.0,
        stats.mean_elapsed_secs,
        stats.replayed,
        stats.slow
    );
}
