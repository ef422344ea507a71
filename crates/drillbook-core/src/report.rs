//! Session report types with JSON persistence.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::BatchReport;
use crate::statistics::BatchStats;

/// A complete practice session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// When the last batch finished.
    pub finished_at: DateTime<Utc>,
    /// Which quiz was run.
    pub quiz: QuizSummary,
    /// Every batch, in order.
    pub batches: Vec<BatchReport>,
    /// Statistics over all batches.
    pub summary: BatchStats,
    /// Records left in the store when the session ended.
    pub errors_remaining: usize,
    pub timeouts_remaining: usize,
}

/// Short description of the quiz variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummary {
    pub name: String,
    /// Operand specs or catalog source, for display.
    pub detail: String,
    pub replay_probability: f64,
}

impl SessionReport {
    pub fn new(started_at: DateTime<Utc>, quiz: QuizSummary, batches: Vec<BatchReport>) -> Self {
        let stats: Vec<BatchStats> = batches.iter().map(|b| b.stats.clone()).collect();
        Self {
            id: Uuid::new_v4(),
            started_at,
            finished_at: Utc::now(),
            quiz,
            summary: BatchStats::combine(&stats),
            batches,
            errors_remaining: 0,
            timeouts_remaining: 0,
        }
    }

    pub fn with_remaining(mut self, errors: usize, timeouts: usize) -> Self {
        self.errors_remaining = errors;
        self.timeouts_remaining = timeouts;
        self
    }

    /// File name used when saving into a report directory.
    pub fn file_name(&self) -> String {
        format!(
            "session-{}-{}.json",
            self.started_at.format("%Y%m%dT%H%M%S"),
            &self.id.simple().to_string()[..8]
        )
    }

    /// Save into `dir` under [`file_name`](Self::file_name), returning the path.
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        self.save_json(&path)?;
        Ok(path)
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: SessionReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Answer, Provenance, QuestionResult};

    fn result(number: usize, is_correct: bool, provenance: Provenance) -> QuestionResult {
        QuestionResult {
            number,
            question: format!("R2({}) = ?", number + 1),
            correct: Answer::Float(1.41),
            user: if is_correct { "1.41" } else { "2" }.to_string(),
            elapsed_secs: 2.5,
            is_correct,
            provenance,
        }
    }

    fn batch(n: u32, results: Vec<QuestionResult>) -> BatchReport {
        BatchReport {
            batch: n,
            stats: BatchStats::compute(&results, 20.0),
            results,
            saved: true,
            interrupted: false,
        }
    }

    fn sample_report() -> SessionReport {
        SessionReport::new(
            Utc::now(),
            QuizSummary {
                name: "tables".into(),
                detail: "built-in".into(),
                replay_probability: 0.6,
            },
            vec![
                batch(1, vec![result(1, true, Provenance::New), result(2, false, Provenance::New)]),
                batch(2, vec![result(1, true, Provenance::Error)]),
            ],
        )
        .with_remaining(1, 0)
    }

    #[test]
    fn summary_combines_batches() {
        let report = sample_report();
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.correct, 2);
        assert_eq!(report.summary.replayed, 1);
        assert_eq!(report.errors_remaining, 1);
    }

    #[test]
    fn json_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let report = sample_report();
        let path = report.save_in(dir.path()).unwrap();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("session-"));

        let loaded = SessionReport::load_json(&path).unwrap();
        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.batches, report.batches);
        assert_eq!(loaded.summary, report.summary);
    }

    #[test]
    fn load_missing_report_names_the_path() {
        let err = SessionReport::load_json(Path::new("/nonexistent/report.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/report.json"));
    }
}
