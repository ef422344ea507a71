//! Summary statistics for answered batches.

use serde::{Deserialize, Serialize};

use crate::model::QuestionResult;

/// Aggregate numbers for one batch, or several batches combined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    /// Questions answered.
    pub total: usize,
    /// Questions answered correctly.
    pub correct: usize,
    /// `correct / total`, 0.0 for an empty batch.
    pub accuracy: f64,
    /// Mean seconds per answer.
    pub mean_elapsed_secs: f64,
    /// Slowest answer in seconds.
    pub slowest_secs: f64,
    /// Answers over the timeout threshold.
    pub slow: usize,
    /// Questions replayed from stored records.
    pub replayed: usize,
    /// Replayed questions answered correctly.
    pub replayed_correct: usize,
}

impl BatchStats {
    pub fn compute(results: &[QuestionResult], timeout_secs: f64) -> Self {
        let total = results.len();
        let correct = results.iter().filter(|r| r.is_correct).count();
        let elapsed_sum: f64 = results.iter().map(|r| r.elapsed_secs).sum();
        let slowest_secs = results
            .iter()
            .map(|r| r.elapsed_secs)
            .fold(0.0f64, f64::max);
        let slow = results
            .iter()
            .filter(|r| r.elapsed_secs > timeout_secs)
            .count();
        let replayed = results.iter().filter(|r| r.provenance.is_replay()).count();
        let replayed_correct = results
            .iter()
            .filter(|r| r.provenance.is_replay() && r.is_correct)
            .count();

        Self {
            total,
            correct,
            accuracy: ratio(correct, total),
            mean_elapsed_secs: if total == 0 {
                0.0
            } else {
                elapsed_sum / total as f64
            },
            slowest_secs,
            slow,
            replayed,
            replayed_correct,
        }
    }

    /// Combine per-batch stats into a session total.
    pub fn combine(batches: &[BatchStats]) -> Self {
        let total: usize = batches.iter().map(|b| b.total).sum();
        let correct: usize = batches.iter().map(|b| b.correct).sum();
        let elapsed_sum: f64 = batches
            .iter()
            .map(|b| b.mean_elapsed_secs * b.total as f64)
            .sum();

        Self {
            total,
            correct,
            accuracy: ratio(correct, total),
            mean_elapsed_secs: if total == 0 {
                0.0
            } else {
                elapsed_sum / total as f64
            },
            slowest_secs: batches.iter().map(|b| b.slowest_secs).fold(0.0, f64::max),
            slow: batches.iter().map(|b| b.slow).sum(),
            replayed: batches.iter().map(|b| b.replayed).sum(),
            replayed_correct: batches.iter().map(|b| b.replayed_correct).sum(),
        }
    }

    /// Fresh (non-replayed) questions answered.
    pub fn fresh(&self) -> usize {
        self.total - self.replayed
    }
}

fn ratio(n: usize, d: usize) -> f64 {
    if d == 0 {
        0.0
    } else {
        n as f64 / d as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Answer, Provenance};

    fn result(is_correct: bool, elapsed_secs: f64, provenance: Provenance) -> QuestionResult {
        QuestionResult {
            number: 1,
            question: "q".into(),
            correct: Answer::Integer(1),
            user: String::new(),
            elapsed_secs,
            is_correct,
            provenance,
        }
    }

    #[test]
    fn compute_basic_batch() {
        let results = vec![
            result(true, 2.0, Provenance::New),
            result(false, 4.0, Provenance::Error),
            result(true, 24.0, Provenance::Timeout),
            result(true, 2.0, Provenance::New),
        ];
        let stats = BatchStats::compute(&results, 20.0);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.correct, 3);
        assert!((stats.accuracy - 0.75).abs() < f64::EPSILON);
        assert!((stats.mean_elapsed_secs - 8.0).abs() < f64::EPSILON);
        assert_eq!(stats.slowest_secs, 24.0);
        assert_eq!(stats.slow, 1);
        assert_eq!(stats.replayed, 2);
        assert_eq!(stats.replayed_correct, 1);
        assert_eq!(stats.fresh(), 2);
    }

    #[test]
    fn empty_batch_is_all_zero() {
        assert_eq!(BatchStats::compute(&[], 20.0), BatchStats::default());
    }

    #[test]
    fn combine_weights_by_size() {
        let a = BatchStats::compute(&[result(true, 1.0, Provenance::New)], 20.0);
        let b = BatchStats::compute(
            &[
                result(false, 4.0, Provenance::New),
                result(false, 4.0, Provenance::Legacy),
            ],
            20.0,
        );
        let total = BatchStats::combine(&[a, b]);

        assert_eq!(total.total, 3);
        assert_eq!(total.correct, 1);
        assert!((total.mean_elapsed_secs - 3.0).abs() < 1e-9);
        assert_eq!(total.replayed, 1);
    }
}
