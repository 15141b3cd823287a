//! Standardized score computation.
//!
//! The exam reports a subject's result as a standardized score centered at
//! 500 with scale 100 per standard deviation:
//!
//! `EP = ((raw - mean) / std_dev) * 100 + 500`
//!
//! Published per-subject score tables take precedence over the formula when
//! they carry an entry for the exact correctness count.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Subject, NEUTRAL_SCORE};

/// Reference mean for the essay score (0–10 raw scale).
pub const ESSAY_MEAN: f64 = 6.0;

/// Reference standard deviation for the essay score.
pub const ESSAY_STD_DEV: f64 = 2.0;

/// The linear standardization. A degenerate distribution (`std_dev == 0`)
/// collapses to the scale mean instead of dividing by zero.
pub fn standardized_score(raw: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev == 0.0 {
        return NEUTRAL_SCORE;
    }
    ((raw - mean) / std_dev) * 100.0 + 500.0
}

/// Standardize an essay score against its fixed reference statistics.
pub fn essay_standardized(essay_score: f64) -> f64 {
    standardized_score(essay_score, ESSAY_MEAN, ESSAY_STD_DEV)
}

/// Reference statistics for one subject in one exam edition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectStats {
    pub mean: f64,
    pub std_dev: f64,
    /// Published correctness-count → standardized-score table. Exact
    /// historical values take precedence over the formula.
    #[serde(default)]
    pub score_table: BTreeMap<u32, f64>,
}

impl SubjectStats {
    pub fn new(mean: f64, std_dev: f64) -> Self {
        Self {
            mean,
            std_dev,
            score_table: BTreeMap::new(),
        }
    }

    /// Standardized score for a correctness count: table entry if present,
    /// formula otherwise.
    pub fn standardized(&self, correct: u32) -> f64 {
        if let Some(&score) = self.score_table.get(&correct) {
            return score;
        }
        standardized_score(f64::from(correct), self.mean, self.std_dev)
    }
}

/// Per-subject reference statistics for a whole exam edition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExamStatistics {
    pub subjects: BTreeMap<Subject, SubjectStats>,
}

impl ExamStatistics {
    pub fn get(&self, subject: Subject) -> Option<&SubjectStats> {
        self.subjects.get(&subject)
    }
}

/// A candidate's standardized scores, produced fresh per evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardizedScores {
    /// Standardized score per subject with at least one question.
    pub subjects: BTreeMap<Subject, f64>,
    /// Standardized essay score.
    pub essay: f64,
    /// Arithmetic mean of the Portuguese and essay standardized scores;
    /// equal to the essay score when Portuguese is absent. This is the value
    /// consumed under the Portuguese weight key.
    pub language_combined: f64,
}

impl StandardizedScores {
    /// The score a program weight on `subject` applies to. The Portuguese
    /// weight covers the combined language+essay score, never the raw
    /// Portuguese score.
    pub fn weight_score(&self, subject: Subject) -> Option<f64> {
        match subject {
            Subject::Portuguese => Some(self.language_combined),
            other => self.subjects.get(&other).copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formula_at_the_mean() {
        // 15 correct with mean 15 and std dev 5 sits exactly on the center.
        assert_eq!(standardized_score(15.0, 15.0, 5.0), 500.0);
    }

    #[test]
    fn degenerate_distribution_is_exactly_the_mean() {
        for raw in [0.0, 3.0, 30.0, 90.0] {
            assert_eq!(standardized_score(raw, 12.0, 0.0), 500.0);
        }
    }

    #[test]
    fn strictly_monotonic_in_raw_count() {
        let stats = SubjectStats::new(10.0, 3.5);
        let mut last = f64::NEG_INFINITY;
        for correct in 0..=30 {
            let score = stats.standardized(correct);
            assert!(score > last, "not monotonic at {correct}");
            last = score;
        }
    }

    #[test]
    fn score_table_takes_precedence() {
        let mut stats = SubjectStats::new(10.0, 5.0);
        stats.score_table.insert(20, 712.4);
        // Table hit is returned verbatim, not the formula's 700.
        assert_eq!(stats.standardized(20), 712.4);
        // Counts outside the table fall back to the formula.
        assert_eq!(stats.standardized(10), 500.0);
    }

    #[test]
    fn essay_reference_statistics() {
        assert!((essay_standardized(9.98) - 699.0).abs() < 1e-9);
        assert_eq!(essay_standardized(6.0), 500.0);
    }

    #[test]
    fn portuguese_weight_maps_to_combined_score() {
        let mut subjects = BTreeMap::new();
        subjects.insert(Subject::Portuguese, 600.0);
        subjects.insert(Subject::Mathematics, 650.0);
        let scores = StandardizedScores {
            subjects,
            essay: 700.0,
            language_combined: 650.0,
        };
        assert_eq!(scores.weight_score(Subject::Portuguese), Some(650.0));
        assert_eq!(scores.weight_score(Subject::Mathematics), Some(650.0));
        assert_eq!(scores.weight_score(Subject::Biology), None);
    }
}
