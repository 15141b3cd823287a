//! Evaluation report types with JSON persistence and run comparison.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::evaluator::AdmissionOutcome;
use crate::model::Subject;
use crate::scoring::SubjectTally;
use crate::statistics::StandardizedScores;

/// Everything the engine produced for one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateReport {
    pub candidate: String,
    /// Correct/total per subject.
    pub tallies: BTreeMap<Subject, SubjectTally>,
    pub scores: StandardizedScores,
    pub outcome: AdmissionOutcome,
}

impl CandidateReport {
    /// Score for one program, searching all three partitions.
    pub fn program_score(&self, program: &str) -> Option<f64> {
        self.outcome
            .admitted
            .iter()
            .chain(&self.outcome.rejected)
            .chain(&self.outcome.unavailable)
            .find(|v| v.program == program)
            .map(|v| v.score)
    }
}

/// A complete evaluation run over one or more candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Exam edition the reference data belongs to.
    pub edition: String,
    /// Essay score applied to every candidate.
    pub essay_score: f64,
    pub candidates: Vec<CandidateReport>,
}

impl EvaluationReport {
    pub fn new(edition: &str, essay_score: f64, candidates: Vec<CandidateReport>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            edition: edition.to_string(),
            essay_score,
            candidates,
        }
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
        let report: EvaluationReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this report against a baseline. A (candidate, program) score
    /// that moved by more than `threshold` points is recorded as a shift.
    pub fn compare(&self, baseline: &EvaluationReport, threshold: f64) -> ComparisonReport {
        let score_map = |report: &EvaluationReport| -> HashMap<(String, String), f64> {
            let mut map = HashMap::new();
            for candidate in &report.candidates {
                for verdict in candidate
                    .outcome
                    .admitted
                    .iter()
                    .chain(&candidate.outcome.rejected)
                    .chain(&candidate.outcome.unavailable)
                {
                    map.insert(
                        (candidate.candidate.clone(), verdict.program.clone()),
                        verdict.score,
                    );
                }
            }
            map
        };

        let baseline_scores = score_map(baseline);
        let current_scores = score_map(self);

        let mut regressions = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;
        let mut new_entries = 0usize;

        for (key, &current) in &current_scores {
            if let Some(&base) = baseline_scores.get(key) {
                let delta = current - base;
                if delta < -threshold {
                    regressions.push(ScoreShift {
                        candidate: key.0.clone(),
                        program: key.1.clone(),
                        baseline_score: base,
                        current_score: current,
                        delta,
                    });
                } else if delta > threshold {
                    improvements.push(ScoreShift {
                        candidate: key.0.clone(),
                        program: key.1.clone(),
                        baseline_score: base,
                        current_score: current,
                        delta,
                    });
                } else {
                    unchanged += 1;
                }
            } else {
                new_entries += 1;
            }
        }

        let removed_entries = baseline_scores
            .keys()
            .filter(|k| !current_scores.contains_key(k))
            .count();

        regressions.sort_by(|a, b| {
            a.delta
                .partial_cmp(&b.delta)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        improvements.sort_by(|a, b| {
            b.delta
                .partial_cmp(&a.delta)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        ComparisonReport {
            regressions,
            improvements,
            unchanged,
            new_entries,
            removed_entries,
        }
    }
}

/// Result of comparing two evaluation reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// (candidate, program) pairs whose score went down.
    pub regressions: Vec<ScoreShift>,
    /// Pairs whose score went up.
    pub improvements: Vec<ScoreShift>,
    /// Pairs with no significant change.
    pub unchanged: usize,
    /// Pairs in current but not baseline.
    pub new_entries: usize,
    /// Pairs in baseline but not current.
    pub removed_entries: usize,
}

/// One admission-score shift between two runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreShift {
    pub candidate: String,
    pub program: String,
    pub baseline_score: f64,
    pub current_score: f64,
    pub delta: f64,
}

impl ComparisonReport {
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }

    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} regressions, {} improvements, {} unchanged\n\n",
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged
        ));

        let table = |md: &mut String, title: &str, shifts: &[ScoreShift]| {
            if shifts.is_empty() {
                return;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Candidate | Program | Baseline | Current | Delta |\n");
            md.push_str("|-----------|---------|----------|---------|-------|\n");
            for s in shifts {
                md.push_str(&format!(
                    "| {} | {} | {:.2} | {:.2} | {:+.2} |\n",
                    s.candidate, s.program, s.baseline_score, s.current_score, s.delta
                ));
            }
            md.push('\n');
        };

        table(&mut md, "Regressions", &self.regressions);
        table(&mut md, "Improvements", &self.improvements);

        md
    }
}
