//! Admission evaluation: classify and rank a candidate's programs.
//!
//! For every program in the weight table, the evaluator computes the
//! admission score, resolves the cutoff through the program catalog, and
//! classifies the program as admitted, rejected, or cutoff-unavailable.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::aggregate::admission_score;
use crate::catalog::{CutoffResolution, ProgramCatalog};
use crate::model::{AnswerSet, WeightTable};
use crate::report::CandidateReport;
use crate::scoring::{count_correct, standardize_all, SubjectMap};
use crate::statistics::{ExamStatistics, StandardizedScores};

/// How a candidate fared against one program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Admitted,
    Rejected,
    CutoffUnavailable,
}

/// The admission verdict for one (candidate, program) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionVerdict {
    /// Short program name, as used in the weight table.
    pub program: String,
    /// Canonical program name from the cutoff table, when resolved.
    pub canonical: Option<String>,
    /// The candidate's admission score for this program.
    pub score: f64,
    /// The program's cutoff, when resolved.
    pub cutoff: Option<f64>,
    pub status: VerdictStatus,
    /// Score minus cutoff; positive for admitted, negative for rejected.
    pub margin: Option<f64>,
}

/// A candidate's verdicts, partitioned and ranked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdmissionOutcome {
    /// Admitted programs, best margin first.
    pub admitted: Vec<AdmissionVerdict>,
    /// Rejected programs, closest miss first.
    pub rejected: Vec<AdmissionVerdict>,
    /// Programs with no resolvable cutoff, in catalog order.
    pub unavailable: Vec<AdmissionVerdict>,
    /// admitted / (admitted + rejected); zero when nothing resolved.
    pub admission_rate: f64,
}

/// Classify every program in the weight table for one set of standardized
/// scores.
pub fn evaluate_programs(
    scores: &StandardizedScores,
    weight_table: &WeightTable,
    catalog: &ProgramCatalog,
) -> AdmissionOutcome {
    let mut outcome = AdmissionOutcome::default();

    for (program, weights) in &weight_table.programs {
        let score = admission_score(scores, weights);
        match catalog.resolve(program) {
            CutoffResolution::Resolved { canonical, cutoff } => {
                let margin = score - cutoff;
                let status = if score >= *cutoff {
                    VerdictStatus::Admitted
                } else {
                    VerdictStatus::Rejected
                };
                let verdict = AdmissionVerdict {
                    program: program.clone(),
                    canonical: Some(canonical.clone()),
                    score,
                    cutoff: Some(*cutoff),
                    status,
                    margin: Some(margin),
                };
                match status {
                    VerdictStatus::Admitted => outcome.admitted.push(verdict),
                    _ => outcome.rejected.push(verdict),
                }
            }
            CutoffResolution::Unavailable | CutoffResolution::Unmapped => {
                outcome.unavailable.push(AdmissionVerdict {
                    program: program.clone(),
                    canonical: None,
                    score,
                    cutoff: None,
                    status: VerdictStatus::CutoffUnavailable,
                    margin: None,
                });
            }
        }
    }

    outcome
        .admitted
        .sort_by(|a, b| cmp_f64(b.margin, a.margin));
    outcome.rejected.sort_by(|a, b| {
        cmp_f64(a.margin.map(f64::abs), b.margin.map(f64::abs))
    });

    let resolved = outcome.admitted.len() + outcome.rejected.len();
    outcome.admission_rate = if resolved == 0 {
        0.0
    } else {
        outcome.admitted.len() as f64 / resolved as f64
    };

    outcome
}

fn cmp_f64(a: Option<f64>, b: Option<f64>) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Run the full scoring pipeline for one candidate: tally, standardize,
/// aggregate per program, classify, rank.
pub fn evaluate_candidate(
    candidate: &str,
    answers: &AnswerSet,
    subject_map: &SubjectMap,
    statistics: &ExamStatistics,
    weight_table: &WeightTable,
    catalog: &ProgramCatalog,
    essay_score: f64,
) -> CandidateReport {
    let tallies = count_correct(answers, subject_map);
    let scores = standardize_all(&tallies, statistics, essay_score);
    let outcome = evaluate_programs(&scores, weight_table, catalog);
    CandidateReport {
        candidate: candidate.to_string(),
        tallies,
        scores,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AliasTable;
    use crate::model::{CutoffTable, ProgramWeights, Subject};

    fn scores() -> StandardizedScores {
        StandardizedScores {
            subjects: [(Subject::Mathematics, 600.0), (Subject::History, 550.0)]
                .into_iter()
                .collect(),
            essay: 500.0,
            language_combined: 500.0,
        }
    }

    fn weight_table(programs: &[(&str, &[(Subject, f64)])]) -> WeightTable {
        WeightTable {
            programs: programs
                .iter()
                .map(|(name, entries)| {
                    (
                        name.to_string(),
                        ProgramWeights {
                            weights: entries.iter().copied().collect(),
                        },
                    )
                })
                .collect(),
        }
    }

    fn catalog(entries: &[(&str, Option<f64>)]) -> ProgramCatalog {
        let aliases = AliasTable {
            entries: entries
                .iter()
                .map(|(name, cutoff)| {
                    (name.to_string(), cutoff.map(|_| name.to_string()))
                })
                .collect(),
        };
        let cutoffs = CutoffTable {
            cutoffs: entries
                .iter()
                .filter_map(|(name, cutoff)| cutoff.map(|c| (name.to_string(), c)))
                .collect(),
        };
        ProgramCatalog::build(
            entries.iter().map(|(name, _)| *name),
            &aliases,
            &cutoffs,
        )
        .unwrap()
    }

    #[test]
    fn partitions_and_ranking() {
        let table = weight_table(&[
            ("Alfa", &[(Subject::Mathematics, 1.0)]),   // 600
            ("Beta", &[(Subject::History, 1.0)]),       // 550
            ("Gama", &[(Subject::Portuguese, 1.0)]),    // 500
            ("Delta", &[(Subject::Mathematics, 1.0)]),  // 600, no cutoff
        ]);
        let catalog = catalog(&[
            ("Alfa", Some(580.0)),
            ("Beta", Some(540.0)),
            ("Gama", Some(640.0)),
            ("Delta", None),
        ]);

        let outcome = evaluate_programs(&scores(), &table, &catalog);

        // Admitted sorted by descending margin: Alfa (+20) before Beta (+10).
        let admitted: Vec<&str> = outcome.admitted.iter().map(|v| v.program.as_str()).collect();
        assert_eq!(admitted, ["Alfa", "Beta"]);
        assert!((outcome.admitted[0].margin.unwrap() - 20.0).abs() < 1e-9);

        let rejected: Vec<&str> = outcome.rejected.iter().map(|v| v.program.as_str()).collect();
        assert_eq!(rejected, ["Gama"]);
        assert_eq!(outcome.rejected[0].status, VerdictStatus::Rejected);

        let unavailable: Vec<&str> = outcome
            .unavailable
            .iter()
            .map(|v| v.program.as_str())
            .collect();
        assert_eq!(unavailable, ["Delta"]);
        assert_eq!(outcome.unavailable[0].cutoff, None);

        // 2 admitted / 3 resolved; unavailable entries do not count.
        assert!((outcome.admission_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn rejected_ranked_by_closest_miss() {
        let table = weight_table(&[
            ("Longe", &[(Subject::History, 1.0)]), // 550, cutoff 700
            ("Perto", &[(Subject::Mathematics, 1.0)]), // 600, cutoff 620
        ]);
        let catalog = catalog(&[("Longe", Some(700.0)), ("Perto", Some(620.0))]);

        let outcome = evaluate_programs(&scores(), &table, &catalog);
        let rejected: Vec<&str> = outcome.rejected.iter().map(|v| v.program.as_str()).collect();
        assert_eq!(rejected, ["Perto", "Longe"]);
        assert_eq!(outcome.admission_rate, 0.0);
    }

    #[test]
    fn unresolved_programs_never_count_toward_the_rate() {
        let table = weight_table(&[("Solto", &[(Subject::Mathematics, 1.0)])]);
        let catalog = catalog(&[("Solto", None)]);

        let outcome = evaluate_programs(&scores(), &table, &catalog);
        assert!(outcome.admitted.is_empty());
        assert!(outcome.rejected.is_empty());
        assert_eq!(outcome.unavailable.len(), 1);
        assert_eq!(outcome.admission_rate, 0.0);
    }

    #[test]
    fn admission_rate_ignores_unavailable() {
        // 3 admitted, 7 rejected, 5 unavailable => rate 0.3.
        let mut programs: Vec<(String, ProgramWeights)> = Vec::new();
        let mut entries: Vec<(String, Option<f64>)> = Vec::new();
        for i in 0..3 {
            programs.push((
                format!("adm{i}"),
                ProgramWeights {
                    weights: [(Subject::Mathematics, 1.0)].into_iter().collect(),
                },
            ));
            entries.push((format!("adm{i}"), Some(550.0)));
        }
        for i in 0..7 {
            programs.push((
                format!("rej{i}"),
                ProgramWeights {
                    weights: [(Subject::History, 1.0)].into_iter().collect(),
                },
            ));
            entries.push((format!("rej{i}"), Some(580.0)));
        }
        for i in 0..5 {
            programs.push((
                format!("sem{i}"),
                ProgramWeights {
                    weights: [(Subject::Mathematics, 1.0)].into_iter().collect(),
                },
            ));
            entries.push((format!("sem{i}"), None));
        }
        let table = WeightTable {
            programs: programs.into_iter().collect(),
        };
        let refs: Vec<(&str, Option<f64>)> = entries
            .iter()
            .map(|(name, cutoff)| (name.as_str(), *cutoff))
            .collect();
        let catalog = catalog(&refs);

        let outcome = evaluate_programs(&scores(), &table, &catalog);
        assert_eq!(outcome.admitted.len(), 3);
        assert_eq!(outcome.rejected.len(), 7);
        assert_eq!(outcome.unavailable.len(), 5);
        assert!((outcome.admission_rate - 0.3).abs() < 1e-9);
    }
}
