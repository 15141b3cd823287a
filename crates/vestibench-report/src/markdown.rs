//! Markdown report generator, for CI logs and pull-request summaries.

use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;

use vestibench_core::evaluator::AdmissionVerdict;
use vestibench_core::report::EvaluationReport;

/// Render an evaluation report as markdown.
pub fn generate_markdown(report: &EvaluationReport) -> String {
    let mut md = String::new();

    let _ = writeln!(md, "# vestibench report — {}", report.edition);
    let _ = writeln!(md);
    let _ = writeln!(
        md,
        "{} candidates | essay score {:.2} | {}",
        report.candidates.len(),
        report.essay_score,
        report.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(md);

    let _ = writeln!(md, "| Candidate | Admitted | Rejected | No cutoff | Rate |");
    let _ = writeln!(md, "|-----------|----------|----------|-----------|------|");
    for candidate in &report.candidates {
        let outcome = &candidate.outcome;
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} | {:.1}% |",
            candidate.candidate,
            outcome.admitted.len(),
            outcome.rejected.len(),
            outcome.unavailable.len(),
            outcome.admission_rate * 100.0
        );
    }
    let _ = writeln!(md);

    for candidate in &report.candidates {
        let _ = writeln!(md, "## {}", candidate.candidate);
        let _ = writeln!(md);

        let _ = writeln!(md, "| Subject | Correct | Standardized |");
        let _ = writeln!(md, "|---------|---------|--------------|");
        for (subject, tally) in &candidate.tallies {
            let score = candidate
                .scores
                .subjects
                .get(subject)
                .map(|s| format!("{s:.2}"))
                .unwrap_or_else(|| "—".to_string());
            let _ = writeln!(
                md,
                "| {} | {}/{} | {} |",
                subject, tally.correct, tally.total, score
            );
        }
        let _ = writeln!(md, "| essay | — | {:.2} |", candidate.scores.essay);
        let _ = writeln!(
            md,
            "| language + essay | — | {:.2} |",
            candidate.scores.language_combined
        );
        let _ = writeln!(md);

        partition(&mut md, "Admitted", &candidate.outcome.admitted);
        partition(&mut md, "Rejected", &candidate.outcome.rejected);
        partition(
            &mut md,
            "No cutoff available",
            &candidate.outcome.unavailable,
        );
    }

    md
}

fn partition(md: &mut String, title: &str, verdicts: &[AdmissionVerdict]) {
    if verdicts.is_empty() {
        return;
    }
    let _ = writeln!(md, "### {} ({})", title, verdicts.len());
    let _ = writeln!(md);
    let _ = writeln!(md, "| Program | Score | Cutoff | Margin |");
    let _ = writeln!(md, "|---------|-------|--------|--------|");
    for verdict in verdicts {
        let cutoff = verdict
            .cutoff
            .map(|c| format!("{c:.2}"))
            .unwrap_or_else(|| "—".to_string());
        let margin = verdict
            .margin
            .map(|m| format!("{m:+.2}"))
            .unwrap_or_else(|| "—".to_string());
        let _ = writeln!(
            md,
            "| {} | {:.2} | {} | {} |",
            verdict.program, verdict.score, cutoff, margin
        );
    }
    let _ = writeln!(md);
}

/// Generate and write a markdown report to a file.
pub fn write_markdown_report(report: &EvaluationReport, path: &Path) -> Result<()> {
    let md = generate_markdown(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, md)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use vestibench_core::evaluator::{AdmissionOutcome, VerdictStatus};
    use vestibench_core::report::CandidateReport;
    use vestibench_core::statistics::StandardizedScores;

    fn make_report() -> EvaluationReport {
        let candidate = CandidateReport {
            candidate: "gemini".into(),
            tallies: BTreeMap::new(),
            scores: StandardizedScores {
                subjects: BTreeMap::new(),
                essay: 699.0,
                language_combined: 699.0,
            },
            outcome: AdmissionOutcome {
                admitted: vec![],
                rejected: vec![AdmissionVerdict {
                    program: "Direito (D)".into(),
                    canonical: Some("Ciências Jurídicas e Sociais – Direito (Integral)".into()),
                    score: 640.2,
                    cutoff: Some(700.9),
                    status: VerdictStatus::Rejected,
                    margin: Some(-60.7),
                }],
                unavailable: vec![],
                admission_rate: 0.0,
            },
        };
        EvaluationReport::new("provas_2024", 9.98, vec![candidate])
    }

    #[test]
    fn markdown_has_summary_and_partitions() {
        let md = generate_markdown(&make_report());
        assert!(md.contains("# vestibench report — provas_2024"));
        assert!(md.contains("| gemini | 0 | 1 | 0 | 0.0% |"));
        assert!(md.contains("### Rejected (1)"));
        assert!(md.contains("| Direito (D) | 640.20 | 700.90 | -60.70 |"));
    }

    #[test]
    fn writes_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        write_markdown_report(&make_report(), &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("gemini"));
    }
}
