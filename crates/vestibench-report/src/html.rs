//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use anyhow::Result;
use std::path::Path;

use vestibench_core::evaluator::AdmissionVerdict;
use vestibench_core::report::{CandidateReport, EvaluationReport};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML report from an evaluation report.
pub fn generate_html(report: &EvaluationReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>vestibench report — {}</title>\n",
        html_escape(&report.edition)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>vestibench report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Edition: <strong>{}</strong> | {} candidates | essay score {:.2} | {}</p>\n",
        html_escape(&report.edition),
        report.candidates.len(),
        report.essay_score,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary dashboard
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str(
        "<thead><tr><th>Candidate</th><th>Admitted</th><th>Rejected</th>\
         <th>No cutoff</th><th>Admission rate</th></tr></thead>\n",
    );
    html.push_str("<tbody>\n");
    for candidate in &report.candidates {
        let outcome = &candidate.outcome;
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.1}%</td></tr>\n",
            html_escape(&candidate.candidate),
            outcome.admitted.len(),
            outcome.rejected.len(),
            outcome.unavailable.len(),
            outcome.admission_rate * 100.0,
        ));
    }
    html.push_str("</tbody></table>\n");

    if !report.candidates.is_empty() {
        html.push_str(&generate_rate_chart(&report.candidates));
    }

    html.push_str("</section>\n");

    // Per-candidate detail
    for candidate in &report.candidates {
        html.push_str(&generate_candidate_section(candidate));
    }

    html.push_str("<footer>\n");
    html.push_str(&format!("<p>Report ID: {}</p>\n", report.id));
    html.push_str("</footer>\n");
    html.push_str("</body>\n</html>\n");

    html
}

fn generate_candidate_section(candidate: &CandidateReport) -> String {
    let mut html = String::new();

    html.push_str("<section class=\"candidate\">\n");
    html.push_str(&format!(
        "<h2>{}</h2>\n",
        html_escape(&candidate.candidate)
    ));

    // Subject performance
    html.push_str("<h3>Subjects</h3>\n");
    html.push_str("<table class=\"subjects\">\n");
    html.push_str(
        "<thead><tr><th>Subject</th><th>Correct</th><th>%</th>\
         <th>Standardized</th></tr></thead>\n<tbody>\n",
    );
    for (subject, tally) in &candidate.tallies {
        let score = candidate
            .scores
            .subjects
            .get(subject)
            .map(|s| format!("{s:.2}"))
            .unwrap_or_else(|| "—".to_string());
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}/{}</td><td>{:.1}%</td><td>{}</td></tr>\n",
            subject,
            tally.correct,
            tally.total,
            tally.percentage(),
            score,
        ));
    }
    html.push_str(&format!(
        "<tr class=\"combined\"><td>essay</td><td>—</td><td>—</td><td>{:.2}</td></tr>\n",
        candidate.scores.essay
    ));
    html.push_str(&format!(
        "<tr class=\"combined\"><td>language + essay</td><td>—</td><td>—</td><td>{:.2}</td></tr>\n",
        candidate.scores.language_combined
    ));
    html.push_str("</tbody></table>\n");

    // Program partitions
    let partition = |html: &mut String, title: &str, verdicts: &[AdmissionVerdict]| {
        if verdicts.is_empty() {
            return;
        }
        html.push_str(&format!("<h3>{} ({})</h3>\n", title, verdicts.len()));
        html.push_str("<table class=\"programs\">\n");
        html.push_str(
            "<thead><tr><th>Program</th><th>Score</th><th>Cutoff</th>\
             <th>Margin</th></tr></thead>\n<tbody>\n",
        );
        for verdict in verdicts {
            let cutoff = verdict
                .cutoff
                .map(|c| format!("{c:.2}"))
                .unwrap_or_else(|| "—".to_string());
            let margin = verdict
                .margin
                .map(|m| format!("{m:+.2}"))
                .unwrap_or_else(|| "—".to_string());
            html.push_str(&format!(
                "<tr><td>{}</td><td>{:.2}</td><td>{}</td><td>{}</td></tr>\n",
                html_escape(&verdict.program),
                verdict.score,
                cutoff,
                margin,
            ));
        }
        html.push_str("</tbody></table>\n");
    };

    partition(&mut html, "Admitted", &candidate.outcome.admitted);
    partition(&mut html, "Rejected", &candidate.outcome.rejected);
    partition(&mut html, "No cutoff available", &candidate.outcome.unavailable);

    html.push_str("</section>\n");
    html
}

/// SVG bar chart of admission rates per candidate.
fn generate_rate_chart(candidates: &[CandidateReport]) -> String {
    let bar_height = 24;
    let gap = 8;
    let label_width = 180;
    let chart_width = 420;
    let height = candidates.len() * (bar_height + gap) + gap;

    let mut svg = format!(
        "<svg class=\"chart\" width=\"{}\" height=\"{}\" role=\"img\" \
         aria-label=\"Admission rate per candidate\">\n",
        label_width + chart_width + 60,
        height
    );

    for (i, candidate) in candidates.iter().enumerate() {
        let rate = candidate.outcome.admission_rate;
        let y = gap + i * (bar_height + gap);
        let width = (rate * chart_width as f64) as usize;
        svg.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" text-anchor=\"end\" class=\"label\">{}</text>\n",
            label_width - 8,
            y + bar_height / 2 + 5,
            html_escape(&candidate.candidate)
        ));
        svg.push_str(&format!(
            "<rect x=\"{label_width}\" y=\"{y}\" width=\"{width}\" height=\"{bar_height}\" \
             class=\"bar\"/>\n"
        ));
        svg.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" class=\"value\">{:.1}%</text>\n",
            label_width + width + 6,
            y + bar_height / 2 + 5,
            rate * 100.0
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Generate and write an HTML report to a file.
pub fn write_html_report(report: &EvaluationReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

const CSS: &str = r#"
body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; margin: 0 auto; max-width: 960px; padding: 2rem 1rem; color: #1a1a2e; }
header { border-bottom: 2px solid #e0e0e8; margin-bottom: 1.5rem; }
h1 { margin: 0 0 0.25rem; }
.meta { color: #666; margin-top: 0; }
section { margin-bottom: 2rem; }
table { border-collapse: collapse; width: 100%; margin: 0.5rem 0 1rem; }
th, td { text-align: left; padding: 0.4rem 0.6rem; border-bottom: 1px solid #e0e0e8; }
thead th { background: #f4f4f8; }
tr.combined td { font-style: italic; color: #444; }
.chart .bar { fill: #4c6ef5; }
.chart .label { font-size: 12px; fill: #1a1a2e; }
.chart .value { font-size: 12px; fill: #444; }
footer { border-top: 1px solid #e0e0e8; color: #888; font-size: 0.85rem; }
"#;
