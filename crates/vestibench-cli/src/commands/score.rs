//! The `vestibench score` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use vestibench_core::catalog::{AliasTable, ProgramCatalog};
use vestibench_core::evaluator::evaluate_candidate;
use vestibench_core::parser;
use vestibench_core::report::EvaluationReport;
use vestibench_core::scoring::build_subject_map;
use vestibench_report::{write_html_report, write_markdown_report};

#[allow(clippy::too_many_arguments)]
pub fn execute(
    exam_path: PathBuf,
    answers_path: PathBuf,
    weights_path: PathBuf,
    cutoffs_path: PathBuf,
    aliases_path: Option<PathBuf>,
    edition: Option<String>,
    essay_score: f64,
    candidate_filter: Option<String>,
    output: PathBuf,
    format: String,
) -> Result<()> {
    anyhow::ensure!(
        (0.0..=10.0).contains(&essay_score),
        "essay score must be between 0.0 and 10.0"
    );

    let exam = parser::load_exam_info(&exam_path, edition.as_deref())?;
    let mut answer_sets = parser::load_answer_sets(&answers_path)?;
    let weight_table = parser::load_weight_table(&weights_path)?;
    let cutoff_table = parser::load_cutoff_table(&cutoffs_path)?;
    let aliases = match &aliases_path {
        Some(path) => parser::load_alias_table(path)?,
        None => AliasTable::default_table(),
    };

    if let Some(only) = &candidate_filter {
        answer_sets.retain(|name, _| name == only);
        anyhow::ensure!(!answer_sets.is_empty(), "candidate '{only}' not found");
    }

    let subject_map = build_subject_map(&exam.structure)?;
    let catalog = ProgramCatalog::build(
        weight_table.programs.keys().map(String::as_str),
        &aliases,
        &cutoff_table,
    )?;

    let candidates = answer_sets
        .iter()
        .map(|(name, answers)| {
            evaluate_candidate(
                name,
                answers,
                &subject_map,
                &exam.statistics,
                &weight_table,
                &catalog,
                essay_score,
            )
        })
        .collect();

    let report = EvaluationReport::new(&exam.edition, essay_score, candidates);
    print_summary(&report);

    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html", "markdown"]
    } else {
        format.split(',').map(str::trim).collect()
    };

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("report-{timestamp}.json"));
                report.save_json(&path)?;
                println!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("report-{timestamp}.html"));
                write_html_report(&report, &path)?;
                println!("HTML report: {}", path.display());
            }
            "markdown" => {
                let path = output.join(format!("report-{timestamp}.md"));
                write_markdown_report(&report, &path)?;
                println!("Markdown report: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }

    Ok(())
}

fn print_summary(report: &EvaluationReport) {
    let mut table = Table::new();
    table.set_header(vec![
        "Candidate",
        "Admitted",
        "Rejected",
        "No cutoff",
        "Admission rate",
    ]);
    for candidate in &report.candidates {
        let outcome = &candidate.outcome;
        table.add_row(vec![
            Cell::new(&candidate.candidate),
            Cell::new(outcome.admitted.len()),
            Cell::new(outcome.rejected.len()),
            Cell::new(outcome.unavailable.len()),
            Cell::new(format!("{:.1}%", outcome.admission_rate * 100.0)),
        ]);
    }
    println!("{table}");

    for candidate in &report.candidates {
        println!("\n{}", candidate.candidate);
        for verdict in candidate.outcome.admitted.iter().take(10) {
            println!(
                "  ADMITTED  {:<35} score {:7.2} | cutoff {:7.2} | margin {:+.2}",
                verdict.program,
                verdict.score,
                verdict.cutoff.unwrap_or_default(),
                verdict.margin.unwrap_or_default(),
            );
        }
        for verdict in candidate.outcome.rejected.iter().take(10) {
            println!(
                "  REJECTED  {:<35} score {:7.2} | cutoff {:7.2} | short {:.2}",
                verdict.program,
                verdict.score,
                verdict.cutoff.unwrap_or_default(),
                verdict.margin.unwrap_or_default().abs(),
            );
        }
        for verdict in &candidate.outcome.unavailable {
            println!(
                "  NO CUTOFF {:<35} score {:7.2}",
                verdict.program, verdict.score
            );
        }
    }
}
