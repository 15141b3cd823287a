//! The `vestibench compare` command.

use std::path::PathBuf;

use anyhow::Result;

use vestibench_core::report::EvaluationReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    let baseline = EvaluationReport::load_json(&baseline_path)?;
    let current = EvaluationReport::load_json(&current_path)?;

    let comparison = current.compare(&baseline, threshold);

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&comparison)?),
        "markdown" => println!("{}", comparison.to_markdown()),
        _ => {
            println!(
                "{} regressions, {} improvements, {} unchanged ({} new, {} removed)",
                comparison.regressions.len(),
                comparison.improvements.len(),
                comparison.unchanged,
                comparison.new_entries,
                comparison.removed_entries,
            );
            for shift in &comparison.regressions {
                println!(
                    "  REGRESSION  {} :: {} {:.2} -> {:.2} ({:+.2})",
                    shift.candidate,
                    shift.program,
                    shift.baseline_score,
                    shift.current_score,
                    shift.delta,
                );
            }
            for shift in &comparison.improvements {
                println!(
                    "  IMPROVEMENT {} :: {} {:.2} -> {:.2} ({:+.2})",
                    shift.candidate,
                    shift.program,
                    shift.baseline_score,
                    shift.current_score,
                    shift.delta,
                );
            }
        }
    }

    if fail_on_regression && comparison.has_regressions() {
        anyhow::bail!("{} regression(s) found", comparison.regressions.len());
    }

    Ok(())
}
