//! The `vestibench validate` command.

use std::path::PathBuf;

use anyhow::Result;

use vestibench_core::catalog::{AliasTable, ProgramCatalog};
use vestibench_core::parser;
use vestibench_core::scoring::build_subject_map;

pub fn execute(
    exam_path: PathBuf,
    weights_path: PathBuf,
    cutoffs_path: PathBuf,
    aliases_path: Option<PathBuf>,
    edition: Option<String>,
) -> Result<()> {
    let exam = parser::load_exam_info(&exam_path, edition.as_deref())?;
    let weight_table = parser::load_weight_table(&weights_path)?;
    let cutoff_table = parser::load_cutoff_table(&cutoffs_path)?;
    let aliases = match &aliases_path {
        Some(path) => parser::load_alias_table(path)?,
        None => AliasTable::default_table(),
    };

    let subject_map = build_subject_map(&exam.structure)?;
    println!(
        "Exam edition {}: {} questions, {} subjects with statistics",
        exam.edition,
        subject_map.len(),
        exam.statistics.subjects.len()
    );
    println!(
        "{} programs, {} cutoff entries",
        weight_table.programs.len(),
        cutoff_table.cutoffs.len()
    );

    let catalog = ProgramCatalog::build(
        weight_table.programs.keys().map(String::as_str),
        &aliases,
        &cutoff_table,
    )?;

    let mut total_warnings = 0;
    for warning in parser::validate_reference(&exam, &weight_table) {
        let prefix = warning
            .context
            .as_ref()
            .map(|c| format!("  [{c}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", warning.message);
        total_warnings += 1;
    }
    for program in catalog.unresolved() {
        println!("  [{program}] WARNING: no resolvable cutoff");
        total_warnings += 1;
    }

    if total_warnings == 0 {
        println!("All reference data valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
