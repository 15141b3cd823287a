//! The `vestibench extract` command.

use std::path::PathBuf;

use anyhow::Result;

use vestibench_core::model::ExamDay;
use vestibench_extract::{extract_questions, load_pages, save_questions};

pub fn execute(pages_path: PathBuf, output: PathBuf) -> Result<()> {
    let pages = load_pages(&pages_path)?;
    let questions = extract_questions(&pages);

    let day1 = questions.iter().filter(|q| q.day == ExamDay::First).count();
    let day2 = questions.len() - day1;
    println!(
        "Extracted {} questions ({day1} day 1, {day2} day 2) from {} pages",
        questions.len(),
        pages.len()
    );

    save_questions(&questions, &output)?;
    println!("Questions saved to: {}", output.display());

    Ok(())
}
