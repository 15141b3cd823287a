//! vestibench-extract — Exam question extraction.
//!
//! Consumes ordered page text records (one per page of the exam booklet,
//! already extracted upstream) and segments them into numbered questions.
//! The booklet spans two days with overlapping question numbering, so the
//! pages are processed as a single fold carrying the current day: a
//! second-day marker on any page flips the accumulator, and every question
//! found after it belongs to day two.

use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use vestibench_core::model::{ExamDay, ExamQuestion};

/// Question numbers outside this range are page noise, not questions.
const MAX_QUESTION_NUMBER: u32 = 150;

/// Cleaned question text shorter than this is a fragment, not a question.
const MIN_QUESTION_LEN: usize = 15;

/// One page of the exam booklet, as extracted upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub page_number: u32,
    pub text: String,
    #[serde(default)]
    pub image_count: u32,
}

fn second_day_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)2\s*[ºo°ª]?\s*DIA").expect("valid regex"))
}

fn question_start() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{2,3})\.\s+").expect("valid regex"))
}

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

fn page_noise() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)Página\s+\d+|UFRGS\s+\d{4}").expect("valid regex"))
}

/// Collapse whitespace and strip page headers/footers from question text.
pub fn clean_question_text(text: &str) -> String {
    let text = page_noise().replace_all(text, "");
    whitespace().replace_all(&text, " ").trim().to_string()
}

/// Segment the questions found on one page of text.
fn questions_on_page(page: &PageRecord, day: ExamDay) -> Vec<ExamQuestion> {
    let text = &page.text;
    let starts: Vec<(u32, usize, usize)> = question_start()
        .captures_iter(text)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let number: u32 = captures.get(1)?.as_str().parse().ok()?;
            Some((number, whole.start(), whole.end()))
        })
        .collect();

    let mut questions = Vec::new();
    for (index, &(number, _, body_start)) in starts.iter().enumerate() {
        if number < 1 || number > MAX_QUESTION_NUMBER {
            continue;
        }
        let body_end = starts
            .get(index + 1)
            .map(|&(_, next_start, _)| next_start)
            .unwrap_or(text.len());
        let body = clean_question_text(&text[body_start..body_end]);
        if body.len() <= MIN_QUESTION_LEN {
            tracing::debug!(number, page = page.page_number, "skipping short fragment");
            continue;
        }
        questions.push(ExamQuestion {
            day,
            number,
            text: body,
            page: page.page_number,
            image_count: page.image_count,
        });
    }
    questions
}

/// Extract all questions from ordered page records.
///
/// The fold's accumulator is the current exam day: it starts on day one and
/// flips to day two at the first page carrying a second-day marker.
pub fn extract_questions(pages: &[PageRecord]) -> Vec<ExamQuestion> {
    let (_, questions) = pages.iter().fold(
        (ExamDay::First, Vec::new()),
        |(day, mut questions), page| {
            let day = if second_day_marker().is_match(&page.text) {
                ExamDay::Second
            } else {
                day
            };
            questions.extend(questions_on_page(page, day));
            (day, questions)
        },
    );
    questions
}

/// Load page records from a JSON file.
pub fn load_pages(path: &Path) -> Result<Vec<PageRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read pages: {}", path.display()))?;
    let pages: Vec<PageRecord> =
        serde_json::from_str(&content).context("malformed pages JSON")?;
    Ok(pages)
}

/// Save extracted questions to a JSON file.
pub fn save_questions(questions: &[ExamQuestion], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(questions).context("failed to serialize questions")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
        .with_context(|| format!("failed to write questions to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page_number: u32, text: &str) -> PageRecord {
        PageRecord {
            page_number,
            text: text.into(),
            image_count: 0,
        }
    }

    #[test]
    fn day_flips_at_the_marker_and_stays() {
        let pages = vec![
            page(
                1,
                "01. Assinale a alternativa correta sobre o romantismo brasileiro.",
            ),
            page(
                2,
                "2º DIA\n61. Calcule o valor da expressão considerando os logaritmos.",
            ),
            page(
                3,
                "62. Determine a concentração molar da solução descrita acima.",
            ),
        ];
        let questions = extract_questions(&pages);
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].day, ExamDay::First);
        assert_eq!(questions[1].day, ExamDay::Second);
        assert_eq!(questions[2].day, ExamDay::Second);
        assert_eq!(questions[1].id(), "day2_q061");
    }

    #[test]
    fn marker_variants_are_recognized() {
        for marker in ["2º DIA", "2o dia", "2 DIA", "2° Dia"] {
            assert!(second_day_marker().is_match(marker), "missed: {marker}");
        }
        assert!(!second_day_marker().is_match("1º DIA"));
    }

    #[test]
    fn splits_consecutive_questions_on_one_page() {
        let text = "01. Primeira questão sobre literatura brasileira do século dezenove.\n\
                    02. Segunda questão sobre a gramática da língua portuguesa moderna.";
        let questions = extract_questions(&[page(1, text)]);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].number, 1);
        assert!(questions[0].text.starts_with("Primeira questão"));
        assert!(!questions[0].text.contains("Segunda"));
        assert_eq!(questions[1].number, 2);
    }

    #[test]
    fn cleans_noise_and_collapses_whitespace() {
        let cleaned = clean_question_text(
            "Assinale   a alternativa\ncorreta. Página 12  UFRGS 2024",
        );
        assert_eq!(cleaned, "Assinale a alternativa correta.");
    }

    #[test]
    fn drops_fragments_and_noise_numbers() {
        let text = "03. Curta demais.\n999. Este número está fora do intervalo aceito para questões.";
        let questions = extract_questions(&[page(1, text)]);
        assert!(questions.is_empty());
    }

    #[test]
    fn carries_image_metadata() {
        let pages = vec![PageRecord {
            page_number: 7,
            text: "45. Observe a figura e assinale a alternativa correta sobre o gráfico.".into(),
            image_count: 2,
        }];
        let questions = extract_questions(&pages);
        assert_eq!(questions[0].page, 7);
        assert_eq!(questions[0].image_count, 2);
    }

    #[test]
    fn json_roundtrip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let pages_path = dir.path().join("pages.json");
        std::fs::write(
            &pages_path,
            r#"[{"page_number": 1, "text": "01. Uma questão qualquer com texto suficiente."}]"#,
        )
        .unwrap();

        let pages = load_pages(&pages_path).unwrap();
        let questions = extract_questions(&pages);
        assert_eq!(questions.len(), 1);

        let out_path = dir.path().join("questions.json");
        save_questions(&questions, &out_path).unwrap();
        let loaded = vestibench_core::parser::load_questions(&out_path).unwrap();
        assert_eq!(loaded[0].number, 1);
        assert_eq!(loaded[0].day, ExamDay::First);
    }
}
