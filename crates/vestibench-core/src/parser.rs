//! JSON record parsers.
//!
//! The external records keep the field names of the source system
//! (Portuguese keys like `estrutura_prova`, `iguais`, `desvio_padrao`);
//! intermediate wire structs own those names and are converted into the
//! core model here, with all load-time validation applied.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::{
    normalize_key, Alternative, AnswerKey, AnswerSet, CutoffTable, DayAnswers, ExamQuestion,
    ExamStructure, Mismatch, ProgramWeights, Section, Subject, WeightTable,
};
use crate::statistics::{ExamStatistics, SubjectStats};

/// Fully parsed exam reference data for one edition.
#[derive(Debug, Clone)]
pub struct Exam {
    pub edition: String,
    pub structure: ExamStructure,
    pub statistics: ExamStatistics,
}

// ---------------------------------------------------------------------------
// Exam info (structure + statistics)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct EditionRecord {
    #[serde(rename = "estrutura_prova")]
    structure: StructureRecord,
    #[serde(rename = "estatisticas", default)]
    statistics: BTreeMap<String, StatsRecord>,
}

#[derive(Debug, Deserialize)]
struct StructureRecord {
    #[serde(rename = "dia_1")]
    first_day: DayRecord,
    #[serde(rename = "dia_2")]
    second_day: DayRecord,
}

#[derive(Debug, Deserialize)]
struct DayRecord {
    #[serde(rename = "distribuicao")]
    sections: Vec<SectionRecord>,
}

#[derive(Debug, Deserialize)]
struct SectionRecord {
    #[serde(rename = "materia")]
    subject: String,
    #[serde(rename = "questoes")]
    questions: String,
}

#[derive(Debug, Deserialize)]
struct StatsRecord {
    #[serde(rename = "media")]
    mean: f64,
    #[serde(rename = "desvio_padrao")]
    std_dev: f64,
    #[serde(rename = "escores", default)]
    scores: Vec<ScoreRow>,
}

#[derive(Debug, Deserialize)]
struct ScoreRow {
    #[serde(rename = "acertos")]
    correct: u32,
    #[serde(rename = "ep")]
    standardized: f64,
}

/// Parse an exam info file (structure + statistics).
pub fn load_exam_info(path: &Path, edition: Option<&str>) -> Result<Exam> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read exam info: {}", path.display()))?;
    parse_exam_info_str(&content, edition)
        .with_context(|| format!("failed to parse exam info: {}", path.display()))
}

/// Parse an exam info JSON string (useful for testing).
pub fn parse_exam_info_str(content: &str, edition: Option<&str>) -> Result<Exam> {
    let editions: BTreeMap<String, EditionRecord> =
        serde_json::from_str(content).context("malformed exam info JSON")?;

    let available: Vec<String> = editions.keys().cloned().collect();
    let (name, record) = match edition {
        Some(requested) => {
            let record = editions.get(requested).ok_or(ConfigError::MissingEdition {
                requested: Some(requested.to_string()),
                available: available.clone(),
            })?;
            (requested.to_string(), record)
        }
        None => {
            if editions.len() != 1 {
                return Err(ConfigError::MissingEdition {
                    requested: None,
                    available,
                }
                .into());
            }
            let (name, record) = editions.iter().next().expect("one edition");
            (name.clone(), record)
        }
    };

    let structure = ExamStructure {
        first_day: parse_sections(&record.structure.first_day, "dia_1")?,
        second_day: parse_sections(&record.structure.second_day, "dia_2")?,
    };

    let statistics = parse_statistics(&record.statistics);

    Ok(Exam {
        edition: name,
        structure,
        statistics,
    })
}

fn parse_sections(day: &DayRecord, context: &str) -> Result<Vec<Section>, ConfigError> {
    day.sections
        .iter()
        .map(|record| {
            let subject =
                Subject::from_str(&record.subject).map_err(|_| ConfigError::UnknownSubject {
                    name: record.subject.clone(),
                    context: context.to_string(),
                })?;
            Section::from_range(subject, &record.questions)
        })
        .collect()
}

fn parse_statistics(records: &BTreeMap<String, StatsRecord>) -> ExamStatistics {
    let mut statistics = ExamStatistics::default();
    for (raw, record) in records {
        let Ok(subject) = Subject::from_str(raw) else {
            tracing::debug!(key = %raw, "skipping statistics entry with no subject");
            continue;
        };
        // Both foreign tracks may carry statistics; the English track is the
        // merged subject's reference.
        if subject == Subject::ForeignLanguage
            && statistics.subjects.contains_key(&subject)
            && !normalize_key(raw).starts_with("ingl")
        {
            tracing::debug!(key = %raw, "skipping non-reference foreign language track");
            continue;
        }
        let mut stats = SubjectStats::new(record.mean, record.std_dev);
        for row in &record.scores {
            stats.score_table.insert(row.correct, row.standardized);
        }
        statistics.subjects.insert(subject, stats);
    }
    statistics
}

// ---------------------------------------------------------------------------
// Candidate answer sets
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CandidateRecord {
    #[serde(rename = "PRIMEIRA_PROVA", default)]
    first_day: DayAnswersRecord,
    #[serde(rename = "SEGUNDA_PROVA", default)]
    second_day: DayAnswersRecord,
}

#[derive(Debug, Default, Deserialize)]
struct DayAnswersRecord {
    #[serde(rename = "iguais", default)]
    matches: Vec<IntLike>,
    #[serde(rename = "diferentes", default)]
    mismatches: MismatchesRecord,
}

/// Question numbers appear as integers or strings depending on the producer.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IntLike {
    Int(u32),
    Text(String),
}

impl IntLike {
    fn value(&self) -> Result<u32> {
        match self {
            IntLike::Int(n) => Ok(*n),
            IntLike::Text(s) => s
                .trim()
                .parse()
                .with_context(|| format!("not a question number: '{s}'")),
        }
    }
}

/// `diferentes` is either a map with the chosen/expected letters (detail
/// may be `null`) or a bare list of question numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MismatchesRecord {
    Detailed(BTreeMap<String, Option<Mismatch>>),
    Bare(Vec<IntLike>),
}

impl Default for MismatchesRecord {
    fn default() -> Self {
        MismatchesRecord::Bare(Vec::new())
    }
}

/// Parse a candidate answers file: candidate name → per-day answer sets.
pub fn load_answer_sets(path: &Path) -> Result<BTreeMap<String, AnswerSet>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answer sets: {}", path.display()))?;
    parse_answer_sets_str(&content)
        .with_context(|| format!("failed to parse answer sets: {}", path.display()))
}

/// Parse a candidate answers JSON string.
pub fn parse_answer_sets_str(content: &str) -> Result<BTreeMap<String, AnswerSet>> {
    let records: BTreeMap<String, CandidateRecord> =
        serde_json::from_str(content).context("malformed answer set JSON")?;

    let mut sets = BTreeMap::new();
    for (candidate, record) in records {
        let answers = AnswerSet {
            first_day: parse_day_answers(&record.first_day)?,
            second_day: parse_day_answers(&record.second_day)?,
        };
        answers.first_day.validate(&candidate)?;
        answers.second_day.validate(&candidate)?;
        sets.insert(candidate, answers);
    }
    Ok(sets)
}

fn parse_day_answers(record: &DayAnswersRecord) -> Result<DayAnswers> {
    let mut day = DayAnswers::default();
    for entry in &record.matches {
        day.matches.insert(entry.value()?);
    }
    match &record.mismatches {
        MismatchesRecord::Detailed(map) => {
            for (question, mismatch) in map {
                let number: u32 = question
                    .trim()
                    .parse()
                    .with_context(|| format!("not a question number: '{question}'"))?;
                day.mismatches.insert(number, mismatch.clone());
            }
        }
        MismatchesRecord::Bare(list) => {
            for entry in list {
                day.mismatches.insert(entry.value()?, None);
            }
        }
    }
    Ok(day)
}

// ---------------------------------------------------------------------------
// Weight tables
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WeightFile {
    #[serde(rename = "pesos_provas_por_curso", default)]
    per_program: Option<BTreeMap<String, BTreeMap<String, f64>>>,
    #[serde(rename = "pesos_provas", default)]
    per_program_alt: Option<BTreeMap<String, BTreeMap<String, f64>>>,
}

/// Parse a program weight table file.
pub fn load_weight_table(path: &Path) -> Result<WeightTable> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read weight table: {}", path.display()))?;
    parse_weight_table_str(&content)
        .with_context(|| format!("failed to parse weight table: {}", path.display()))
}

/// Parse a weight table JSON string. The `total` key is metadata and is
/// stripped here; any other unknown key is a configuration error.
pub fn parse_weight_table_str(content: &str) -> Result<WeightTable> {
    let file: WeightFile = serde_json::from_str(content).context("malformed weight table JSON")?;
    let records = file
        .per_program
        .or(file.per_program_alt)
        .context("weight table has neither 'pesos_provas_por_curso' nor 'pesos_provas'")?;

    let mut table = WeightTable::default();
    for (program, entries) in records {
        let mut weights = ProgramWeights::default();
        for (key, weight) in entries {
            if normalize_key(&key) == "total" {
                continue;
            }
            let subject = Subject::from_str(&key).map_err(|_| ConfigError::UnknownWeightKey {
                program: program.clone(),
                key: key.clone(),
            })?;
            if weight < 0.0 {
                return Err(ConfigError::NegativeWeight {
                    program: program.clone(),
                    subject,
                    weight,
                }
                .into());
            }
            weights.weights.insert(subject, weight);
        }
        table.programs.insert(program, weights);
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// Cutoff tables
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CutoffFile {
    /// Keyed by an edition label, e.g. `notas_corte_2024`.
    Nested(BTreeMap<String, BTreeMap<String, f64>>),
    Flat(BTreeMap<String, f64>),
}

/// Parse a cutoff table file.
pub fn load_cutoff_table(path: &Path) -> Result<CutoffTable> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read cutoff table: {}", path.display()))?;
    parse_cutoff_table_str(&content)
        .with_context(|| format!("failed to parse cutoff table: {}", path.display()))
}

/// Parse a cutoff table JSON string.
pub fn parse_cutoff_table_str(content: &str) -> Result<CutoffTable> {
    let file: CutoffFile = serde_json::from_str(content).context("malformed cutoff table JSON")?;
    let cutoffs = match file {
        CutoffFile::Flat(map) => map,
        CutoffFile::Nested(mut editions) => {
            if editions.len() != 1 {
                return Err(ConfigError::MissingEdition {
                    requested: None,
                    available: editions.keys().cloned().collect(),
                }
                .into());
            }
            editions.pop_first().expect("one edition").1
        }
    };
    Ok(CutoffTable { cutoffs })
}

// ---------------------------------------------------------------------------
// Alias tables, answer keys, question lists
// ---------------------------------------------------------------------------

/// Parse an alias table file: short name → canonical fragment or `null`.
pub fn load_alias_table(path: &Path) -> Result<crate::catalog::AliasTable> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read alias table: {}", path.display()))?;
    let entries: BTreeMap<String, Option<String>> =
        serde_json::from_str(&content).context("malformed alias table JSON")?;
    Ok(crate::catalog::AliasTable { entries })
}

#[derive(Debug, Deserialize)]
struct AnswerKeyFile {
    #[serde(rename = "PRIMEIRA_PROVA", default)]
    first_day: BTreeMap<String, String>,
    #[serde(rename = "SEGUNDA_PROVA", default)]
    second_day: BTreeMap<String, String>,
}

/// Parse an official answer key file.
pub fn load_answer_key(path: &Path) -> Result<AnswerKey> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answer key: {}", path.display()))?;
    parse_answer_key_str(&content)
        .with_context(|| format!("failed to parse answer key: {}", path.display()))
}

/// Parse an answer key JSON string.
pub fn parse_answer_key_str(content: &str) -> Result<AnswerKey> {
    let file: AnswerKeyFile = serde_json::from_str(content).context("malformed answer key JSON")?;
    let parse_day = |entries: &BTreeMap<String, String>| -> Result<BTreeMap<u32, Alternative>> {
        entries
            .iter()
            .map(|(question, letter)| {
                let number: u32 = question
                    .trim()
                    .parse()
                    .with_context(|| format!("not a question number: '{question}'"))?;
                let alternative = Alternative::from_str(letter)
                    .map_err(|e| anyhow::anyhow!("question {number}: {e}"))?;
                Ok((number, alternative))
            })
            .collect()
    };
    Ok(AnswerKey {
        first_day: parse_day(&file.first_day)?,
        second_day: parse_day(&file.second_day)?,
    })
}

/// Load a question list produced by the extraction stage.
pub fn load_questions(path: &Path) -> Result<Vec<ExamQuestion>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read questions: {}", path.display()))?;
    let questions: Vec<ExamQuestion> =
        serde_json::from_str(&content).context("malformed questions JSON")?;
    Ok(questions)
}

// ---------------------------------------------------------------------------
// Reference-data validation
// ---------------------------------------------------------------------------

/// A warning from reference-data validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The program or subject this concerns, if applicable.
    pub context: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate loaded reference data for common gaps. Hard failures are caught
/// while loading; these are the conditions worth surfacing but survivable.
pub fn validate_reference(exam: &Exam, weights: &WeightTable) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let structure_subjects: std::collections::BTreeSet<Subject> = exam
        .structure
        .sections()
        .map(|section| section.subject)
        .collect();

    for subject in &structure_subjects {
        if exam.statistics.get(*subject).is_none() {
            warnings.push(ValidationWarning {
                context: Some(subject.to_string()),
                message: format!("subject {subject} has no reference statistics"),
            });
        }
    }

    for (program, program_weights) in &weights.programs {
        if program_weights.is_empty() {
            warnings.push(ValidationWarning {
                context: Some(program.clone()),
                message: "weight table is empty after removing the total key".into(),
            });
        }
        for subject in program_weights.weights.keys() {
            if *subject != Subject::Portuguese && !structure_subjects.contains(subject) {
                warnings.push(ValidationWarning {
                    context: Some(program.clone()),
                    message: format!("weighted subject {subject} has no questions in the exam"),
                });
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAM_JSON: &str = r#"
{
  "provas_2024": {
    "estrutura_prova": {
      "dia_1": {
        "distribuicao": [
          {"materia": "Língua Portuguesa", "questoes": "1-15"},
          {"materia": "Literatura", "questoes": "16-20"}
        ]
      },
      "dia_2": {
        "distribuicao": [
          {"materia": "Matemática", "questoes": "61-90"},
          {"materia": "Inglês", "questoes": "91-100"},
          {"materia": "Espanhol", "questoes": "91-100"}
        ]
      }
    },
    "estatisticas": {
      "portugues": {"media": 7.5, "desvio_padrao": 2.5},
      "matematica": {
        "media": 15.0,
        "desvio_padrao": 5.0,
        "escores": [{"acertos": 30, "ep": 812.7}]
      },
      "espanhol": {"media": 4.0, "desvio_padrao": 2.0},
      "ingles": {"media": 5.0, "desvio_padrao": 2.0}
    }
  }
}
"#;

    #[test]
    fn parse_exam_info() {
        let exam = parse_exam_info_str(EXAM_JSON, None).unwrap();
        assert_eq!(exam.edition, "provas_2024");
        assert_eq!(exam.structure.first_day.len(), 2);
        assert_eq!(exam.structure.second_day.len(), 3);
        assert_eq!(exam.structure.first_day[0].subject, Subject::Portuguese);

        // The English track is the merged foreign-language reference.
        let foreign = exam.statistics.get(Subject::ForeignLanguage).unwrap();
        assert_eq!(foreign.mean, 5.0);

        let math = exam.statistics.get(Subject::Mathematics).unwrap();
        assert_eq!(math.score_table.get(&30), Some(&812.7));
    }

    #[test]
    fn exam_info_edition_selection() {
        assert!(parse_exam_info_str(EXAM_JSON, Some("provas_2024")).is_ok());
        let err = parse_exam_info_str(EXAM_JSON, Some("provas_2023")).unwrap_err();
        assert!(err.to_string().contains("provas_2023"));
    }

    #[test]
    fn exam_info_rejects_unknown_subject() {
        let json = r#"
{
  "provas_2024": {
    "estrutura_prova": {
      "dia_1": {"distribuicao": [{"materia": "Alquimia", "questoes": "1-10"}]},
      "dia_2": {"distribuicao": []}
    },
    "estatisticas": {}
  }
}
"#;
        let err = parse_exam_info_str(json, None).unwrap_err();
        assert!(err.to_string().contains("Alquimia"));
    }

    #[test]
    fn parse_answer_sets_with_both_mismatch_forms() {
        let json = r#"
{
  "gpt": {
    "PRIMEIRA_PROVA": {
      "iguais": [1, 2, "3"],
      "diferentes": {"4": {"resposta_llm": "B", "resposta_correta": "C"}}
    },
    "SEGUNDA_PROVA": {
      "iguais": [61],
      "diferentes": [62, 63]
    }
  }
}
"#;
        let sets = parse_answer_sets_str(json).unwrap();
        let gpt = &sets["gpt"];
        assert_eq!(gpt.first_day.matches.len(), 3);
        assert_eq!(
            gpt.first_day.mismatches.get(&4).unwrap().as_ref().unwrap(),
            &Mismatch {
                given: "B".into(),
                expected: "C".into()
            }
        );
        assert_eq!(gpt.second_day.answered(), 3);
        assert_eq!(gpt.second_day.mismatches.get(&62), Some(&None));
    }

    #[test]
    fn answer_sets_reject_conflicting_question() {
        let json = r#"
{
  "gpt": {
    "PRIMEIRA_PROVA": {"iguais": [7], "diferentes": [7]},
    "SEGUNDA_PROVA": {"iguais": [], "diferentes": []}
  }
}
"#;
        let err = parse_answer_sets_str(json).unwrap_err();
        assert!(err.to_string().contains("question 7"));
    }

    #[test]
    fn parse_weight_table_strips_total() {
        let json = r#"
{
  "pesos_provas_por_curso": {
    "Computação": {"POR": 2.0, "MAT": 3.0, "FIS": 2.0, "LIN": 1.0, "total": 8.0}
  }
}
"#;
        let table = parse_weight_table_str(json).unwrap();
        let weights = &table.programs["Computação"];
        assert_eq!(weights.weights.len(), 4);
        assert_eq!(weights.weights[&Subject::Mathematics], 3.0);
        assert!(!weights.weights.keys().any(|s| s.to_string() == "total"));
    }

    #[test]
    fn weight_table_rejects_unknown_key() {
        let json = r#"{"pesos_provas": {"Computação": {"XYZ": 1.0}}}"#;
        let err = parse_weight_table_str(json).unwrap_err();
        assert!(err.to_string().contains("XYZ"));
    }

    #[test]
    fn weight_table_rejects_negative_weight() {
        let json = r#"{"pesos_provas": {"Computação": {"MAT": -1.0}}}"#;
        assert!(parse_weight_table_str(json).is_err());
    }

    #[test]
    fn parse_cutoff_table_nested_and_flat() {
        let nested = r#"{"notas_corte_2024": {"Ciência da Computação": 702.36}}"#;
        let table = parse_cutoff_table_str(nested).unwrap();
        assert_eq!(table.cutoffs["Ciência da Computação"], 702.36);

        let flat = r#"{"Ciência da Computação": 702.36}"#;
        let table = parse_cutoff_table_str(flat).unwrap();
        assert_eq!(table.cutoffs.len(), 1);
    }

    #[test]
    fn parse_answer_key() {
        let json = r#"
{
  "PRIMEIRA_PROVA": {"1": "A", "2": "b"},
  "SEGUNDA_PROVA": {"61": "C"}
}
"#;
        let key = parse_answer_key_str(json).unwrap();
        assert_eq!(key.first_day[&2], Alternative::B);
        assert_eq!(key.second_day[&61], Alternative::C);

        let bad = r#"{"PRIMEIRA_PROVA": {"1": "F"}}"#;
        assert!(parse_answer_key_str(bad).is_err());
    }

    #[test]
    fn validation_flags_missing_statistics_and_unknown_weights() {
        let exam = parse_exam_info_str(EXAM_JSON, None).unwrap();
        let weights = parse_weight_table_str(
            r#"{"pesos_provas": {"Curso": {"POR": 1.0, "BIO": 2.0}, "Vazio": {"total": 3.0}}}"#,
        )
        .unwrap();

        let warnings = validate_reference(&exam, &weights);
        // Literature has questions but no statistics.
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("literature") && w.message.contains("statistics")));
        // Biology is weighted but has no questions.
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("biology") && w.message.contains("no questions")));
        // The empty program is flagged.
        assert!(warnings
            .iter()
            .any(|w| w.context.as_deref() == Some("Vazio")));
    }
}
