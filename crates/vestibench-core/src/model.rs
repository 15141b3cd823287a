//! Core data model types for vestibench.
//!
//! These are the fundamental types the whole system shares: the exam
//! subjects, the per-day exam structure, candidate answer sets, program
//! weight tables, and cutoff tables. All reference data is immutable once
//! parsed and is shared read-only across candidates.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Highest question number printed in the first-day booklet. Questions
/// numbered above this belong to the second-day answer bucket.
pub const FIRST_DAY_CEILING: u32 = 60;

/// The neutral standardized score: the scale's defined mean. Substituted
/// whenever a weighted subject has no score of its own.
pub const NEUTRAL_SCORE: f64 = 500.0;

/// The nine logical exam subjects.
///
/// The two foreign-language tracks (English and Spanish) are merged into a
/// single `ForeignLanguage` subject, and "língua portuguesa" is normalized
/// to `Portuguese`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Portuguese,
    Literature,
    Mathematics,
    Geography,
    History,
    Physics,
    Chemistry,
    Biology,
    ForeignLanguage,
}

impl Subject {
    /// All subjects, in canonical order.
    pub const ALL: [Subject; 9] = [
        Subject::Portuguese,
        Subject::Literature,
        Subject::Mathematics,
        Subject::Geography,
        Subject::History,
        Subject::Physics,
        Subject::Chemistry,
        Subject::Biology,
        Subject::ForeignLanguage,
    ];

    /// The three-letter abbreviation used in program weight tables.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Subject::Portuguese => "POR",
            Subject::Literature => "LIT",
            Subject::Mathematics => "MAT",
            Subject::Geography => "GEO",
            Subject::History => "HIS",
            Subject::Physics => "FIS",
            Subject::Chemistry => "QUI",
            Subject::Biology => "BIO",
            Subject::ForeignLanguage => "LIN",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Subject::Portuguese => "portuguese",
            Subject::Literature => "literature",
            Subject::Mathematics => "mathematics",
            Subject::Geography => "geography",
            Subject::History => "history",
            Subject::Physics => "physics",
            Subject::Chemistry => "chemistry",
            Subject::Biology => "biology",
            Subject::ForeignLanguage => "foreign_language",
        };
        write!(f, "{name}")
    }
}

/// Lowercase a raw subject key, fold Portuguese accents, and turn separators
/// into underscores, so that `"Língua Portuguesa"` and `"lingua_portuguesa"`
/// compare equal.
pub(crate) fn normalize_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.trim().to_lowercase().chars() {
        out.push(match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' | 'ü' => 'u',
            'ç' => 'c',
            ' ' | '-' => '_',
            other => other,
        });
    }
    out
}

impl FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "portugues" | "lingua_portuguesa" | "portuguese" | "por" => Ok(Subject::Portuguese),
            "literatura" | "literature" | "lit" => Ok(Subject::Literature),
            "matematica" | "mathematics" | "mat" => Ok(Subject::Mathematics),
            "geografia" | "geography" | "geo" => Ok(Subject::Geography),
            "historia" | "history" | "his" => Ok(Subject::History),
            "fisica" | "physics" | "fis" => Ok(Subject::Physics),
            "quimica" | "chemistry" | "qui" => Ok(Subject::Chemistry),
            "biologia" | "biology" | "bio" => Ok(Subject::Biology),
            "lingua_estrangeira" | "ingles" | "espanhol" | "foreign_language" | "english"
            | "spanish" | "lin" => Ok(Subject::ForeignLanguage),
            other => Err(format!("unknown subject: {other}")),
        }
    }
}

/// Which of the two exam days a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExamDay {
    First,
    Second,
}

impl ExamDay {
    /// Classify a question number by the fixed first-day numbering ceiling.
    pub fn of_question(number: u32) -> ExamDay {
        if number <= FIRST_DAY_CEILING {
            ExamDay::First
        } else {
            ExamDay::Second
        }
    }

    pub fn index(&self) -> u8 {
        match self {
            ExamDay::First => 1,
            ExamDay::Second => 2,
        }
    }

    pub fn from_index(index: u8) -> Option<ExamDay> {
        match index {
            1 => Some(ExamDay::First),
            2 => Some(ExamDay::Second),
            _ => None,
        }
    }
}

impl fmt::Display for ExamDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day{}", self.index())
    }
}

impl Serialize for ExamDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.index())
    }
}

impl<'de> Deserialize<'de> for ExamDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let index = u8::deserialize(deserializer)?;
        ExamDay::from_index(index)
            .ok_or_else(|| D::Error::custom(format!("invalid exam day: {index}")))
    }
}

/// One contiguous block of questions belonging to a single subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub subject: Subject,
    /// First question number, inclusive.
    pub start: u32,
    /// Last question number, inclusive.
    pub end: u32,
}

impl Section {
    /// Parse a `"start-end"` range string into a section.
    pub fn from_range(subject: Subject, range: &str) -> Result<Section, ConfigError> {
        let malformed = || ConfigError::MalformedRange {
            subject: subject.to_string(),
            range: range.to_string(),
        };
        let (start, end) = range.split_once('-').ok_or_else(malformed)?;
        let start: u32 = start.trim().parse().map_err(|_| malformed())?;
        let end: u32 = end.trim().parse().map_err(|_| malformed())?;
        Ok(Section {
            subject,
            start,
            end,
        })
    }

    pub fn questions(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

/// The declarative exam structure: ordered sections for each day.
#[derive(Debug, Clone, Default)]
pub struct ExamStructure {
    pub first_day: Vec<Section>,
    pub second_day: Vec<Section>,
}

impl ExamStructure {
    /// Sections of both days, first day first.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.first_day.iter().chain(self.second_day.iter())
    }
}

/// A mismatched answer: what the candidate chose vs. the answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    #[serde(rename = "resposta_llm")]
    pub given: String,
    #[serde(rename = "resposta_correta")]
    pub expected: String,
}

/// One day's worth of a candidate's graded answers.
///
/// Mismatch detail is optional because some answer records carry only the
/// list of wrong question numbers, not the chosen/expected letters.
#[derive(Debug, Clone, Default)]
pub struct DayAnswers {
    pub matches: BTreeSet<u32>,
    pub mismatches: BTreeMap<u32, Option<Mismatch>>,
}

impl DayAnswers {
    /// Number of questions this candidate answered that day.
    pub fn answered(&self) -> usize {
        self.matches.len() + self.mismatches.len()
    }

    /// A question may appear in at most one of the two sets.
    pub fn validate(&self, candidate: &str) -> Result<(), ConfigError> {
        for question in &self.matches {
            if self.mismatches.contains_key(question) {
                return Err(ConfigError::ConflictingAnswer {
                    candidate: candidate.to_string(),
                    question: *question,
                });
            }
        }
        Ok(())
    }
}

/// A candidate's complete answer set across both exam days.
#[derive(Debug, Clone, Default)]
pub struct AnswerSet {
    pub first_day: DayAnswers,
    pub second_day: DayAnswers,
}

impl AnswerSet {
    pub fn day(&self, day: ExamDay) -> &DayAnswers {
        match day {
            ExamDay::First => &self.first_day,
            ExamDay::Second => &self.second_day,
        }
    }

    pub fn day_mut(&mut self, day: ExamDay) -> &mut DayAnswers {
        match day {
            ExamDay::First => &mut self.first_day,
            ExamDay::Second => &mut self.second_day,
        }
    }

    /// Whether the candidate got this question right, looked up in the day
    /// bucket the question number falls into.
    pub fn is_correct(&self, question: u32) -> bool {
        self.day(ExamDay::of_question(question))
            .matches
            .contains(&question)
    }
}

/// One of the five multiple-choice alternatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Alternative {
    A,
    B,
    C,
    D,
    E,
}

impl Alternative {
    pub fn as_char(&self) -> char {
        match self {
            Alternative::A => 'A',
            Alternative::B => 'B',
            Alternative::C => 'C',
            Alternative::D => 'D',
            Alternative::E => 'E',
        }
    }

    pub fn from_char(c: char) -> Option<Alternative> {
        match c.to_ascii_uppercase() {
            'A' => Some(Alternative::A),
            'B' => Some(Alternative::B),
            'C' => Some(Alternative::C),
            'D' => Some(Alternative::D),
            'E' => Some(Alternative::E),
            _ => None,
        }
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Alternative {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Alternative::from_char(c).ok_or_else(|| format!("not an alternative: {s}"))
            }
            _ => Err(format!("not an alternative: {s}")),
        }
    }
}

/// The official answer key, keyed by question number within each day.
#[derive(Debug, Clone, Default)]
pub struct AnswerKey {
    pub first_day: BTreeMap<u32, Alternative>,
    pub second_day: BTreeMap<u32, Alternative>,
}

impl AnswerKey {
    pub fn day(&self, day: ExamDay) -> &BTreeMap<u32, Alternative> {
        match day {
            ExamDay::First => &self.first_day,
            ExamDay::Second => &self.second_day,
        }
    }
}

/// A single exam question, as produced by the extraction stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamQuestion {
    pub day: ExamDay,
    pub number: u32,
    pub text: String,
    pub page: u32,
    #[serde(default)]
    pub image_count: u32,
}

impl ExamQuestion {
    /// Stable identifier, e.g. `day1_q003`.
    pub fn id(&self) -> String {
        format!("{}_q{:03}", self.day, self.number)
    }
}

/// Per-program subject weights, with the `total` metadata key already
/// stripped at parse time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramWeights {
    pub weights: BTreeMap<Subject, f64>,
}

impl ProgramWeights {
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Subject weights for every program in the catalog, keyed by the short
/// program name.
#[derive(Debug, Clone, Default)]
pub struct WeightTable {
    pub programs: BTreeMap<String, ProgramWeights>,
}

/// Minimum admission score per canonical program name.
#[derive(Debug, Clone, Default)]
pub struct CutoffTable {
    pub cutoffs: BTreeMap<String, f64>,
}
