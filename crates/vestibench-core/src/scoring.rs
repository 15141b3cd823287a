//! Question-to-subject mapping and per-subject scoring.
//!
//! `build_subject_map` expands the declarative exam structure into a
//! question-number → subject lookup. `count_correct` tallies a candidate's
//! correct answers per subject, and `standardize_all` turns the tallies into
//! standardized scores, blending the essay into the language subject.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::{AnswerSet, ExamStructure, Subject, NEUTRAL_SCORE};
use crate::statistics::{essay_standardized, ExamStatistics, StandardizedScores};

/// Lookup from global question number to the subject it belongs to.
pub type SubjectMap = BTreeMap<u32, Subject>;

/// Expand the exam structure into a question → subject map.
///
/// The two foreign-language tracks share question numbers and both land on
/// `Subject::ForeignLanguage`; any other double claim is a configuration
/// error, as is a backwards range.
pub fn build_subject_map(structure: &ExamStructure) -> Result<SubjectMap, ConfigError> {
    let mut map = SubjectMap::new();
    for section in structure.sections() {
        if section.start > section.end {
            return Err(ConfigError::MalformedRange {
                subject: section.subject.to_string(),
                range: format!("{}-{}", section.start, section.end),
            });
        }
        for question in section.questions() {
            if let Some(&existing) = map.get(&question) {
                if existing != section.subject {
                    return Err(ConfigError::OverlappingQuestion {
                        question,
                        first: existing,
                        second: section.subject,
                    });
                }
                continue;
            }
            map.insert(question, section.subject);
        }
    }
    Ok(map)
}

/// A candidate's correctness tally for one subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectTally {
    pub correct: u32,
    pub total: u32,
}

impl SubjectTally {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(self.total) * 100.0
        }
    }
}

/// Count correct answers per subject.
///
/// Every mapped question contributes to its subject's total; it counts as
/// correct when it is present in the matches set of the day bucket its
/// number falls into.
pub fn count_correct(
    answers: &AnswerSet,
    subject_map: &SubjectMap,
) -> BTreeMap<Subject, SubjectTally> {
    let mut tallies: BTreeMap<Subject, SubjectTally> = BTreeMap::new();
    for (&question, &subject) in subject_map {
        let tally = tallies.entry(subject).or_default();
        tally.total += 1;
        if answers.is_correct(question) {
            tally.correct += 1;
        }
    }
    tallies
}

/// Standardize every subject tally and blend the essay into the language
/// subject.
///
/// A subject with no reference statistics falls back to the neutral score;
/// that is a reference-data gap worth surfacing, but not an error.
pub fn standardize_all(
    tallies: &BTreeMap<Subject, SubjectTally>,
    statistics: &ExamStatistics,
    essay_score: f64,
) -> StandardizedScores {
    let mut subjects = BTreeMap::new();
    for (&subject, tally) in tallies {
        if tally.total == 0 {
            continue;
        }
        let score = match statistics.get(subject) {
            Some(stats) => stats.standardized(tally.correct),
            None => {
                tracing::warn!(%subject, "no reference statistics, using neutral score");
                NEUTRAL_SCORE
            }
        };
        subjects.insert(subject, score);
    }

    let essay = essay_standardized(essay_score);
    let language_combined = match subjects.get(&Subject::Portuguese) {
        Some(&portuguese) => (portuguese + essay) / 2.0,
        None => essay,
    };

    StandardizedScores {
        subjects,
        essay,
        language_combined,
    }
}
