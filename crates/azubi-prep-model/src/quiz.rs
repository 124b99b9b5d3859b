// SPDX-License-Identifier: Apache-2.0

use crate::category::{CategoryMapping, ThreeTierCategory};
use crate::ids::{ModuleId, QuestionId, QuizId};
use crate::module::Difficulty;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    SingleChoice,
    MultipleChoice,
    TrueFalse,
    Code,
}

impl QuestionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SingleChoice => "single-choice",
            Self::MultipleChoice => "multiple-choice",
            Self::TrueFalse => "true-false",
            Self::Code => "code",
        }
    }

    /// Choice kinds require an options list with at least two entries.
    #[must_use]
    pub const fn requires_options(self) -> bool {
        matches!(self, Self::SingleChoice | Self::MultipleChoice)
    }
}

impl Display for QuestionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Correct answer, shaped by the question kind: a single string for
/// single-choice/true-false, a set for multiple-choice, a reference
/// solution for code questions. On the wire it is a string or an array
/// of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorrectAnswer {
    Many(BTreeSet<String>),
    One(String),
}

impl CorrectAnswer {
    /// Exact-match check against a submitted answer set.
    #[must_use]
    pub fn matches(&self, submitted: &BTreeSet<String>) -> bool {
        match self {
            Self::One(expected) => submitted.len() == 1 && submitted.contains(expected),
            Self::Many(expected) => expected == submitted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: CorrectAnswer,
    pub points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Enriched quiz record; immutable after load, like [`crate::Module`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: QuizId,
    pub module_id: ModuleId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub three_tier_category: ThreeTierCategory,
    pub category_mapping: CategoryMapping,
    pub difficulty: Difficulty,
    pub time_limit: Option<u32>,
    pub passing_score: u8,
    pub questions: Vec<Question>,
}

impl Quiz {
    #[must_use]
    pub fn total_points(&self) -> u32 {
        self.questions.iter().map(|q| q.points).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn correct_answer_decodes_string_and_array() {
        let one: CorrectAnswer = serde_json::from_str("\"true\"").expect("string form");
        assert_eq!(one, CorrectAnswer::One("true".to_string()));

        let many: CorrectAnswer = serde_json::from_str("[\"a\", \"c\"]").expect("array form");
        assert_eq!(many, CorrectAnswer::Many(set(&["a", "c"])));
    }

    #[test]
    fn single_answer_matches_exactly_one_submission() {
        let answer = CorrectAnswer::One("b".to_string());
        assert!(answer.matches(&set(&["b"])));
        assert!(!answer.matches(&set(&["a", "b"])));
        assert!(!answer.matches(&set(&[])));
    }

    #[test]
    fn multiple_answer_requires_the_full_set() {
        let answer = CorrectAnswer::Many(set(&["a", "c"]));
        assert!(answer.matches(&set(&["a", "c"])));
        assert!(!answer.matches(&set(&["a"])));
        assert!(!answer.matches(&set(&["a", "b", "c"])));
    }

    #[test]
    fn question_kind_option_requirements() {
        assert!(QuestionKind::SingleChoice.requires_options());
        assert!(QuestionKind::MultipleChoice.requires_options());
        assert!(!QuestionKind::TrueFalse.requires_options());
        assert!(!QuestionKind::Code.requires_options());
    }
}
