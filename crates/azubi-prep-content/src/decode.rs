// SPDX-License-Identifier: Apache-2.0

//! Tolerant decode of raw manifest documents.
//!
//! Raw records accept whatever the corpus actually contains (missing
//! fields, mixed `estimatedTime` shapes, single-string tag lists) and
//! stay immutable; enrichment builds the canonical records from them.

use azubi_prep_model::serde_helpers;
use azubi_prep_model::{CodeExample, CorrectAnswer, Difficulty, ExamRelevance, QuestionKind};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawModule {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub three_tier_category: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub exam_relevance: Option<ExamRelevance>,
    #[serde(default, deserialize_with = "serde_helpers::estimated_minutes::deserialize")]
    pub estimated_time: u32,
    #[serde(default, deserialize_with = "serde_helpers::string_list::deserialize")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub related_quizzes: Vec<String>,
    #[serde(default)]
    pub new_in_2025: bool,
    #[serde(default)]
    pub removed_in_2025: bool,
    #[serde(default)]
    pub important: bool,
    #[serde(default)]
    pub code_examples: Vec<CodeExample>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuestion {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: CorrectAnswer,
    #[serde(default = "default_points")]
    pub points: u32,
    #[serde(default)]
    pub explanation: Option<String>,
}

const fn default_points() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuiz {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub module_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub three_tier_category: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub time_limit: Option<u32>,
    #[serde(default = "default_passing_score")]
    pub passing_score: u32,
    #[serde(default)]
    pub questions: Vec<RawQuestion>,
}

const fn default_passing_score() -> u32 {
    70
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPathModule {
    #[serde(default)]
    pub module_id: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default = "default_required")]
    pub required: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPathQuiz {
    #[serde(default)]
    pub quiz_id: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub unlock_after_modules: Vec<String>,
}

const fn default_required() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMilestone {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required_modules: Vec<String>,
    #[serde(default)]
    pub required_quizzes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLearningPath {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub estimated_duration: u32,
    #[serde(default)]
    pub modules: Vec<RawPathModule>,
    #[serde(default)]
    pub quizzes: Vec<RawPathQuiz>,
    #[serde(default)]
    pub milestones: Vec<RawMilestone>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_decodes_with_mixed_estimated_time() {
        let raw: RawModule = serde_json::from_str(
            r#"{
                "id": "bp-dpa-01-er-modeling",
                "title": "ER-Modellierung",
                "category": "BP-DPA-01",
                "estimatedTime": "1,5 Stunden",
                "tags": "datenbanken"
            }"#,
        )
        .expect("decode");
        assert_eq!(raw.estimated_time, 90);
        assert_eq!(raw.tags, vec!["datenbanken"]);
        assert!(raw.three_tier_category.is_none());
    }

    #[test]
    fn quiz_defaults_passing_score_and_points() {
        let raw: RawQuiz = serde_json::from_str(
            r#"{
                "id": "fue-01-quiz",
                "moduleId": "fue-01-planning",
                "title": "Planung",
                "category": "FÜ-01",
                "questions": [
                    {
                        "id": "q1",
                        "type": "single-choice",
                        "question": "Welches Modell?",
                        "options": ["V-Modell", "Wasserfall"],
                        "correctAnswer": "V-Modell"
                    }
                ]
            }"#,
        )
        .expect("decode");
        assert_eq!(raw.passing_score, 70);
        assert_eq!(raw.questions[0].points, 1);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let raw: RawModule =
            serde_json::from_str(r#"{"id": "m", "title": "t", "legacyField": 42}"#).expect("decode");
        assert_eq!(raw.id, "m");
    }
}
