// SPDX-License-Identifier: Apache-2.0

//! Read-model record types for the progress queries.

use azubi_prep_model::{ExamRelevance, Relevance, ThreeTierCategory};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProgress {
    pub modules_completed: usize,
    pub total_modules: usize,
    pub quizzes_passed: usize,
    pub total_quizzes: usize,
    pub completion_percentage: u8,
    pub relevance: Relevance,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallProgress {
    pub modules_completed: usize,
    pub total_modules: usize,
    pub quizzes_taken: usize,
    pub average_quiz_score: u8,
    pub overall_percentage: u8,
    pub last_activity_ms: u64,
    pub category_breakdown: BTreeMap<ThreeTierCategory, CategoryProgress>,
}

/// FÜ codes are cross-profession basics, BP codes are profession
/// specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MainCategory {
    #[serde(rename = "FÜ")]
    Fue,
    #[serde(rename = "BP")]
    Bp,
}

impl MainCategory {
    #[must_use]
    pub fn of_legacy_code(code: &str) -> Self {
        let folded = code.trim().to_lowercase();
        if folded.starts_with("fü") || folded.starts_with("fue") {
            Self::Fue
        } else {
            Self::Bp
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyCategoryProgress {
    pub category: String,
    pub completed: usize,
    pub in_progress: usize,
    pub total: usize,
    pub completion_percentage: u8,
    pub exam_relevance: ExamRelevance,
    pub main_category: MainCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeakAreaKind {
    QuizPerformance,
    IncompleteCategory,
    NewTopics2025,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeakArea {
    pub kind: WeakAreaKind,
    pub severity: Severity,
    /// What the weakness is about: a quiz id, a category label, or the
    /// 2025 topic count.
    pub subject: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadinessLevel {
    Excellent,
    Good,
    Moderate,
    NeedsImprovement,
    Insufficient,
}

impl ReadinessLevel {
    #[must_use]
    pub const fn of_score(score: u8) -> Self {
        match score {
            85.. => Self::Excellent,
            70..=84 => Self::Good,
            50..=69 => Self::Moderate,
            30..=49 => Self::NeedsImprovement,
            _ => Self::Insufficient,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessBreakdown {
    pub module_readiness: u8,
    pub quiz_readiness: u8,
    pub new_topics_readiness: u8,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessStatistics {
    pub modules_completed: usize,
    pub total_modules: usize,
    pub quizzes_passed: usize,
    pub quizzes_attempted: usize,
    pub total_quizzes: usize,
    pub new_topics_completed: usize,
    pub new_topics_total: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamReadiness {
    pub overall_readiness: u8,
    pub readiness_level: ReadinessLevel,
    pub breakdown: ReadinessBreakdown,
    pub statistics: ReadinessStatistics,
    pub recommendation: String,
}
