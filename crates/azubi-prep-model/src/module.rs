// SPDX-License-Identifier: Apache-2.0

use crate::category::{CategoryMapping, ThreeTierCategory};
use crate::ids::{ModuleId, QuizId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    /// Total order used by sort keys and difficulty-delta scoring.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Beginner => 0,
            Self::Intermediate => 1,
            Self::Advanced => 2,
        }
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExamRelevance {
    High,
    Medium,
    Low,
}

impl ExamRelevance {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Descending sort key: high before medium before low.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

impl Display for ExamRelevance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeExample {
    pub language: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Enriched study module.
///
/// Constructed once by the content loader from its raw manifest record
/// and never mutated afterwards; `category` keeps its pre-enrichment
/// value, `three_tier_category` is derived.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: ModuleId,
    pub title: String,
    pub description: String,
    pub content: String,
    pub category: String,
    pub three_tier_category: ThreeTierCategory,
    pub category_mapping: CategoryMapping,
    pub difficulty: Difficulty,
    pub exam_relevance: ExamRelevance,
    pub estimated_time: u32,
    pub tags: BTreeSet<String>,
    pub prerequisites: Vec<ModuleId>,
    pub related_quizzes: BTreeSet<QuizId>,
    pub new_in_2025: bool,
    pub removed_in_2025: bool,
    pub important: bool,
    pub code_examples: Vec<CodeExample>,
}
