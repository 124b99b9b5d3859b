// SPDX-License-Identifier: Apache-2.0

use crate::ids::{LearningPathId, ModuleId, QuizId};
use crate::module::Difficulty;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathModule {
    pub module_id: ModuleId,
    pub order: u32,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathQuiz {
    pub quiz_id: QuizId,
    pub order: u32,
    pub required: bool,
    #[serde(default)]
    pub unlock_after_modules: BTreeSet<ModuleId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub required_modules: BTreeSet<ModuleId>,
    #[serde(default)]
    pub required_quizzes: BTreeSet<QuizId>,
}

/// Ordered itinerary of modules and quizzes with unlock dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPath {
    pub id: LearningPathId,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    /// Whole hours the path is expected to take.
    pub estimated_duration: u32,
    #[serde(default)]
    pub modules: Vec<PathModule>,
    #[serde(default)]
    pub quizzes: Vec<PathQuiz>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
}

impl LearningPath {
    /// Module entries in itinerary order.
    #[must_use]
    pub fn ordered_modules(&self) -> Vec<&PathModule> {
        let mut entries: Vec<&PathModule> = self.modules.iter().collect();
        entries.sort_by_key(|m| (m.order, m.module_id.clone()));
        entries
    }

    /// Quiz entries whose unlock requirements are met.
    #[must_use]
    pub fn unlocked_quizzes(&self, completed: &BTreeSet<ModuleId>) -> Vec<&PathQuiz> {
        let mut entries: Vec<&PathQuiz> = self
            .quizzes
            .iter()
            .filter(|q| q.unlock_after_modules.is_subset(completed))
            .collect();
        entries.sort_by_key(|q| (q.order, q.quiz_id.clone()));
        entries
    }
}
