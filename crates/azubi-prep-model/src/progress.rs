// SPDX-License-Identifier: Apache-2.0

use crate::ids::{ModuleId, QuizId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Schema marker a migrated progress record carries.
pub const THREE_TIER_STRUCTURE: &str = "three-tier-categories";

/// Version stamped into exported progress documents.
pub const PROGRESS_SCHEMA_VERSION: &str = "2";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub quiz_id: QuizId,
    /// Percentage 0..=100.
    pub score: u8,
    pub passed: bool,
    #[serde(default)]
    pub answers: BTreeMap<String, Vec<String>>,
    pub date_ms: u64,
    #[serde(default)]
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationInfo {
    pub source_structure: String,
    pub target_structure: String,
    pub migrated_at_ms: u64,
    pub previous_snapshot_key: String,
    pub migration_id: String,
}

/// The live per-user progress record.
///
/// Mutated only through the progress service; the migration service
/// swaps whole records atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    #[serde(default)]
    pub modules_completed: BTreeSet<ModuleId>,
    #[serde(default)]
    pub modules_in_progress: BTreeSet<ModuleId>,
    #[serde(default)]
    pub quiz_attempts: Vec<QuizAttempt>,
    #[serde(default)]
    pub last_activity_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migration_info: Option<MigrationInfo>,
}

impl ProgressState {
    /// Whether anything worth migrating has happened.
    #[must_use]
    pub fn has_meaningful_progress(&self) -> bool {
        !self.modules_completed.is_empty()
            || !self.modules_in_progress.is_empty()
            || !self.quiz_attempts.is_empty()
    }

    #[must_use]
    pub fn is_migrated(&self) -> bool {
        self.migration_info
            .as_ref()
            .is_some_and(|info| info.target_structure == THREE_TIER_STRUCTURE)
    }

    #[must_use]
    pub fn best_score(&self, quiz_id: &QuizId) -> Option<u8> {
        self.quiz_attempts
            .iter()
            .filter(|a| &a.quiz_id == quiz_id)
            .map(|a| a.score)
            .max()
    }

    #[must_use]
    pub fn attempted_quizzes(&self) -> BTreeSet<QuizId> {
        self.quiz_attempts.iter().map(|a| a.quiz_id.clone()).collect()
    }

    /// Internal invariant check: completed/in-progress disjoint, scores
    /// in range, `last_activity_ms` not behind any attempt.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for id in self.modules_completed.intersection(&self.modules_in_progress) {
            problems.push(format!("module {id} is both completed and in progress"));
        }
        for attempt in &self.quiz_attempts {
            if attempt.score > 100 {
                problems.push(format!(
                    "attempt on {} has out-of-range score {}",
                    attempt.quiz_id, attempt.score
                ));
            }
            if attempt.date_ms > self.last_activity_ms {
                problems.push(format!(
                    "attempt on {} is newer than lastActivity",
                    attempt.quiz_id
                ));
            }
        }
        problems
    }
}
