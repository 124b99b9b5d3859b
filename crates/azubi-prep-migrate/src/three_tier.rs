// SPDX-License-Identifier: Apache-2.0

use azubi_prep_content::ContentService;
use azubi_prep_core::EngineError;
use azubi_prep_model::{ModuleId, ProgressState, QuizAttempt, ThreeTierCategory};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Progress of one three-tier category, as produced by the migration
/// transform and the `progress_with_three_tier_categories` query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProgressSlice {
    pub modules_completed: BTreeSet<ModuleId>,
    pub modules_in_progress: BTreeSet<ModuleId>,
    pub quiz_attempts: Vec<QuizAttempt>,
    pub average_score: u8,
}

/// Buckets every completed/in-progress module and quiz attempt under
/// its item's current three-tier category, derived on the fly.
///
/// Items the corpus no longer knows land in `allgemein` so that no
/// historical progress is dropped.
pub async fn progress_with_three_tier_categories(
    content: &ContentService,
    progress: &ProgressState,
) -> Result<BTreeMap<ThreeTierCategory, CategoryProgressSlice>, EngineError> {
    let mut slices: BTreeMap<ThreeTierCategory, CategoryProgressSlice> = BTreeMap::new();
    for category in ThreeTierCategory::ALL {
        slices.insert(category, CategoryProgressSlice::default());
    }

    for id in &progress.modules_completed {
        let category = module_category(content, id).await?;
        if let Some(slice) = slices.get_mut(&category) {
            slice.modules_completed.insert(id.clone());
        }
    }
    for id in &progress.modules_in_progress {
        let category = module_category(content, id).await?;
        if let Some(slice) = slices.get_mut(&category) {
            slice.modules_in_progress.insert(id.clone());
        }
    }
    for attempt in &progress.quiz_attempts {
        let category = match content.quiz_by_id(&attempt.quiz_id).await? {
            Some(quiz) => quiz.three_tier_category,
            None => {
                tracing::warn!(quiz = attempt.quiz_id.as_str(), "attempt for unknown quiz kept under allgemein");
                ThreeTierCategory::Allgemein
            }
        };
        if let Some(slice) = slices.get_mut(&category) {
            slice.quiz_attempts.push(attempt.clone());
        }
    }

    for slice in slices.values_mut() {
        if !slice.quiz_attempts.is_empty() {
            let sum: u32 = slice.quiz_attempts.iter().map(|a| u32::from(a.score)).sum();
            slice.average_score = (sum / slice.quiz_attempts.len() as u32) as u8;
        }
    }
    Ok(slices)
}

async fn module_category(
    content: &ContentService,
    id: &ModuleId,
) -> Result<ThreeTierCategory, EngineError> {
    match content.module_by_id(id).await? {
        Some(module) => Ok(module.three_tier_category),
        None => {
            tracing::warn!(module = id.as_str(), "progress for unknown module kept under allgemein");
            Ok(ThreeTierCategory::Allgemein)
        }
    }
}
