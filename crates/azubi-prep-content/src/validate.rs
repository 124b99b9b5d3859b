// SPDX-License-Identifier: Apache-2.0

//! Corpus-level category invariants, checked after load and before a
//! migration is trusted.

use crate::index::{ContentIndex, ContentItem};
use azubi_prep_model::{map_legacy_category, ThreeTierCategory};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCounts {
    pub total: usize,
    pub modules: usize,
    pub quizzes: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryValidationReport {
    pub is_valid: bool,
    pub total_items: usize,
    pub valid_items: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub by_category: BTreeMap<ThreeTierCategory, CategoryCounts>,
}

/// Checks every §-invariant the category model guarantees: mapping
/// block consistency, unique ids, resolvable references, and
/// recomputability of the stored label from the legacy code.
#[must_use]
pub fn validate_corpus(index: &ContentIndex) -> CategoryValidationReport {
    let mut report = CategoryValidationReport::default();
    let mut seen_ids: BTreeSet<String> = BTreeSet::new();

    let modules = index.all_modules();
    let quizzes = index.all_quizzes();
    report.total_items = modules.len() + quizzes.len();

    for category in ThreeTierCategory::ALL {
        report.by_category.insert(category, CategoryCounts::default());
    }
    for module in &modules {
        let counts = report
            .by_category
            .entry(module.three_tier_category)
            .or_default();
        counts.total += 1;
        counts.modules += 1;
    }
    for quiz in &quizzes {
        let counts = report
            .by_category
            .entry(quiz.three_tier_category)
            .or_default();
        counts.total += 1;
        counts.quizzes += 1;
    }

    for item in index.all_items() {
        let mut item_valid = true;

        if !seen_ids.insert(item.id().to_string()) {
            report.errors.push(format!("duplicate content id {}", item.id()));
            item_valid = false;
        }

        let mapping = item.category_mapping();
        if mapping.three_tier_category != item.three_tier_category() {
            report.errors.push(format!(
                "{}: categoryMapping label {} disagrees with {}",
                item.id(),
                mapping.three_tier_category,
                item.three_tier_category()
            ));
            item_valid = false;
        }
        if mapping.source_category != item.legacy_category() {
            report.errors.push(format!(
                "{}: categoryMapping sourceCategory {:?} disagrees with category {:?}",
                item.id(),
                mapping.source_category,
                item.legacy_category()
            ));
            item_valid = false;
        }

        // A stored label may legitimately override the legacy-derived
        // one; a mismatch is surfaced, not failed.
        if map_legacy_category(item.legacy_category()) != item.three_tier_category() {
            report.warnings.push(format!(
                "{}: stored label {} differs from legacy derivation of {:?}",
                item.id(),
                item.three_tier_category(),
                item.legacy_category()
            ));
        }

        if let ContentItem::Quiz(quiz) = &item {
            if index.module(&quiz.module_id).is_none() {
                report
                    .errors
                    .push(format!("{}: moduleId {} does not exist", quiz.id, quiz.module_id));
                item_valid = false;
            }
        }
        if let ContentItem::Module(module) = &item {
            for prereq in &module.prerequisites {
                if index.module(prereq).is_none() {
                    report
                        .errors
                        .push(format!("{}: prerequisite {prereq} does not exist", module.id));
                    item_valid = false;
                }
            }
            for quiz_id in &module.related_quizzes {
                if index.quiz(quiz_id).is_none() {
                    report
                        .errors
                        .push(format!("{}: related quiz {quiz_id} does not exist", module.id));
                    item_valid = false;
                }
            }
        }

        if item_valid {
            report.valid_items += 1;
        }
    }

    report.is_valid = report.errors.is_empty();
    report
}
