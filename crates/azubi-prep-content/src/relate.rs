// SPDX-License-Identifier: Apache-2.0

//! Relationships derived from the loaded corpus: prerequisite chains,
//! related/advanced/complementary content, and the per-item score.

use crate::index::ContentIndex;
use azubi_prep_model::{relevance_for, Module, ModuleId, Relevance, Specialization};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Relationship {
    Prerequisite,
    Related,
    Advanced,
    Complementary,
}

#[derive(Debug, Clone)]
pub struct RelatedItem {
    pub module: Arc<Module>,
    pub relationship: Relationship,
    pub score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct RelatedBuckets {
    pub prerequisite: Vec<RelatedItem>,
    pub related: Vec<RelatedItem>,
    pub advanced: Vec<RelatedItem>,
    pub complementary: Vec<RelatedItem>,
}

impl RelatedBuckets {
    fn push(&mut self, item: RelatedItem) {
        match item.relationship {
            Relationship::Prerequisite => self.prerequisite.push(item),
            Relationship::Related => self.related.push(item),
            Relationship::Advanced => self.advanced.push(item),
            Relationship::Complementary => self.complementary.push(item),
        }
    }

    fn sort_buckets(&mut self) {
        for bucket in [
            &mut self.prerequisite,
            &mut self.related,
            &mut self.advanced,
            &mut self.complementary,
        ] {
            bucket.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.module.id.cmp(&b.module.id))
            });
        }
    }

    /// Applies the caller's options to a cached, unfiltered result.
    #[must_use]
    pub fn with_options(&self, source_category: azubi_prep_model::ThreeTierCategory, opts: &RelatedOptions) -> Self {
        let trim = |bucket: &Vec<RelatedItem>| -> Vec<RelatedItem> {
            bucket
                .iter()
                .filter(|item| {
                    !(opts.exclude_current_category
                        && item.module.three_tier_category == source_category)
                })
                .take(opts.max_results)
                .cloned()
                .collect()
        };
        Self {
            prerequisite: trim(&self.prerequisite),
            related: trim(&self.related),
            advanced: trim(&self.advanced),
            complementary: trim(&self.complementary),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RelatedOptions {
    pub exclude_current_category: bool,
    pub max_results: usize,
}

impl Default for RelatedOptions {
    fn default() -> Self {
        Self {
            exclude_current_category: false,
            max_results: 5,
        }
    }
}

fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    intersection / union
}

fn category_affinity(source: &Module, candidate: &Module, spec: Specialization) -> f64 {
    if source.three_tier_category == candidate.three_tier_category {
        return 0.3;
    }
    let source_relevant = relevance_for(source.three_tier_category, spec) != Relevance::Low;
    let candidate_relevant = relevance_for(candidate.three_tier_category, spec) != Relevance::Low;
    if source_relevant && candidate_relevant {
        0.15
    } else {
        0.0
    }
}

fn difficulty_score(source: &Module, candidate: &Module) -> f64 {
    match source.difficulty.rank().abs_diff(candidate.difficulty.rank()) {
        1 => 0.2,
        0 => 0.15,
        _ => 0.05,
    }
}

fn score_candidate(source: &Module, candidate: &Module, spec: Specialization) -> f64 {
    let mut score = jaccard(&source.tags, &candidate.tags) * 0.4;
    score += category_affinity(source, candidate, spec);
    score += difficulty_score(source, candidate);
    let chained = source.prerequisites.contains(&candidate.id)
        || candidate.prerequisites.contains(&source.id);
    if chained {
        score += 0.3;
    }
    score.clamp(0.0, 1.0)
}

fn classify(source: &Module, candidate: &Module) -> Relationship {
    if source.prerequisites.contains(&candidate.id) {
        Relationship::Prerequisite
    } else if candidate.prerequisites.contains(&source.id) {
        Relationship::Advanced
    } else if source.three_tier_category == candidate.three_tier_category {
        Relationship::Related
    } else {
        Relationship::Complementary
    }
}

/// Scores and classifies every other module against `id`. Returns
/// `None` for an unknown id; options are applied by the caller so the
/// unfiltered result stays cacheable.
#[must_use]
pub fn related_content(
    index: &ContentIndex,
    spec: Specialization,
    id: &ModuleId,
) -> Option<RelatedBuckets> {
    let source = index.module(id)?;
    let mut buckets = RelatedBuckets::default();
    for candidate in index.all_modules() {
        if candidate.id == source.id {
            continue;
        }
        let score = score_candidate(&source, &candidate, spec);
        let relationship = classify(&source, &candidate);
        buckets.push(RelatedItem {
            module: candidate,
            relationship,
            score,
        });
    }
    buckets.sort_buckets();
    Some(buckets)
}

/// Transitive prerequisites of `id`, dependencies first. Terminates on
/// every corpus because the loader breaks prerequisite cycles.
#[must_use]
pub fn prerequisites(index: &ContentIndex, id: &ModuleId) -> Vec<Arc<Module>> {
    let mut ordered = Vec::new();
    let mut seen = BTreeSet::new();
    collect_prerequisites(index, id, &mut seen, &mut ordered);
    ordered
}

fn collect_prerequisites(
    index: &ContentIndex,
    id: &ModuleId,
    seen: &mut BTreeSet<ModuleId>,
    ordered: &mut Vec<Arc<Module>>,
) {
    let Some(module) = index.module(id) else {
        return;
    };
    for prereq in &module.prerequisites {
        if seen.insert(prereq.clone()) {
            collect_prerequisites(index, prereq, seen, ordered);
            if let Some(prereq_module) = index.module(prereq) {
                ordered.push(prereq_module);
            }
        }
    }
}

/// Transitive successors of `id` in the prerequisite DAG: everything
/// that builds on it, nearest first.
#[must_use]
pub fn advanced_content(index: &ContentIndex, id: &ModuleId) -> Vec<Arc<Module>> {
    let mut successors: BTreeMap<ModuleId, Vec<ModuleId>> = BTreeMap::new();
    for module in index.all_modules() {
        for prereq in &module.prerequisites {
            successors
                .entry(prereq.clone())
                .or_default()
                .push(module.id.clone());
        }
    }

    let mut ordered = Vec::new();
    let mut seen = BTreeSet::new();
    let mut frontier = vec![id.clone()];
    while let Some(current) = frontier.pop() {
        if let Some(next) = successors.get(&current) {
            for successor in next {
                if seen.insert(successor.clone()) {
                    if let Some(module) = index.module(successor) {
                        ordered.push(module);
                    }
                    frontier.push(successor.clone());
                }
            }
        }
    }
    ordered
}

/// Memoised related-content results, keyed by module and
/// specialization. Cleared when the active specialization changes.
#[derive(Default)]
pub struct RelatedContentCache {
    inner: Mutex<BTreeMap<(ModuleId, Specialization), Arc<RelatedBuckets>>>,
}

impl RelatedContentCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(
        &self,
        index: &ContentIndex,
        spec: Specialization,
        id: &ModuleId,
    ) -> Option<Arc<RelatedBuckets>> {
        let key = (id.clone(), spec);
        if let Ok(cache) = self.inner.lock() {
            if let Some(hit) = cache.get(&key) {
                return Some(hit.clone());
            }
        }
        let computed = Arc::new(related_content(index, spec, id)?);
        if let Ok(mut cache) = self.inner.lock() {
            cache.insert(key, computed.clone());
        }
        Some(computed)
    }

    pub fn invalidate(&self) {
        if let Ok(mut cache) = self.inner.lock() {
            cache.clear();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().map(|c| c.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
