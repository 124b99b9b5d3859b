// SPDX-License-Identifier: Apache-2.0

use crate::index::ContentIndex;
use azubi_prep_model::{
    relevance_for, Module, ModuleId, Relevance, Specialization, ThreeTierCategory,
};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Scoring weights for content recommendations. The defaults carry the
/// shipped behavior; the ordering and exclusion guarantees hold for any
/// non-degenerate choice.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationWeights {
    pub prerequisites_ready: f64,
    pub prerequisites_missing: f64,
    pub next_difficulty: f64,
    pub new_in_2025: f64,
}

impl Default for RecommendationWeights {
    fn default() -> Self {
        Self {
            prerequisites_ready: 0.3,
            prerequisites_missing: -0.2,
            next_difficulty: 0.2,
            new_in_2025: 0.1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecommendOptions {
    pub max_results: usize,
    pub difficulty_progression: bool,
    pub include_categories: Option<BTreeSet<ThreeTierCategory>>,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            max_results: 10,
            difficulty_progression: true,
            include_categories: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Recommendation {
    pub module: Arc<Module>,
    pub score: f64,
    pub reasons: Vec<String>,
}

/// Scores every module the user has not completed. Results are ordered
/// by score descending (id ascending on ties) and never contain a
/// completed module.
#[must_use]
pub fn recommend_modules(
    index: &ContentIndex,
    spec: Specialization,
    completed: &BTreeSet<ModuleId>,
    opts: &RecommendOptions,
    weights: &RecommendationWeights,
) -> Vec<Recommendation> {
    let ceiling = completed
        .iter()
        .filter_map(|id| index.module(id))
        .map(|m| m.difficulty.rank())
        .max();
    let next_rank = ceiling.map_or(0, |r| r.saturating_add(1));

    let mut recommendations: Vec<Recommendation> = index
        .all_modules()
        .into_iter()
        .filter(|module| !completed.contains(&module.id))
        .filter(|module| !module.removed_in_2025)
        .filter(|module| {
            opts.include_categories
                .as_ref()
                .is_none_or(|allowed| allowed.contains(&module.three_tier_category))
        })
        .map(|module| score_module(module, spec, completed, next_rank, opts, weights))
        .collect();

    recommendations.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.module.id.cmp(&b.module.id))
    });
    recommendations.truncate(opts.max_results);
    recommendations
}

fn score_module(
    module: Arc<Module>,
    spec: Specialization,
    completed: &BTreeSet<ModuleId>,
    next_rank: u8,
    opts: &RecommendOptions,
    weights: &RecommendationWeights,
) -> Recommendation {
    let mut reasons = Vec::new();

    let relevance = relevance_for(module.three_tier_category, spec);
    let mut score = relevance.weight();
    match relevance {
        Relevance::High => reasons.push(format!("Hohe Relevanz für {}", spec.config().name)),
        Relevance::Medium => reasons.push("Grundlagenwissen für beide Fachrichtungen".to_string()),
        Relevance::Low => reasons.push("Blick über den Tellerrand deiner Fachrichtung".to_string()),
    }

    let met = module
        .prerequisites
        .iter()
        .filter(|p| completed.contains(*p))
        .count();
    if met == module.prerequisites.len() {
        score += weights.prerequisites_ready;
        if !module.prerequisites.is_empty() {
            reasons.push("Alle Voraussetzungen erfüllt".to_string());
        }
    } else if met == 0 {
        score += weights.prerequisites_missing;
        reasons.push("Voraussetzungen fehlen noch".to_string());
    } else {
        reasons.push("Einige Voraussetzungen fehlen noch".to_string());
    }

    if opts.difficulty_progression && module.difficulty.rank() == next_rank {
        score += weights.next_difficulty;
        reasons.push("Passender nächster Schwierigkeitsgrad".to_string());
    }

    if module.new_in_2025 {
        score += weights.new_in_2025;
        reasons.push("Neu im Prüfungskatalog 2025".to_string());
    }

    Recommendation {
        module,
        score: score.max(0.0),
        reasons,
    }
}
