// SPDX-License-Identifier: Apache-2.0

use crate::index::ContentItem;
use crate::load::{load_corpus, LoadedCorpus};
use crate::recommend::{recommend_modules, RecommendOptions, Recommendation, RecommendationWeights};
use crate::relate::{
    advanced_content, prerequisites, RelatedBuckets, RelatedContentCache, RelatedOptions,
};
use crate::search::{search, SearchFilters};
use crate::source::ContentSource;
use crate::validate::{validate_corpus, CategoryValidationReport};
use azubi_prep_core::{Clock, EngineError, ErrorKind};
use azubi_prep_model::{
    category_config, relevance_for, CategoryConfig, ExamChanges2025, LearningPath, LearningPathId,
    LoadReport, Module, ModuleId, Quiz, QuizId, Specialization, ThreeTierCategory,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Content grouped under one three-tier label for UI fan-out.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryContentGroup {
    pub category: ThreeTierCategory,
    pub config: CategoryConfig,
    pub modules: Vec<Arc<Module>>,
    pub quizzes: Vec<Arc<Quiz>>,
}

/// Authoritative read-only view of the content corpus.
///
/// The first query (or an explicit `initialize`) loads and enriches the
/// corpus; every later query answers from the in-memory indexes.
pub struct ContentService {
    source: Arc<dyn ContentSource>,
    clock: Arc<dyn Clock>,
    corpus: OnceCell<LoadedCorpus>,
    related_cache: RelatedContentCache,
}

impl ContentService {
    #[must_use]
    pub fn new(source: Arc<dyn ContentSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            corpus: OnceCell::new(),
            related_cache: RelatedContentCache::new(),
        }
    }

    /// Loads the corpus if it is not loaded yet. Queries call this
    /// lazily; boot calls it explicitly to front-load the work.
    pub async fn initialize(&self) -> Result<(), EngineError> {
        self.corpus().await.map(|_| ())
    }

    async fn corpus(&self) -> Result<&LoadedCorpus, EngineError> {
        self.corpus
            .get_or_try_init(|| load_corpus(self.source.as_ref(), self.clock.as_ref()))
            .await
    }

    pub async fn all_modules(&self) -> Result<Vec<Arc<Module>>, EngineError> {
        Ok(self.corpus().await?.index.all_modules())
    }

    pub async fn all_quizzes(&self) -> Result<Vec<Arc<Quiz>>, EngineError> {
        Ok(self.corpus().await?.index.all_quizzes())
    }

    pub async fn module_by_id(&self, id: &ModuleId) -> Result<Option<Arc<Module>>, EngineError> {
        Ok(self.corpus().await?.index.module(id))
    }

    pub async fn quiz_by_id(&self, id: &QuizId) -> Result<Option<Arc<Quiz>>, EngineError> {
        Ok(self.corpus().await?.index.quiz(id))
    }

    pub async fn content_by_category(
        &self,
        category: ThreeTierCategory,
    ) -> Result<Vec<ContentItem>, EngineError> {
        Ok(self.corpus().await?.index.content_by_category(category).to_vec())
    }

    /// Free search; an empty query matches everything.
    pub async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<ContentItem>, EngineError> {
        Ok(search(&self.corpus().await?.index, query, filters))
    }

    /// Search restricted to one label; here an empty query is invalid.
    pub async fn search_in_category(
        &self,
        query: &str,
        category: ThreeTierCategory,
    ) -> Result<Vec<ContentItem>, EngineError> {
        if query.trim().is_empty() {
            return Err(EngineError::new(
                ErrorKind::InvalidInput,
                "search_in_category requires a non-empty query",
            ));
        }
        let filters = SearchFilters {
            category: Some(category),
            ..SearchFilters::default()
        };
        Ok(search(&self.corpus().await?.index, query, &filters))
    }

    pub async fn related_quizzes(&self, module_id: &ModuleId) -> Result<Vec<Arc<Quiz>>, EngineError> {
        Ok(self.corpus().await?.index.quizzes_for_module(module_id))
    }

    /// Modules related to `module_id`, every bucket flattened, best
    /// score first.
    pub async fn related_modules(
        &self,
        module_id: &ModuleId,
        spec: Specialization,
    ) -> Result<Vec<Arc<Module>>, EngineError> {
        let Some(buckets) = self.related_content(module_id, spec, &RelatedOptions::default()).await?
        else {
            return Ok(Vec::new());
        };
        let mut items: Vec<_> = buckets
            .prerequisite
            .into_iter()
            .chain(buckets.related)
            .chain(buckets.advanced)
            .chain(buckets.complementary)
            .collect();
        items.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.module.id.cmp(&b.module.id))
        });
        Ok(items.into_iter().map(|item| item.module).collect())
    }

    pub async fn related_content(
        &self,
        module_id: &ModuleId,
        spec: Specialization,
        opts: &RelatedOptions,
    ) -> Result<Option<RelatedBuckets>, EngineError> {
        let index = &self.corpus().await?.index;
        let Some(cached) = self.related_cache.get_or_compute(index, spec, module_id) else {
            return Ok(None);
        };
        let source_category = index
            .module(module_id)
            .map(|m| m.three_tier_category)
            .unwrap_or(ThreeTierCategory::Allgemein);
        Ok(Some(cached.with_options(source_category, opts)))
    }

    pub async fn prerequisites(&self, id: &ModuleId) -> Result<Vec<Arc<Module>>, EngineError> {
        Ok(prerequisites(&self.corpus().await?.index, id))
    }

    pub async fn advanced_content(&self, id: &ModuleId) -> Result<Vec<Arc<Module>>, EngineError> {
        Ok(advanced_content(&self.corpus().await?.index, id))
    }

    pub async fn recommendations(
        &self,
        spec: Specialization,
        completed: &BTreeSet<ModuleId>,
        opts: &RecommendOptions,
    ) -> Result<Vec<Recommendation>, EngineError> {
        Ok(recommend_modules(
            &self.corpus().await?.index,
            spec,
            completed,
            opts,
            &RecommendationWeights::default(),
        ))
    }

    /// All content grouped by label, with display config attached.
    pub async fn content_with_category_info(
        &self,
    ) -> Result<BTreeMap<ThreeTierCategory, CategoryContentGroup>, EngineError> {
        let index = &self.corpus().await?.index;
        let mut groups = BTreeMap::new();
        for category in ThreeTierCategory::ALL {
            let mut modules = Vec::new();
            let mut quizzes = Vec::new();
            for item in index.content_by_category(category) {
                match item {
                    ContentItem::Module(m) => modules.push(m.clone()),
                    ContentItem::Quiz(q) => quizzes.push(q.clone()),
                }
            }
            groups.insert(
                category,
                CategoryContentGroup {
                    category,
                    config: category_config(category),
                    modules,
                    quizzes,
                },
            );
        }
        Ok(groups)
    }

    pub async fn learning_path(
        &self,
        id: &LearningPathId,
    ) -> Result<Option<Arc<LearningPath>>, EngineError> {
        Ok(self.corpus().await?.index.path(id))
    }

    pub async fn learning_paths(&self) -> Result<Vec<Arc<LearningPath>>, EngineError> {
        Ok(self.corpus().await?.index.all_paths())
    }

    /// Paths ranked by how relevant their modules are for the given
    /// specialization.
    pub async fn recommended_learning_paths(
        &self,
        spec: Specialization,
    ) -> Result<Vec<Arc<LearningPath>>, EngineError> {
        let index = &self.corpus().await?.index;
        let mut scored: Vec<(f64, Arc<LearningPath>)> = index
            .all_paths()
            .into_iter()
            .map(|path| {
                let weights: Vec<f64> = path
                    .modules
                    .iter()
                    .filter_map(|entry| index.module(&entry.module_id))
                    .map(|m| relevance_for(m.three_tier_category, spec).weight())
                    .collect();
                let score = if weights.is_empty() {
                    0.0
                } else {
                    weights.iter().sum::<f64>() / weights.len() as f64
                };
                (score, path)
            })
            .collect();
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.id.cmp(&b.1.id))
        });
        Ok(scored.into_iter().map(|(_, path)| path).collect())
    }

    pub async fn exam_changes(&self) -> Result<ExamChanges2025, EngineError> {
        Ok(self.corpus().await?.index.exam_changes().clone())
    }

    pub async fn load_report(&self) -> Result<LoadReport, EngineError> {
        Ok(self.corpus().await?.report.clone())
    }

    pub async fn validate(&self) -> Result<CategoryValidationReport, EngineError> {
        Ok(validate_corpus(&self.corpus().await?.index))
    }

    /// Drops memoised relationship results; called on specialization
    /// change.
    pub fn invalidate_relationship_cache(&self) {
        self.related_cache.invalidate();
    }
}
