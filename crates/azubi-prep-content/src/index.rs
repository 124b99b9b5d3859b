// SPDX-License-Identifier: Apache-2.0

use azubi_prep_model::{
    CategoryMapping, Difficulty, ExamChanges2025, ExamRelevance, LearningPath, LearningPathId,
    Module, ModuleId, Quiz, QuizId, ThreeTierCategory,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// A module or quiz, viewed uniformly for category and search queries.
#[derive(Debug, Clone)]
pub enum ContentItem {
    Module(Arc<Module>),
    Quiz(Arc<Quiz>),
}

impl ContentItem {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Module(m) => m.id.as_str(),
            Self::Quiz(q) => q.id.as_str(),
        }
    }

    /// Index key; modules and quizzes live in separate id spaces.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Module(m) => format!("m:{}", m.id),
            Self::Quiz(q) => format!("q:{}", q.id),
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Module(m) => &m.title,
            Self::Quiz(q) => &q.title,
        }
    }

    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Module(m) => &m.description,
            Self::Quiz(q) => &q.description,
        }
    }

    #[must_use]
    pub fn legacy_category(&self) -> &str {
        match self {
            Self::Module(m) => &m.category,
            Self::Quiz(q) => &q.category,
        }
    }

    #[must_use]
    pub fn three_tier_category(&self) -> ThreeTierCategory {
        match self {
            Self::Module(m) => m.three_tier_category,
            Self::Quiz(q) => q.three_tier_category,
        }
    }

    #[must_use]
    pub fn category_mapping(&self) -> &CategoryMapping {
        match self {
            Self::Module(m) => &m.category_mapping,
            Self::Quiz(q) => &q.category_mapping,
        }
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        match self {
            Self::Module(m) => m.difficulty,
            Self::Quiz(q) => q.difficulty,
        }
    }

    /// Quizzes carry no own relevance; they rank as medium.
    #[must_use]
    pub fn exam_relevance(&self) -> ExamRelevance {
        match self {
            Self::Module(m) => m.exam_relevance,
            Self::Quiz(_) => ExamRelevance::Medium,
        }
    }

    #[must_use]
    pub fn tags(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::Module(m) => Some(&m.tags),
            Self::Quiz(_) => None,
        }
    }

    #[must_use]
    pub fn new_in_2025(&self) -> bool {
        match self {
            Self::Module(m) => m.new_in_2025,
            Self::Quiz(_) => false,
        }
    }

    /// Canonical result order: exam relevance desc, difficulty asc,
    /// title asc, id as final tie-break.
    #[must_use]
    pub fn order_key(&self) -> (u8, u8, String, String) {
        (
            self.exam_relevance().rank(),
            self.difficulty().rank(),
            self.title().to_string(),
            self.id().to_string(),
        )
    }
}

/// All derived lookup structures over one loaded corpus. Built once by
/// the loader; read-only afterwards.
#[derive(Default)]
pub struct ContentIndex {
    modules: BTreeMap<ModuleId, Arc<Module>>,
    quizzes: BTreeMap<QuizId, Arc<Quiz>>,
    paths: BTreeMap<LearningPathId, Arc<LearningPath>>,
    by_category: BTreeMap<ThreeTierCategory, Vec<ContentItem>>,
    by_legacy: BTreeMap<String, Vec<ContentItem>>,
    tokens: BTreeMap<String, BTreeSet<String>>,
    haystacks: BTreeMap<String, String>,
    module_quizzes: BTreeMap<ModuleId, BTreeSet<QuizId>>,
    category_catalog: Vec<String>,
    exam_changes: ExamChanges2025,
}

impl ContentIndex {
    pub(crate) fn insert_module(&mut self, module: Arc<Module>) {
        self.modules.insert(module.id.clone(), module);
    }

    pub(crate) fn insert_quiz(&mut self, quiz: Arc<Quiz>) {
        self.quizzes.insert(quiz.id.clone(), quiz);
    }

    pub(crate) fn insert_path(&mut self, path: Arc<LearningPath>) {
        self.paths.insert(path.id.clone(), path);
    }

    pub(crate) fn set_category_catalog(&mut self, catalog: Vec<String>) {
        self.category_catalog = catalog;
    }

    pub(crate) fn set_exam_changes(&mut self, changes: ExamChanges2025) {
        self.exam_changes = changes;
    }

    /// Rebuilds every derived structure from the record maps.
    pub(crate) fn rebuild_derived(&mut self) {
        self.by_category.clear();
        self.by_legacy.clear();
        self.tokens.clear();
        self.haystacks.clear();
        self.module_quizzes.clear();

        for item in self.all_items() {
            self.by_category
                .entry(item.three_tier_category())
                .or_default()
                .push(item.clone());
            self.by_legacy
                .entry(item.legacy_category().to_string())
                .or_default()
                .push(item.clone());

            let haystack = crate::search::item_haystack(&item);
            for token in crate::search::tokenize(&haystack) {
                self.tokens.entry(token).or_default().insert(item.key());
            }
            self.haystacks.insert(item.key(), haystack);
        }
        for bucket in self.by_category.values_mut() {
            bucket.sort_by_key(ContentItem::order_key);
        }
        for bucket in self.by_legacy.values_mut() {
            bucket.sort_by_key(ContentItem::order_key);
        }

        for quiz in self.quizzes.values() {
            self.module_quizzes
                .entry(quiz.module_id.clone())
                .or_default()
                .insert(quiz.id.clone());
        }
        for module in self.modules.values() {
            let entry = self.module_quizzes.entry(module.id.clone()).or_default();
            for quiz_id in &module.related_quizzes {
                entry.insert(quiz_id.clone());
            }
        }
    }

    #[must_use]
    pub fn module(&self, id: &ModuleId) -> Option<Arc<Module>> {
        self.modules.get(id).cloned()
    }

    #[must_use]
    pub fn quiz(&self, id: &QuizId) -> Option<Arc<Quiz>> {
        self.quizzes.get(id).cloned()
    }

    #[must_use]
    pub fn path(&self, id: &LearningPathId) -> Option<Arc<LearningPath>> {
        self.paths.get(id).cloned()
    }

    /// All modules, ordered by id.
    #[must_use]
    pub fn all_modules(&self) -> Vec<Arc<Module>> {
        self.modules.values().cloned().collect()
    }

    /// All quizzes, ordered by id.
    #[must_use]
    pub fn all_quizzes(&self) -> Vec<Arc<Quiz>> {
        self.quizzes.values().cloned().collect()
    }

    #[must_use]
    pub fn all_paths(&self) -> Vec<Arc<LearningPath>> {
        self.paths.values().cloned().collect()
    }

    #[must_use]
    pub fn all_items(&self) -> Vec<ContentItem> {
        let mut items: Vec<ContentItem> = self
            .modules
            .values()
            .map(|m| ContentItem::Module(m.clone()))
            .collect();
        items.extend(self.quizzes.values().map(|q| ContentItem::Quiz(q.clone())));
        items
    }

    #[must_use]
    pub fn content_by_category(&self, category: ThreeTierCategory) -> &[ContentItem] {
        self.by_category.get(&category).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn content_by_legacy_category(&self, legacy: &str) -> &[ContentItem] {
        self.by_legacy.get(legacy).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn quizzes_for_module(&self, module_id: &ModuleId) -> Vec<Arc<Quiz>> {
        self.module_quizzes
            .get(module_id)
            .into_iter()
            .flatten()
            .filter_map(|quiz_id| self.quizzes.get(quiz_id).cloned())
            .collect()
    }

    #[must_use]
    pub fn item_by_key(&self, key: &str) -> Option<ContentItem> {
        let (kind, id) = key.split_once(':')?;
        match kind {
            "m" => self
                .modules
                .get(&ModuleId::parse(id).ok()?)
                .map(|m| ContentItem::Module(m.clone())),
            "q" => self
                .quizzes
                .get(&QuizId::parse(id).ok()?)
                .map(|q| ContentItem::Quiz(q.clone())),
            _ => None,
        }
    }

    #[must_use]
    pub fn token_matches(&self, token: &str) -> Option<&BTreeSet<String>> {
        self.tokens.get(token)
    }

    /// Full inverted-index vocabulary: folded token → item keys.
    #[must_use]
    pub fn tokens(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.tokens
    }

    #[must_use]
    pub fn haystack(&self, key: &str) -> Option<&str> {
        self.haystacks.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn category_catalog(&self) -> &[String] {
        &self.category_catalog
    }

    #[must_use]
    pub fn exam_changes(&self) -> &ExamChanges2025 {
        &self.exam_changes
    }

    #[must_use]
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn quiz_count(&self) -> usize {
        self.quizzes.len()
    }
}
