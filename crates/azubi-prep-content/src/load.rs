// SPDX-License-Identifier: Apache-2.0

use crate::decode::{RawLearningPath, RawModule, RawQuestion, RawQuiz};
use crate::index::ContentIndex;
use crate::source::{ContentSource, ManifestSection, CATEGORIES_FILE, EXAM_CHANGES_FILE};
use azubi_prep_core::{Clock, EngineError, ErrorKind};
use azubi_prep_model::{
    map_to_three_tier, CategoryMapping, Difficulty, ExamChanges2025, ExamRelevance, LearningPath,
    LearningPathId, LoadReport, Milestone, Module, ModuleId, PathModule, PathQuiz, Question,
    QuestionId, Quiz, QuizId,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStage {
    Discover,
    Decode,
    Enrich,
    Index,
    Finalize,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadEvent {
    pub stage: LoadStage,
    pub name: String,
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Default, Clone)]
pub struct LoadLog {
    events: Vec<LoadEvent>,
}

impl LoadLog {
    pub fn emit(
        &mut self,
        stage: LoadStage,
        name: impl Into<String>,
        fields: BTreeMap<String, String>,
    ) {
        self.events.push(LoadEvent {
            stage,
            name: name.into(),
            fields,
        });
    }

    #[must_use]
    pub fn events(&self) -> &[LoadEvent] {
        &self.events
    }
}

fn count_fields(count: usize) -> BTreeMap<String, String> {
    BTreeMap::from([("count".to_string(), count.to_string())])
}

/// One fully loaded, enriched, indexed corpus.
pub struct LoadedCorpus {
    pub index: ContentIndex,
    pub report: LoadReport,
    pub log: LoadLog,
}

/// Runs the full pipeline: discover → decode → enrich → index →
/// finalize. Per-item integrity problems land in the report; only a
/// failing source aborts the load.
pub async fn load_corpus(
    source: &dyn ContentSource,
    clock: &dyn Clock,
) -> Result<LoadedCorpus, EngineError> {
    let mut report = LoadReport::default();
    let mut log = LoadLog::default();

    // Discover + decode, section by section. Only modules and quizzes
    // count as content items in the report.
    let raw_modules =
        decode_section::<RawModule>(source, ManifestSection::Modules, &mut report, true).await?;
    let raw_quizzes =
        decode_section::<RawQuiz>(source, ManifestSection::Quizzes, &mut report, true).await?;
    let raw_paths =
        decode_section::<RawLearningPath>(source, ManifestSection::LearningPaths, &mut report, false)
            .await?;
    log.emit(
        LoadStage::Discover,
        "documents",
        count_fields(report.total + raw_paths.len()),
    );
    log.emit(
        LoadStage::Decode,
        "decoded",
        count_fields(raw_modules.len() + raw_quizzes.len()),
    );

    let exam_changes = read_exam_changes(source, &mut report).await?;
    let category_catalog = read_category_catalog(source, &mut report).await?;

    // Enrich modules first; quizzes validate against their ids.
    let mut modules = enrich_modules(raw_modules, &exam_changes, clock, &mut report);
    let module_ids: BTreeSet<ModuleId> = modules.keys().cloned().collect();
    let quizzes = enrich_quizzes(raw_quizzes, &module_ids, clock, &mut report);
    let quiz_ids: BTreeSet<QuizId> = quizzes.keys().cloned().collect();

    prune_dangling_references(&mut modules, &module_ids, &quiz_ids, &mut report);
    break_prerequisite_cycles(&mut modules, &mut report);
    log.emit(LoadStage::Enrich, "modules", count_fields(modules.len()));
    log.emit(LoadStage::Enrich, "quizzes", count_fields(quizzes.len()));

    let paths = enrich_paths(raw_paths, &module_ids, &quiz_ids, &mut report);

    let mut index = ContentIndex::default();
    for module in modules.into_values() {
        index.insert_module(Arc::new(module));
    }
    for quiz in quizzes.into_values() {
        index.insert_quiz(Arc::new(quiz));
    }
    for path in paths {
        index.insert_path(Arc::new(path));
    }
    index.set_exam_changes(exam_changes);
    index.set_category_catalog(category_catalog);
    index.rebuild_derived();
    log.emit(
        LoadStage::Index,
        "indexed",
        count_fields(index.module_count() + index.quiz_count()),
    );

    report.loaded = index.module_count() + index.quiz_count();
    for category in azubi_prep_model::ThreeTierCategory::ALL {
        report
            .by_category
            .insert(category, index.content_by_category(category).len());
    }
    log.emit(LoadStage::Finalize, "report", count_fields(report.anomalies.len()));
    tracing::info!(
        loaded = report.loaded,
        dropped = report.dropped,
        warnings = report.warnings(),
        "content corpus loaded"
    );

    Ok(LoadedCorpus { index, report, log })
}

async fn decode_section<T: serde::de::DeserializeOwned>(
    source: &dyn ContentSource,
    section: ManifestSection,
    report: &mut LoadReport,
    count_in_total: bool,
) -> Result<Vec<(String, T)>, EngineError> {
    let names = source
        .list_documents(section)
        .await
        .map_err(|e| EngineError::new(ErrorKind::StorageFailure, e.to_string()))?;
    if count_in_total {
        report.total += names.len();
    }
    let mut decoded = Vec::with_capacity(names.len());
    for name in names {
        let body = source
            .read_document(section, &name)
            .await
            .map_err(|e| EngineError::new(ErrorKind::StorageFailure, e.to_string()))?;
        match serde_json::from_str::<T>(&body) {
            Ok(value) => decoded.push((name, value)),
            Err(e) => {
                report.record_drop(
                    format!("{}/{name}", section.dir_name()),
                    format!("malformed JSON: {e}"),
                );
            }
        }
    }
    Ok(decoded)
}

async fn read_exam_changes(
    source: &dyn ContentSource,
    report: &mut LoadReport,
) -> Result<ExamChanges2025, EngineError> {
    let Some(body) = source
        .read_metadata(EXAM_CHANGES_FILE)
        .await
        .map_err(|e| EngineError::new(ErrorKind::StorageFailure, e.to_string()))?
    else {
        return Ok(ExamChanges2025::default());
    };
    match serde_json::from_str(&body) {
        Ok(changes) => Ok(changes),
        Err(e) => {
            report.record_warning(EXAM_CHANGES_FILE, format!("malformed JSON: {e}"));
            Ok(ExamChanges2025::default())
        }
    }
}

async fn read_category_catalog(
    source: &dyn ContentSource,
    report: &mut LoadReport,
) -> Result<Vec<String>, EngineError> {
    let Some(body) = source
        .read_metadata(CATEGORIES_FILE)
        .await
        .map_err(|e| EngineError::new(ErrorKind::StorageFailure, e.to_string()))?
    else {
        return Ok(Vec::new());
    };
    match serde_json::from_str(&body) {
        Ok(catalog) => Ok(catalog),
        Err(e) => {
            report.record_warning(CATEGORIES_FILE, format!("malformed JSON: {e}"));
            Ok(Vec::new())
        }
    }
}

fn enrich_modules(
    raws: Vec<(String, RawModule)>,
    exam_changes: &ExamChanges2025,
    clock: &dyn Clock,
    report: &mut LoadReport,
) -> BTreeMap<ModuleId, Module> {
    let mut modules = BTreeMap::new();
    for (file, raw) in raws {
        let Ok(id) = ModuleId::parse(&raw.id) else {
            report.record_drop(file, format!("invalid module id {:?}", raw.id));
            continue;
        };
        if raw.title.trim().is_empty() {
            report.record_drop(id.as_str(), "module has no title");
            continue;
        }
        if modules.contains_key(&id) {
            report.record_drop(id.as_str(), "duplicate module id, first occurrence wins");
            continue;
        }

        let category = map_to_three_tier(raw.three_tier_category.as_deref(), &raw.category);
        let mapping = CategoryMapping::stamp(category, &raw.category, clock.now_ms());
        let new_in_2025 = raw.new_in_2025
            || exam_changes.new_topics.iter().any(|t| t == &raw.id || t == &raw.title);
        let removed_in_2025 = raw.removed_in_2025
            || exam_changes
                .removed_topics
                .iter()
                .any(|t| t == &raw.id || t == &raw.title);

        let mut prerequisites = Vec::new();
        for prereq in &raw.prerequisites {
            match ModuleId::parse(prereq) {
                Ok(prereq_id) if prereq_id != id => prerequisites.push(prereq_id),
                _ => report.record_warning(
                    id.as_str(),
                    format!("dropping invalid prerequisite {prereq:?}"),
                ),
            }
        }
        let mut related_quizzes = BTreeSet::new();
        for quiz in &raw.related_quizzes {
            match QuizId::parse(quiz) {
                Ok(quiz_id) => {
                    related_quizzes.insert(quiz_id);
                }
                Err(_) => report.record_warning(
                    id.as_str(),
                    format!("dropping invalid related quiz id {quiz:?}"),
                ),
            }
        }

        modules.insert(
            id.clone(),
            Module {
                id,
                title: raw.title,
                description: raw.description,
                content: raw.content,
                category: raw.category,
                three_tier_category: category,
                category_mapping: mapping,
                difficulty: raw.difficulty.unwrap_or(Difficulty::Beginner),
                exam_relevance: raw.exam_relevance.unwrap_or(ExamRelevance::Medium),
                estimated_time: raw.estimated_time,
                tags: raw.tags.into_iter().collect(),
                prerequisites,
                related_quizzes,
                new_in_2025,
                removed_in_2025,
                important: raw.important,
                code_examples: raw.code_examples,
            },
        );
    }
    modules
}

fn enrich_quizzes(
    raws: Vec<(String, RawQuiz)>,
    module_ids: &BTreeSet<ModuleId>,
    clock: &dyn Clock,
    report: &mut LoadReport,
) -> BTreeMap<QuizId, Quiz> {
    let mut quizzes = BTreeMap::new();
    for (file, raw) in raws {
        let Ok(id) = QuizId::parse(&raw.id) else {
            report.record_drop(file, format!("invalid quiz id {:?}", raw.id));
            continue;
        };
        if raw.title.trim().is_empty() {
            report.record_drop(id.as_str(), "quiz has no title");
            continue;
        }
        if quizzes.contains_key(&id) {
            report.record_drop(id.as_str(), "duplicate quiz id, first occurrence wins");
            continue;
        }
        let Ok(module_id) = ModuleId::parse(&raw.module_id) else {
            report.record_drop(id.as_str(), format!("invalid moduleId {:?}", raw.module_id));
            continue;
        };
        if !module_ids.contains(&module_id) {
            report.record_drop(id.as_str(), format!("moduleId {module_id} does not exist"));
            continue;
        }

        let mut passing_score = raw.passing_score;
        if passing_score > 100 {
            report.record_warning(
                id.as_str(),
                format!("passingScore {passing_score} clamped to 100"),
            );
            passing_score = 100;
        }

        let mut questions = Vec::new();
        for raw_question in raw.questions {
            match enrich_question(raw_question) {
                Ok(question) => questions.push(question),
                Err(reason) => report.record_warning(id.as_str(), reason),
            }
        }
        if questions.is_empty() {
            report.record_drop(id.as_str(), "quiz has no valid questions");
            continue;
        }

        let category = map_to_three_tier(raw.three_tier_category.as_deref(), &raw.category);
        let mapping = CategoryMapping::stamp(category, &raw.category, clock.now_ms());
        quizzes.insert(
            id.clone(),
            Quiz {
                id,
                module_id,
                title: raw.title,
                description: raw.description,
                category: raw.category,
                three_tier_category: category,
                category_mapping: mapping,
                difficulty: raw.difficulty.unwrap_or(Difficulty::Beginner),
                time_limit: raw.time_limit.filter(|t| *t > 0),
                passing_score: passing_score as u8,
                questions,
            },
        );
    }
    quizzes
}

fn enrich_question(raw: RawQuestion) -> Result<Question, String> {
    let id = QuestionId::parse(&raw.id)
        .map_err(|_| format!("dropping question with invalid id {:?}", raw.id))?;
    if raw.question.trim().is_empty() {
        return Err(format!("dropping question {id} without text"));
    }
    if raw.kind.requires_options() && raw.options.len() < 2 {
        return Err(format!("dropping {} question {id} with fewer than 2 options", raw.kind));
    }
    if raw.points == 0 {
        return Err(format!("dropping question {id} with zero points"));
    }
    Ok(Question {
        id,
        kind: raw.kind,
        question: raw.question,
        code: raw.code,
        language: raw.language,
        options: raw.options,
        correct_answer: raw.correct_answer,
        points: raw.points,
        explanation: raw.explanation,
    })
}

fn prune_dangling_references(
    modules: &mut BTreeMap<ModuleId, Module>,
    module_ids: &BTreeSet<ModuleId>,
    quiz_ids: &BTreeSet<QuizId>,
    report: &mut LoadReport,
) {
    for module in modules.values_mut() {
        let before = module.prerequisites.len();
        module.prerequisites.retain(|p| module_ids.contains(p));
        if module.prerequisites.len() != before {
            report.record_warning(
                module.id.as_str(),
                "dropped prerequisites referencing unknown modules",
            );
        }
        let before = module.related_quizzes.len();
        module.related_quizzes.retain(|q| quiz_ids.contains(q));
        if module.related_quizzes.len() != before {
            report.record_warning(
                module.id.as_str(),
                "dropped related quizzes referencing unknown quizzes",
            );
        }
    }
}

/// Depth-first scan over the prerequisite graph; any edge closing a
/// cycle is removed so that downstream traversals always terminate.
fn break_prerequisite_cycles(modules: &mut BTreeMap<ModuleId, Module>, report: &mut LoadReport) {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }

    let ids: Vec<ModuleId> = modules.keys().cloned().collect();
    let mut marks: BTreeMap<ModuleId, Mark> = BTreeMap::new();
    let mut broken: Vec<(ModuleId, ModuleId)> = Vec::new();

    fn visit(
        id: &ModuleId,
        modules: &BTreeMap<ModuleId, Module>,
        marks: &mut BTreeMap<ModuleId, Mark>,
        broken: &mut Vec<(ModuleId, ModuleId)>,
    ) {
        marks.insert(id.clone(), Mark::Visiting);
        if let Some(module) = modules.get(id) {
            for prereq in &module.prerequisites {
                match marks.get(prereq) {
                    Some(Mark::Visiting) => broken.push((id.clone(), prereq.clone())),
                    Some(Mark::Done) => {}
                    None => visit(prereq, modules, marks, broken),
                }
            }
        }
        marks.insert(id.clone(), Mark::Done);
    }

    for id in &ids {
        if !marks.contains_key(id) {
            visit(id, modules, &mut marks, &mut broken);
        }
    }

    for (from, to) in broken {
        if let Some(module) = modules.get_mut(&from) {
            module.prerequisites.retain(|p| p != &to);
            report.record_warning(
                from.as_str(),
                format!("prerequisite cycle broken by dropping edge to {to}"),
            );
            tracing::warn!(module = from.as_str(), prerequisite = to.as_str(), "prerequisite cycle broken");
        }
    }
}

fn enrich_paths(
    raws: Vec<(String, RawLearningPath)>,
    module_ids: &BTreeSet<ModuleId>,
    quiz_ids: &BTreeSet<QuizId>,
    report: &mut LoadReport,
) -> Vec<LearningPath> {
    let mut paths = Vec::new();
    let mut seen = BTreeSet::new();
    for (file, raw) in raws {
        let Ok(id) = LearningPathId::parse(&raw.id) else {
            report.record_warning(file, format!("invalid learning path id {:?}", raw.id));
            continue;
        };
        if !seen.insert(id.clone()) {
            report.record_warning(id.as_str(), "duplicate learning path id, first occurrence wins");
            continue;
        }

        let mut modules = Vec::new();
        for entry in raw.modules {
            match ModuleId::parse(&entry.module_id) {
                Ok(module_id) if module_ids.contains(&module_id) => modules.push(PathModule {
                    module_id,
                    order: entry.order,
                    required: entry.required,
                }),
                _ => report.record_warning(
                    id.as_str(),
                    format!("dropping path module entry {:?}", entry.module_id),
                ),
            }
        }
        let mut quizzes = Vec::new();
        for entry in raw.quizzes {
            match QuizId::parse(&entry.quiz_id) {
                Ok(quiz_id) if quiz_ids.contains(&quiz_id) => {
                    let unlock_after_modules = entry
                        .unlock_after_modules
                        .iter()
                        .filter_map(|m| ModuleId::parse(m).ok())
                        .filter(|m| module_ids.contains(m))
                        .collect();
                    quizzes.push(PathQuiz {
                        quiz_id,
                        order: entry.order,
                        required: entry.required,
                        unlock_after_modules,
                    });
                }
                _ => report.record_warning(
                    id.as_str(),
                    format!("dropping path quiz entry {:?}", entry.quiz_id),
                ),
            }
        }
        let milestones = raw
            .milestones
            .into_iter()
            .map(|m| Milestone {
                title: m.title,
                description: m.description,
                required_modules: m
                    .required_modules
                    .iter()
                    .filter_map(|id| ModuleId::parse(id).ok())
                    .collect(),
                required_quizzes: m
                    .required_quizzes
                    .iter()
                    .filter_map(|id| QuizId::parse(id).ok())
                    .collect(),
            })
            .collect();

        paths.push(LearningPath {
            id,
            title: raw.title,
            description: raw.description,
            difficulty: raw.difficulty.unwrap_or(Difficulty::Beginner),
            estimated_duration: raw.estimated_duration,
            modules,
            quizzes,
            milestones,
        });
    }
    paths
}
