// SPDX-License-Identifier: Apache-2.0

use crate::reports::{
    CategoryProgress, ExamReadiness, LegacyCategoryProgress, MainCategory, OverallProgress,
    ReadinessBreakdown, ReadinessLevel, ReadinessStatistics, Severity, WeakArea, WeakAreaKind,
};
use crate::specialization::SpecializationService;
use crate::state::StateStore;
use azubi_prep_content::{ContentService, RecommendOptions, Recommendation};
use azubi_prep_core::{Clock, EngineError, ErrorKind, WriteOutcome};
use azubi_prep_model::{
    relevance_for, ExamRelevance, Module, ModuleId, ProgressState, Quiz, QuizAttempt, QuizId,
    Relevance, ThreeTierCategory, PROGRESS_SCHEMA_VERSION,
};
use azubi_prep_store::{keys, StorageAdapter};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// All mutations of the progress state, and the read models derived
/// from it.
///
/// Mutations are staged on a copy, persisted, and only then swapped
/// into the state store, so a storage failure leaves the live record
/// untouched.
pub struct ProgressService {
    adapter: StorageAdapter,
    state: Arc<StateStore>,
    content: Arc<ContentService>,
    specialization: Arc<SpecializationService>,
    clock: Arc<dyn Clock>,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        adapter: StorageAdapter,
        state: Arc<StateStore>,
        content: Arc<ContentService>,
        specialization: Arc<SpecializationService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            adapter,
            state,
            content,
            specialization,
            clock,
        }
    }

    /// Restores persisted progress into the state store, silently.
    pub async fn rehydrate(&self) -> Result<(), EngineError> {
        let stored: Option<ProgressState> = self
            .adapter
            .get_json(keys::PROGRESS)
            .await
            .map_err(|e| EngineError::new(ErrorKind::StorageFailure, e.to_string()))?;
        if let Some(progress) = stored {
            let mut snapshot = self.state.snapshot();
            snapshot.progress = progress;
            self.state.rehydrate(snapshot);
        }
        Ok(())
    }

    async fn persist_and_publish(&self, progress: ProgressState) -> Result<(), EngineError> {
        self.adapter
            .put_json(keys::PROGRESS, &progress)
            .await
            .map_err(|e| EngineError::new(ErrorKind::StorageFailure, e.to_string()))?;
        self.state.update_progress(progress);
        Ok(())
    }

    pub async fn mark_module_complete(&self, id: &ModuleId) -> Result<WriteOutcome, EngineError> {
        if self.content.module_by_id(id).await?.is_none() {
            return Err(EngineError::new(
                ErrorKind::NotFound,
                format!("unknown module {id}"),
            ));
        }
        let mut progress = self.state.progress();
        if progress.modules_completed.contains(id) {
            return Ok(WriteOutcome::ok(format!("module {id} already complete")));
        }
        progress.modules_in_progress.remove(id);
        progress.modules_completed.insert(id.clone());
        progress.last_activity_ms = self.clock.now_ms();
        self.persist_and_publish(progress).await?;
        Ok(WriteOutcome::ok(format!("module {id} marked complete")))
    }

    /// Moves a completed module back to in-progress.
    pub async fn mark_module_incomplete(&self, id: &ModuleId) -> Result<WriteOutcome, EngineError> {
        if self.content.module_by_id(id).await?.is_none() {
            return Err(EngineError::new(
                ErrorKind::NotFound,
                format!("unknown module {id}"),
            ));
        }
        let mut progress = self.state.progress();
        if !progress.modules_completed.remove(id) {
            return Ok(WriteOutcome::ok(format!("module {id} was not complete")));
        }
        progress.modules_in_progress.insert(id.clone());
        progress.last_activity_ms = self.clock.now_ms();
        self.persist_and_publish(progress).await?;
        Ok(WriteOutcome::ok(format!("module {id} marked incomplete")))
    }

    pub async fn save_quiz_attempt(
        &self,
        quiz_id: &QuizId,
        score: u32,
        answers: BTreeMap<String, Vec<String>>,
        duration_ms: u64,
    ) -> Result<WriteOutcome, EngineError> {
        if score > 100 {
            return Err(EngineError::new(
                ErrorKind::InvalidInput,
                format!("score {score} is not a percentage"),
            ));
        }
        let Some(quiz) = self.content.quiz_by_id(quiz_id).await? else {
            return Err(EngineError::new(
                ErrorKind::NotFound,
                format!("unknown quiz {quiz_id}"),
            ));
        };

        let score = score as u8;
        let passed = score >= quiz.passing_score;
        let mut progress = self.state.progress();
        let now = self.clock.now_ms();
        progress.quiz_attempts.push(QuizAttempt {
            quiz_id: quiz_id.clone(),
            score,
            passed,
            answers,
            date_ms: now,
            duration_ms,
        });
        progress.last_activity_ms = now;
        self.persist_and_publish(progress).await?;
        Ok(WriteOutcome::ok(if passed {
            format!("quiz {quiz_id} passed with {score}%")
        } else {
            format!("quiz {quiz_id} attempted with {score}%")
        }))
    }

    #[must_use]
    pub fn is_module_completed(&self, id: &ModuleId) -> bool {
        self.state.progress().modules_completed.contains(id)
    }

    /// A quiz counts as completed once any attempt passed it.
    #[must_use]
    pub fn is_quiz_completed(&self, id: &QuizId) -> bool {
        self.state
            .progress()
            .quiz_attempts
            .iter()
            .any(|a| &a.quiz_id == id && a.passed)
    }

    #[must_use]
    pub fn best_score(&self, id: &QuizId) -> Option<u8> {
        self.state.progress().best_score(id)
    }

    /// Portable JSON document of the whole progress state.
    #[must_use]
    pub fn export_progress(&self) -> serde_json::Value {
        serde_json::json!({
            "schemaVersion": PROGRESS_SCHEMA_VERSION,
            "exportedAtMs": self.clock.now_ms(),
            "progress": self.state.progress(),
        })
    }

    pub async fn recommended_modules(
        &self,
        limit: usize,
    ) -> Result<Vec<Recommendation>, EngineError> {
        let completed = self.state.progress().modules_completed;
        self.content
            .recommendations(
                self.specialization.current(),
                &completed,
                &RecommendOptions {
                    max_results: limit,
                    ..RecommendOptions::default()
                },
            )
            .await
    }

    pub async fn overall_progress(&self) -> Result<OverallProgress, EngineError> {
        let progress = self.state.progress();
        let modules = self.content.all_modules().await?;
        let quizzes = self.content.all_quizzes().await?;
        let spec = self.specialization.current();

        let breakdown = category_breakdown(&progress, &modules, &quizzes, spec);
        let overall_percentage = weighted_percentage(&breakdown);

        let attempts = &progress.quiz_attempts;
        let average_quiz_score = if attempts.is_empty() {
            0
        } else {
            (attempts.iter().map(|a| u32::from(a.score)).sum::<u32>()
                / attempts.len() as u32) as u8
        };

        Ok(OverallProgress {
            modules_completed: progress.modules_completed.len(),
            total_modules: modules.len(),
            quizzes_taken: progress.attempted_quizzes().len(),
            average_quiz_score,
            overall_percentage,
            last_activity_ms: progress.last_activity_ms,
            category_breakdown: breakdown,
        })
    }

    /// Progress per legacy IHK category code, for the classic exam
    /// structure view.
    pub async fn progress_by_category(&self) -> Result<Vec<LegacyCategoryProgress>, EngineError> {
        let progress = self.state.progress();
        let modules = self.content.all_modules().await?;

        let mut by_code: BTreeMap<String, Vec<&Arc<Module>>> = BTreeMap::new();
        for module in &modules {
            by_code.entry(module.category.clone()).or_default().push(module);
        }

        Ok(by_code
            .into_iter()
            .map(|(category, members)| {
                let total = members.len();
                let completed = members
                    .iter()
                    .filter(|m| progress.modules_completed.contains(&m.id))
                    .count();
                let in_progress = members
                    .iter()
                    .filter(|m| progress.modules_in_progress.contains(&m.id))
                    .count();
                // The category inherits its most relevant module.
                let exam_relevance = members
                    .iter()
                    .map(|m| m.exam_relevance)
                    .min_by_key(|r| r.rank())
                    .unwrap_or(ExamRelevance::Low);
                LegacyCategoryProgress {
                    main_category: MainCategory::of_legacy_code(&category),
                    category,
                    completed,
                    in_progress,
                    total,
                    completion_percentage: percentage(completed, total),
                    exam_relevance,
                }
            })
            .collect())
    }

    pub async fn weak_areas(&self) -> Result<Vec<WeakArea>, EngineError> {
        let progress = self.state.progress();
        let modules = self.content.all_modules().await?;
        let quizzes = self.content.all_quizzes().await?;
        let spec = self.specialization.current();
        let mut areas = Vec::new();

        // Quizzes attempted at least twice with a poor average.
        let mut attempts_by_quiz: BTreeMap<&QuizId, Vec<u8>> = BTreeMap::new();
        for attempt in &progress.quiz_attempts {
            attempts_by_quiz.entry(&attempt.quiz_id).or_default().push(attempt.score);
        }
        for (quiz_id, scores) in attempts_by_quiz {
            if scores.len() < 2 {
                continue;
            }
            let average = scores.iter().map(|s| u32::from(*s)).sum::<u32>() / scores.len() as u32;
            if average < 60 {
                areas.push(WeakArea {
                    kind: WeakAreaKind::QuizPerformance,
                    severity: if average < 40 { Severity::High } else { Severity::Medium },
                    subject: quiz_id.to_string(),
                    recommendation: format!(
                        "Durchschnitt {average}% nach {} Versuchen. Wiederhole das zugehörige Modul vor dem nächsten Anlauf.",
                        scores.len()
                    ),
                });
            }
        }

        // High-relevance categories lagging behind.
        let breakdown = category_breakdown(&progress, &modules, &quizzes, spec);
        for (category, stats) in &breakdown {
            if relevance_for(*category, spec) != Relevance::High {
                continue;
            }
            if stats.total_modules > 0 && stats.completion_percentage < 40 {
                areas.push(WeakArea {
                    kind: WeakAreaKind::IncompleteCategory,
                    severity: if stats.completion_percentage < 20 {
                        Severity::High
                    } else {
                        Severity::Medium
                    },
                    subject: category.to_string(),
                    recommendation: format!(
                        "Nur {}% in deiner prüfungsrelevanten Kategorie. Plane hier die nächsten Module ein.",
                        stats.completion_percentage
                    ),
                });
            }
        }

        // 2025 catalog additions not yet covered.
        let open_new_topics = modules
            .iter()
            .filter(|m| m.new_in_2025 && !progress.modules_completed.contains(&m.id))
            .count();
        if open_new_topics > 0 {
            areas.push(WeakArea {
                kind: WeakAreaKind::NewTopics2025,
                severity: if open_new_topics > 3 { Severity::High } else { Severity::Medium },
                subject: open_new_topics.to_string(),
                recommendation: format!(
                    "{open_new_topics} neue Prüfungsthemen 2025 sind noch offen."
                ),
            });
        }

        Ok(areas)
    }

    pub async fn exam_readiness(&self) -> Result<ExamReadiness, EngineError> {
        let progress = self.state.progress();
        let modules = self.content.all_modules().await?;
        let quizzes = self.content.all_quizzes().await?;
        let spec = self.specialization.current();

        let breakdown_by_category = category_breakdown(&progress, &modules, &quizzes, spec);
        let module_readiness = weighted_module_percentage(&breakdown_by_category);

        let attempted = progress.attempted_quizzes();
        let quizzes_passed = quizzes.iter().filter(|q| {
            progress
                .quiz_attempts
                .iter()
                .any(|a| a.quiz_id == q.id && a.passed)
        });
        let best_scores: Vec<u8> = attempted
            .iter()
            .filter_map(|id| progress.best_score(id))
            .collect();
        let quiz_readiness = if quizzes.is_empty() || best_scores.is_empty() {
            0
        } else {
            let average_best =
                best_scores.iter().map(|s| u32::from(*s)).sum::<u32>() / best_scores.len() as u32;
            let coverage = attempted.len() as f64 / quizzes.len() as f64;
            (average_best as f64 * coverage).round() as u8
        };

        let new_topics_total = modules.iter().filter(|m| m.new_in_2025).count();
        let new_topics_completed = modules
            .iter()
            .filter(|m| m.new_in_2025 && progress.modules_completed.contains(&m.id))
            .count();
        let new_topics_readiness = if new_topics_total == 0 {
            100
        } else {
            percentage(new_topics_completed, new_topics_total)
        };

        // Dimensions without content drop out of the weighting instead
        // of dragging the score to zero.
        let mut weighted = f64::from(module_readiness) * 0.4;
        let mut weight_sum = 0.4;
        if !quizzes.is_empty() {
            weighted += f64::from(quiz_readiness) * 0.4;
            weight_sum += 0.4;
        }
        if new_topics_total > 0 {
            weighted += f64::from(new_topics_readiness) * 0.2;
            weight_sum += 0.2;
        }
        let overall = (weighted / weight_sum).round() as u8;
        let level = ReadinessLevel::of_score(overall);

        Ok(ExamReadiness {
            overall_readiness: overall,
            readiness_level: level,
            breakdown: ReadinessBreakdown {
                module_readiness,
                quiz_readiness,
                new_topics_readiness,
            },
            statistics: ReadinessStatistics {
                modules_completed: progress.modules_completed.len(),
                total_modules: modules.len(),
                quizzes_passed: quizzes_passed.count(),
                quizzes_attempted: attempted.len(),
                total_quizzes: quizzes.len(),
                new_topics_completed,
                new_topics_total,
            },
            recommendation: readiness_recommendation(level).to_string(),
        })
    }
}

fn percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        0
    } else {
        ((part as f64 / whole as f64) * 100.0).round() as u8
    }
}

fn category_breakdown(
    progress: &ProgressState,
    modules: &[Arc<Module>],
    quizzes: &[Arc<Quiz>],
    spec: azubi_prep_model::Specialization,
) -> BTreeMap<ThreeTierCategory, CategoryProgress> {
    let passed: BTreeSet<&QuizId> = progress
        .quiz_attempts
        .iter()
        .filter(|a| a.passed)
        .map(|a| &a.quiz_id)
        .collect();

    let mut breakdown: BTreeMap<ThreeTierCategory, CategoryProgress> = BTreeMap::new();
    for category in ThreeTierCategory::ALL {
        breakdown.insert(
            category,
            CategoryProgress {
                relevance: relevance_for(category, spec),
                ..CategoryProgress::default()
            },
        );
    }
    for module in modules {
        let entry = breakdown.entry(module.three_tier_category).or_default();
        entry.total_modules += 1;
        if progress.modules_completed.contains(&module.id) {
            entry.modules_completed += 1;
        }
    }
    for quiz in quizzes {
        let entry = breakdown.entry(quiz.three_tier_category).or_default();
        entry.total_quizzes += 1;
        if passed.contains(&quiz.id) {
            entry.quizzes_passed += 1;
        }
    }
    for entry in breakdown.values_mut() {
        let mut parts = Vec::new();
        if entry.total_modules > 0 {
            parts.push(entry.modules_completed as f64 / entry.total_modules as f64);
        }
        if entry.total_quizzes > 0 {
            parts.push(entry.quizzes_passed as f64 / entry.total_quizzes as f64);
        }
        let completion = if parts.is_empty() {
            0.0
        } else {
            parts.iter().sum::<f64>() / parts.len() as f64
        };
        entry.completion_percentage = (completion * 100.0).round() as u8;
    }
    breakdown
}

/// Relevance-weighted mean of per-category completion.
fn weighted_percentage(breakdown: &BTreeMap<ThreeTierCategory, CategoryProgress>) -> u8 {
    let mut weighted = 0.0;
    let mut weight_sum = 0.0;
    for entry in breakdown.values() {
        if entry.total_modules == 0 && entry.total_quizzes == 0 {
            continue;
        }
        let weight = entry.relevance.weight();
        weighted += f64::from(entry.completion_percentage) * weight;
        weight_sum += weight;
    }
    if weight_sum == 0.0 {
        0
    } else {
        (weighted / weight_sum).round() as u8
    }
}

/// Like [`weighted_percentage`] but over module completion only.
fn weighted_module_percentage(breakdown: &BTreeMap<ThreeTierCategory, CategoryProgress>) -> u8 {
    let mut weighted = 0.0;
    let mut weight_sum = 0.0;
    for entry in breakdown.values() {
        if entry.total_modules == 0 {
            continue;
        }
        let weight = entry.relevance.weight();
        weighted += (entry.modules_completed as f64 / entry.total_modules as f64) * 100.0 * weight;
        weight_sum += weight;
    }
    if weight_sum == 0.0 {
        0
    } else {
        (weighted / weight_sum).round() as u8
    }
}

const fn readiness_recommendation(level: ReadinessLevel) -> &'static str {
    match level {
        ReadinessLevel::Excellent => {
            "Sehr gut vorbereitet. Halte das Niveau mit gezielten Wiederholungen."
        }
        ReadinessLevel::Good => {
            "Gute Basis. Schließe die verbleibenden Lücken in den prüfungsrelevanten Kategorien."
        }
        ReadinessLevel::Moderate => {
            "Solider Zwischenstand. Konzentriere dich auf die Kategorien mit hoher Relevanz."
        }
        ReadinessLevel::NeedsImprovement => {
            "Deutliche Lücken. Arbeite die Grundlagenmodule deiner Fachrichtung durch."
        }
        ReadinessLevel::Insufficient => {
            "Starte mit den Grundlagenmodulen und wiederhole jedes Quiz bis zum Bestehen."
        }
    }
}
