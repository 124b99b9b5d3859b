// SPDX-License-Identifier: Apache-2.0

//! Boot-order and end-to-end behavior of the assembled engine.

use azubi_prep_api::App;
use azubi_prep_content::{ManifestSection, MemorySource, RecommendOptions};
use azubi_prep_core::FixedClock;
use azubi_prep_migrate::SOURCE_STRUCTURE;
use azubi_prep_model::{ModuleId, ProgressState, QuizAttempt, QuizId, Specialization, ThreeTierCategory};
use azubi_prep_progress::{StateEvent, StateKey};
use azubi_prep_store::{MemoryBackend, StoreBackend};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn module_json(id: &str, category: &str, prerequisites: &[&str]) -> String {
    let prereqs: Vec<String> = prerequisites.iter().map(|p| format!("\"{p}\"")).collect();
    format!(
        r#"{{
            "id": "{id}",
            "title": "Modul {id}",
            "description": "",
            "content": "",
            "category": "{category}",
            "difficulty": "beginner",
            "examRelevance": "high",
            "estimatedTime": 30,
            "prerequisites": [{}]
        }}"#,
        prereqs.join(", ")
    )
}

fn quiz_json(id: &str, module_id: &str, category: &str) -> String {
    format!(
        r#"{{
            "id": "{id}",
            "moduleId": "{module_id}",
            "title": "Quiz {id}",
            "description": "",
            "category": "{category}",
            "difficulty": "beginner",
            "passingScore": 70,
            "questions": [
                {{
                    "id": "q1",
                    "type": "true-false",
                    "question": "x?",
                    "correctAnswer": "true"
                }}
            ]
        }}"#
    )
}

fn source() -> MemorySource {
    MemorySource::new()
        .with_document(
            ManifestSection::Modules,
            "fue-01-planning.json",
            module_json("fue-01-planning", "FÜ-01", &[]),
        )
        .with_document(
            ManifestSection::Modules,
            "bp-ae-01-basics.json",
            module_json("bp-ae-01-basics", "BP-AE-01", &[]),
        )
        .with_document(
            ManifestSection::Modules,
            "bp-ae-02-oop.json",
            module_json("bp-ae-02-oop", "BP-AE-02", &["bp-ae-01-basics"]),
        )
        .with_document(
            ManifestSection::Modules,
            "bp-dpa-01-er-modeling.json",
            module_json("bp-dpa-01-er-modeling", "BP-DPA-01", &[]),
        )
        .with_document(
            ManifestSection::Quizzes,
            "fue-01-planning-quiz.json",
            quiz_json("fue-01-planning-quiz", "fue-01-planning", "FÜ-01"),
        )
}

fn module(id: &str) -> ModuleId {
    ModuleId::parse(id).expect("valid id")
}

/// Persisted pre-migration progress, as an older build would have
/// written it.
async fn seed_legacy_progress(backend: &MemoryBackend) {
    let mut progress = ProgressState::default();
    progress.modules_completed.insert(module("fue-01-planning"));
    progress.modules_completed.insert(module("bp-ae-01-basics"));
    progress.quiz_attempts.push(QuizAttempt {
        quiz_id: QuizId::parse("fue-01-planning-quiz").expect("valid id"),
        score: 80,
        passed: true,
        answers: BTreeMap::new(),
        date_ms: 1_600_000_000_000,
        duration_ms: 90_000,
    });
    progress.last_activity_ms = 1_600_000_000_000;
    backend
        .write(
            "azubi:progress",
            &serde_json::to_string(&progress).expect("encode"),
        )
        .await
        .expect("seed");
}

#[tokio::test]
async fn boot_migrates_legacy_progress_exactly_once() {
    let backend = Arc::new(MemoryBackend::new());
    seed_legacy_progress(&backend).await;
    let clock = Arc::new(FixedClock::at(1_700_000_000_000));

    let app = App::initialize(backend.clone(), Arc::new(source()), clock.clone())
        .await
        .expect("boot");
    assert!(app.boot_migration.success);
    assert!(!app.boot_migration.already_migrated);

    let live = app.state.progress();
    let info = live.migration_info.as_ref().expect("stamped");
    assert_eq!(info.source_structure, SOURCE_STRUCTURE);

    // Scenario: the FÜ module lands in the allgemein bucket.
    let buckets = app
        .progress_with_three_tier_categories()
        .await
        .expect("buckets");
    assert!(buckets[&ThreeTierCategory::Allgemein]
        .modules_completed
        .contains(&module("fue-01-planning")));

    // A second boot over the same backend is a no-op.
    let second = App::initialize(backend, Arc::new(source()), clock)
        .await
        .expect("second boot");
    assert!(second.boot_migration.already_migrated);
}

#[tokio::test]
async fn boot_without_progress_serves_queries_immediately() {
    let app = App::initialize(
        Arc::new(MemoryBackend::new()),
        Arc::new(source()),
        Arc::new(FixedClock::at(1_000)),
    )
    .await
    .expect("boot");

    assert!(!app.boot_migration.already_migrated);
    assert!(app.boot_migration.migration_id.is_none());

    assert_eq!(app.content.all_modules().await.expect("modules").len(), 4);
    assert_eq!(app.specialization.current(), Specialization::Anwendungsentwicklung);
    assert!(!app.specialization.has_selected());

    let report = app.content.validate().await.expect("validation");
    assert!(report.is_valid);
}

#[tokio::test]
async fn recommendations_for_a_started_user_are_ranked_and_fresh() {
    let backend = Arc::new(MemoryBackend::new());
    seed_legacy_progress(&backend).await;
    let app = App::initialize(backend, Arc::new(source()), Arc::new(FixedClock::at(2_000)))
        .await
        .expect("boot");

    let completed: BTreeSet<ModuleId> =
        [module("fue-01-planning"), module("bp-ae-01-basics")].into();
    let recommendations = app
        .content
        .recommendations(
            Specialization::Anwendungsentwicklung,
            &completed,
            &RecommendOptions {
                max_results: 10,
                ..RecommendOptions::default()
            },
        )
        .await
        .expect("recommendations");

    assert!(!recommendations.is_empty());
    for recommendation in &recommendations {
        assert!(recommendation.score >= 0.0);
        assert!(!recommendation.reasons.is_empty());
        assert!(!completed.contains(&recommendation.module.id));
    }
    for pair in recommendations.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn specialization_change_publishes_and_reweights() {
    let app = App::initialize(
        Arc::new(MemoryBackend::new()),
        Arc::new(source()),
        Arc::new(FixedClock::at(1_000)),
    )
    .await
    .expect("boot");

    let events = Arc::new(AtomicUsize::new(0));
    let sink = events.clone();
    app.state.subscribe(StateKey::Specialization, move |event| {
        if let StateEvent::SpecializationChanged {
            specialization_id,
            update_categories,
        } = event
        {
            assert_eq!(*specialization_id, Specialization::DatenProzessanalyse);
            assert!(*update_categories);
            sink.fetch_add(1, Ordering::SeqCst);
        }
    });

    app.specialization
        .set(Specialization::DatenProzessanalyse)
        .await
        .expect("set");
    assert_eq!(events.load(Ordering::SeqCst), 1);
    assert_eq!(
        app.specialization
            .category_relevance(ThreeTierCategory::DatenProzessanalyse),
        azubi_prep_model::Relevance::High
    );

    // The progress read models immediately follow the new track.
    let overall = app.progress.overall_progress().await.expect("overall");
    assert_eq!(
        overall.category_breakdown[&ThreeTierCategory::DatenProzessanalyse].relevance,
        azubi_prep_model::Relevance::High
    );
}

#[tokio::test]
async fn wheel_module_key_is_reserved_but_untouched() {
    let backend = Arc::new(MemoryBackend::new());
    backend
        .write("azubi:lastWheelModule", "\"bp-ae-01-basics\"")
        .await
        .expect("seed");

    let app = App::initialize(backend.clone(), Arc::new(source()), Arc::new(FixedClock::at(1_000)))
        .await
        .expect("boot");
    app.progress
        .mark_module_complete(&module("bp-ae-02-oop"))
        .await
        .expect("complete");

    assert_eq!(
        backend.read("azubi:lastWheelModule").await.expect("read"),
        Some("\"bp-ae-01-basics\"".to_string()),
        "core never writes the wheel key"
    );
}
