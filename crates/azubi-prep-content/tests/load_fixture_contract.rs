// SPDX-License-Identifier: Apache-2.0

//! Contract tests over a fixture manifest directory on disk.

use azubi_prep_content::{ContentService, DirSource, SearchFilters};
use azubi_prep_core::FixedClock;
use azubi_prep_model::{ModuleId, QuizId, ThreeTierCategory};
use std::path::Path;
use std::sync::Arc;

fn write_fixture(root: &Path) {
    let modules = root.join("modules");
    let quizzes = root.join("quizzes");
    let paths = root.join("learning-paths");
    let metadata = root.join("metadata");
    for dir in [&modules, &quizzes, &paths, &metadata] {
        std::fs::create_dir_all(dir).expect("fixture dirs");
    }

    std::fs::write(
        modules.join("fue-01-planning.json"),
        r##"{
            "id": "fue-01-planning",
            "title": "Projektplanung",
            "description": "Planungsphasen und Vorgehensmodelle",
            "content": "# Planung",
            "category": "FÜ-01",
            "difficulty": "beginner",
            "examRelevance": "high",
            "estimatedTime": 45,
            "tags": ["projektmanagement", "planung"]
        }"##,
    )
    .expect("write module");

    std::fs::write(
        modules.join("bp-ae-01-basics.json"),
        r##"{
            "id": "bp-ae-01-basics",
            "title": "Grundlagen der Programmierung",
            "description": "Kontrollstrukturen und Datentypen",
            "content": "# Grundlagen",
            "category": "BP-AE-01",
            "difficulty": "beginner",
            "examRelevance": "high",
            "estimatedTime": "45 min",
            "tags": ["programmierung", "grundlagen"],
            "relatedQuizzes": ["bp-ae-01-basics-quiz"]
        }"##,
    )
    .expect("write module");

    std::fs::write(
        modules.join("bp-ae-02-oop.json"),
        r##"{
            "id": "bp-ae-02-oop",
            "title": "Objektorientierte Programmierung",
            "description": "Klassen, Vererbung, Polymorphie",
            "content": "# OOP",
            "category": "BP-AE-02",
            "difficulty": "intermediate",
            "examRelevance": "high",
            "estimatedTime": "1 Stunde",
            "tags": ["programmierung", "oop"],
            "prerequisites": ["bp-ae-01-basics"]
        }"##,
    )
    .expect("write module");

    std::fs::write(
        modules.join("bp-dpa-01-er-modeling.json"),
        r##"{
            "id": "bp-dpa-01-er-modeling",
            "title": "ER-Modellierung",
            "description": "Entity-Relationship-Modelle und Datenbanken",
            "content": "# ER",
            "category": "BP-DPA-01",
            "difficulty": "intermediate",
            "examRelevance": "medium",
            "estimatedTime": "1,5 Stunden",
            "tags": ["datenbanken", "data", "modellierung"]
        }"##,
    )
    .expect("write module");

    std::fs::write(
        quizzes.join("fue-01-planning-quiz.json"),
        r#"{
            "id": "fue-01-planning-quiz",
            "moduleId": "fue-01-planning",
            "title": "Quiz Projektplanung",
            "description": "Planungsgrundlagen",
            "category": "FÜ-01",
            "difficulty": "beginner",
            "passingScore": 70,
            "questions": [
                {
                    "id": "q1",
                    "type": "single-choice",
                    "question": "Welche Phase kommt zuerst?",
                    "options": ["Analyse", "Implementierung"],
                    "correctAnswer": "Analyse",
                    "points": 2
                },
                {
                    "id": "q2",
                    "type": "true-false",
                    "question": "Ein Lastenheft schreibt der Auftraggeber.",
                    "correctAnswer": "true",
                    "points": 1
                }
            ]
        }"#,
    )
    .expect("write quiz");

    std::fs::write(
        quizzes.join("bp-ae-01-basics-quiz.json"),
        r#"{
            "id": "bp-ae-01-basics-quiz",
            "moduleId": "bp-ae-01-basics",
            "title": "Quiz Grundlagen",
            "description": "Datentypen und Kontrollfluss",
            "category": "BP-AE-01",
            "difficulty": "beginner",
            "passingScore": 60,
            "questions": [
                {
                    "id": "q1",
                    "type": "multiple-choice",
                    "question": "Welche sind Ganzzahltypen?",
                    "options": ["int", "float", "long"],
                    "correctAnswer": ["int", "long"],
                    "points": 3
                }
            ]
        }"#,
    )
    .expect("write quiz");

    std::fs::write(
        paths.join("ap2-ae.json"),
        r#"{
            "id": "ap2-ae",
            "title": "AP2 Anwendungsentwicklung",
            "description": "Weg zur Abschlussprüfung Teil 2",
            "difficulty": "intermediate",
            "estimatedDuration": 12,
            "modules": [
                {"moduleId": "bp-ae-01-basics", "order": 1, "required": true},
                {"moduleId": "bp-ae-02-oop", "order": 2, "required": true}
            ],
            "quizzes": [
                {
                    "quizId": "bp-ae-01-basics-quiz",
                    "order": 1,
                    "required": true,
                    "unlockAfterModules": ["bp-ae-01-basics"]
                }
            ],
            "milestones": [
                {
                    "title": "Grundlagen sicher",
                    "description": "Erste Etappe geschafft",
                    "requiredModules": ["bp-ae-01-basics"],
                    "requiredQuizzes": ["bp-ae-01-basics-quiz"]
                }
            ]
        }"#,
    )
    .expect("write path");

    std::fs::write(
        metadata.join("categories.json"),
        r#"["FÜ-01", "BP-AE-01", "BP-AE-02", "BP-DPA-01"]"#,
    )
    .expect("write categories");
    std::fs::write(
        metadata.join("exam-changes-2025.json"),
        r#"{"newTopics": ["bp-ae-02-oop"], "removedTopics": []}"#,
    )
    .expect("write exam changes");
}

fn service(root: &Path) -> ContentService {
    ContentService::new(
        Arc::new(DirSource::new(root)),
        Arc::new(FixedClock::at(1_700_000_000_000)),
    )
}

fn module_id(id: &str) -> ModuleId {
    ModuleId::parse(id).expect("valid id")
}

#[tokio::test]
async fn enrichment_derives_three_tier_categories() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixture(dir.path());
    let content = service(dir.path());

    let module = content
        .module_by_id(&module_id("bp-dpa-01-er-modeling"))
        .await
        .expect("load")
        .expect("module exists");
    assert_eq!(module.three_tier_category, ThreeTierCategory::DatenProzessanalyse);
    assert_eq!(module.category, "BP-DPA-01");
    assert_eq!(
        module.category_mapping.three_tier_category,
        module.three_tier_category
    );
    assert_eq!(module.category_mapping.source_category, "BP-DPA-01");

    let planning = content
        .module_by_id(&module_id("fue-01-planning"))
        .await
        .expect("load")
        .expect("module exists");
    assert_eq!(planning.three_tier_category, ThreeTierCategory::Allgemein);
}

#[tokio::test]
async fn estimated_time_strings_normalize_to_minutes() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixture(dir.path());
    let content = service(dir.path());

    let er = content
        .module_by_id(&module_id("bp-dpa-01-er-modeling"))
        .await
        .expect("load")
        .expect("module exists");
    assert_eq!(er.estimated_time, 90);

    let oop = content
        .module_by_id(&module_id("bp-ae-02-oop"))
        .await
        .expect("load")
        .expect("module exists");
    assert_eq!(oop.estimated_time, 60);

    let basics = content
        .module_by_id(&module_id("bp-ae-01-basics"))
        .await
        .expect("load")
        .expect("module exists");
    assert_eq!(basics.estimated_time, 45);
}

#[tokio::test]
async fn search_is_case_insensitive() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixture(dir.path());
    let content = service(dir.path());

    let lower = content
        .search_in_category("data", ThreeTierCategory::DatenProzessanalyse)
        .await
        .expect("search");
    let upper = content
        .search_in_category("DATA", ThreeTierCategory::DatenProzessanalyse)
        .await
        .expect("search");
    let mixed = content
        .search_in_category("Data", ThreeTierCategory::DatenProzessanalyse)
        .await
        .expect("search");

    let ids = |hits: &[azubi_prep_content::ContentItem]| -> Vec<String> {
        hits.iter().map(|h| h.id().to_string()).collect()
    };
    assert!(!lower.is_empty());
    assert_eq!(ids(&lower), ids(&upper));
    assert_eq!(ids(&lower), ids(&mixed));
}

#[tokio::test]
async fn empty_query_matches_all_but_is_invalid_in_category_search() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixture(dir.path());
    let content = service(dir.path());

    let everything = content
        .search("", &SearchFilters::default())
        .await
        .expect("search");
    assert_eq!(everything.len(), 6);

    let err = content
        .search_in_category("   ", ThreeTierCategory::Allgemein)
        .await
        .expect_err("whitespace query");
    assert_eq!(err.kind, azubi_prep_core::ErrorKind::InvalidInput);
}

#[tokio::test]
async fn category_listing_orders_by_relevance_difficulty_title() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixture(dir.path());
    let content = service(dir.path());

    let ae = content
        .content_by_category(ThreeTierCategory::Anwendungsentwicklung)
        .await
        .expect("listing");
    let ids: Vec<&str> = ae.iter().map(|i| i.id()).collect();
    // High-relevance modules first (beginner before intermediate),
    // then the quiz (medium relevance).
    assert_eq!(
        ids,
        vec!["bp-ae-01-basics", "bp-ae-02-oop", "bp-ae-01-basics-quiz"]
    );
}

#[tokio::test]
async fn related_quizzes_union_backrefs_and_declarations() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixture(dir.path());
    let content = service(dir.path());

    let quizzes = content
        .related_quizzes(&module_id("bp-ae-01-basics"))
        .await
        .expect("related");
    assert_eq!(quizzes.len(), 1);
    assert_eq!(quizzes[0].id, QuizId::parse("bp-ae-01-basics-quiz").expect("valid id"));
}

#[tokio::test]
async fn exam_changes_flag_new_modules() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixture(dir.path());
    let content = service(dir.path());

    let oop = content
        .module_by_id(&module_id("bp-ae-02-oop"))
        .await
        .expect("load")
        .expect("module exists");
    assert!(oop.new_in_2025, "metadata newTopics marks the module");
}

#[tokio::test]
async fn learning_path_loads_with_unlocks() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixture(dir.path());
    let content = service(dir.path());

    let path = content
        .learning_path(&azubi_prep_model::LearningPathId::parse("ap2-ae").expect("valid id"))
        .await
        .expect("load")
        .expect("path exists");
    assert_eq!(path.modules.len(), 2);
    assert_eq!(path.quizzes[0].unlock_after_modules.len(), 1);
    assert_eq!(path.milestones.len(), 1);
}

#[tokio::test]
async fn clean_fixture_validates_and_reports_no_drops() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixture(dir.path());
    let content = service(dir.path());

    let report = content.load_report().await.expect("report");
    assert_eq!(report.total, 6);
    assert_eq!(report.loaded, 6);
    assert_eq!(report.dropped, 0);
    assert_eq!(report.by_category[&ThreeTierCategory::Anwendungsentwicklung], 3);
    assert_eq!(report.by_category[&ThreeTierCategory::DatenProzessanalyse], 1);
    assert_eq!(report.by_category[&ThreeTierCategory::Allgemein], 2);

    let validation = content.validate().await.expect("validate");
    assert!(validation.is_valid, "errors: {:?}", validation.errors);
    assert_eq!(validation.total_items, 6);
    assert_eq!(validation.valid_items, 6);
}

#[tokio::test]
async fn content_with_category_info_groups_everything() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixture(dir.path());
    let content = service(dir.path());

    let groups = content.content_with_category_info().await.expect("groups");
    assert_eq!(groups.len(), 3);
    let ae = &groups[&ThreeTierCategory::Anwendungsentwicklung];
    assert_eq!(ae.modules.len(), 2);
    assert_eq!(ae.quizzes.len(), 1);
    assert_eq!(ae.config.display_name, "Anwendungsentwicklung");
}
