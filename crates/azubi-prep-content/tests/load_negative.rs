// SPDX-License-Identifier: Apache-2.0

//! Degraded-corpus behavior: integrity problems are reported and
//! survived, never fatal.

use azubi_prep_content::{ContentService, ManifestSection, MemorySource};
use azubi_prep_core::FixedClock;
use azubi_prep_model::{AnomalySeverity, ModuleId, ThreeTierCategory};
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
            "examRelevance": "medium",
            "estimatedTime": 30,
            "prerequisites": [{}]
        }}"#,
        prereqs.join(", ")
    )
}

fn service(source: MemorySource) -> ContentService {
    ContentService::new(Arc::new(source), Arc::new(FixedClock::at(1_000)))
}

#[tokio::test]
async fn malformed_documents_are_dropped_with_anomalies() {
    let source = MemorySource::new()
        .with_document(
            ManifestSection::Modules,
            "good.json",
            module_json("fue-01-planning", "FÜ-01", &[]),
        )
        .with_document(ManifestSection::Modules, "broken.json", "{not json");
    let content = service(source);

    let report = content.load_report().await.expect("report");
    assert_eq!(report.loaded, 1);
    assert_eq!(report.dropped, 1);
    assert!(report
        .anomalies
        .iter()
        .any(|a| a.severity == AnomalySeverity::Error && a.item == "modules/broken.json"));
}

#[tokio::test]
async fn duplicate_ids_keep_the_first_occurrence() {
    let source = MemorySource::new()
        .with_document(
            ManifestSection::Modules,
            "a.json",
            module_json("fue-01-planning", "FÜ-01", &[]),
        )
        .with_document(
            ManifestSection::Modules,
            "b.json",
            module_json("fue-01-planning", "BP-AE-01", &[]),
        );
    let content = service(source);

    let module = content
        .module_by_id(&ModuleId::parse("fue-01-planning").expect("valid id"))
        .await
        .expect("load")
        .expect("module exists");
    // a.json sorts first, so the FÜ variant wins.
    assert_eq!(module.category, "FÜ-01");
    assert_eq!(module.three_tier_category, ThreeTierCategory::Allgemein);

    let report = content.load_report().await.expect("report");
    assert_eq!(report.dropped, 1);
}

#[tokio::test]
async fn quiz_without_existing_module_is_dropped() {
    let source = MemorySource::new()
        .with_document(
            ManifestSection::Modules,
            "m.json",
            module_json("fue-01-planning", "FÜ-01", &[]),
        )
        .with_document(
            ManifestSection::Quizzes,
            "q.json",
            r#"{
                "id": "orphan-quiz",
                "moduleId": "missing-module",
                "title": "Orphan",
                "category": "FÜ-01",
                "questions": [
                    {
                        "id": "q1",
                        "type": "true-false",
                        "question": "x?",
                        "correctAnswer": "true"
                    }
                ]
            }"#,
        );
    let content = service(source);

    assert!(content.all_quizzes().await.expect("load").is_empty());
    let report = content.load_report().await.expect("report");
    assert!(report
        .anomalies
        .iter()
        .any(|a| a.item == "orphan-quiz" && a.message.contains("does not exist")));
}

#[tokio::test]
async fn invalid_questions_are_dropped_and_empty_quizzes_removed() {
    let source = MemorySource::new()
        .with_document(
            ManifestSection::Modules,
            "m.json",
            module_json("fue-01-planning", "FÜ-01", &[]),
        )
        .with_document(
            ManifestSection::Quizzes,
            "q.json",
            r#"{
                "id": "thin-quiz",
                "moduleId": "fue-01-planning",
                "title": "Zu wenig Optionen",
                "category": "FÜ-01",
                "questions": [
                    {
                        "id": "q1",
                        "type": "single-choice",
                        "question": "Nur eine Option?",
                        "options": ["a"],
                        "correctAnswer": "a"
                    }
                ]
            }"#,
        );
    let content = service(source);

    assert!(content.all_quizzes().await.expect("load").is_empty());
    let report = content.load_report().await.expect("report");
    assert!(report.anomalies.iter().any(|a| a.message.contains("fewer than 2 options")));
    assert!(report
        .anomalies
        .iter()
        .any(|a| a.item == "thin-quiz" && a.message.contains("no valid questions")));
}

#[tokio::test]
async fn prerequisite_cycles_are_broken_with_a_warning() {
    let source = MemorySource::new()
        .with_document(
            ManifestSection::Modules,
            "a.json",
            module_json("mod-a", "BP-AE-01", &["mod-b"]),
        )
        .with_document(
            ManifestSection::Modules,
            "b.json",
            module_json("mod-b", "BP-AE-01", &["mod-a"]),
        );
    let content = service(source);

    // Terminates and yields a DAG.
    let a = ModuleId::parse("mod-a").expect("valid id");
    let b = ModuleId::parse("mod-b").expect("valid id");
    let prereqs_a = content.prerequisites(&a).await.expect("prereqs");
    let prereqs_b = content.prerequisites(&b).await.expect("prereqs");
    assert_eq!(prereqs_a.len() + prereqs_b.len(), 1, "one edge survives");

    let report = content.load_report().await.expect("report");
    assert!(report.anomalies.iter().any(|a| a.message.contains("cycle")));
}

#[tokio::test]
async fn dangling_references_are_pruned() {
    let source = MemorySource::new().with_document(
        ManifestSection::Modules,
        "m.json",
        module_json("mod-a", "BP-AE-01", &["ghost-module"]),
    );
    let content = service(source);

    let module = content
        .module_by_id(&ModuleId::parse("mod-a").expect("valid id"))
        .await
        .expect("load")
        .expect("module exists");
    assert!(module.prerequisites.is_empty());

    let validation = content.validate().await.expect("validate");
    assert!(validation.is_valid, "pruning restored integrity: {:?}", validation.errors);
}

#[tokio::test]
async fn stored_three_tier_label_overrides_legacy_code() {
    let source = MemorySource::new().with_document(
        ManifestSection::Modules,
        "m.json",
        r#"{
            "id": "mod-x",
            "title": "Override",
            "category": "BP-DPA-01",
            "threeTierCategory": "anwendungsentwicklung",
            "difficulty": "beginner",
            "estimatedTime": 10
        }"#,
    );
    let content = service(source);

    let module = content
        .module_by_id(&ModuleId::parse("mod-x").expect("valid id"))
        .await
        .expect("load")
        .expect("module exists");
    assert_eq!(module.three_tier_category, ThreeTierCategory::Anwendungsentwicklung);

    // The divergence from the legacy derivation is surfaced as a
    // warning, not an error.
    let validation = content.validate().await.expect("validate");
    assert!(validation.is_valid);
    assert_eq!(validation.warnings.len(), 1);
}

#[tokio::test]
async fn unknown_stored_label_falls_back_to_legacy_code() {
    let source = MemorySource::new().with_document(
        ManifestSection::Modules,
        "m.json",
        r#"{
            "id": "mod-y",
            "title": "Tippfehler",
            "category": "BP-DPA-02",
            "threeTierCategory": "daten-prozess",
            "difficulty": "beginner",
            "estimatedTime": 10
        }"#,
    );
    let content = service(source);

    let module = content
        .module_by_id(&ModuleId::parse("mod-y").expect("valid id"))
        .await
        .expect("load")
        .expect("module exists");
    assert_eq!(module.three_tier_category, ThreeTierCategory::DatenProzessanalyse);
}
