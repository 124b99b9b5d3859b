// SPDX-License-Identifier: Apache-2.0

//! Case-folding properties of the search surface.

use azubi_prep_content::{load_corpus, search, LoadedCorpus, ManifestSection, MemorySource, SearchFilters};
use azubi_prep_core::FixedClock;
use proptest::prelude::*;

fn fixture_corpus() -> LoadedCorpus {
    let source = MemorySource::new()
        .with_document(
            ManifestSection::Modules,
            "m1.json",
            r#"{
                "id": "bp-dpa-01-er-modeling",
                "title": "ER-Modellierung",
                "description": "Datenbanken und Data Dictionary",
                "category": "BP-DPA-01",
                "difficulty": "intermediate",
                "examRelevance": "high",
                "estimatedTime": 90,
                "tags": ["datenbanken", "data", "sql"]
            }"#,
        )
        .with_document(
            ManifestSection::Modules,
            "m2.json",
            r#"{
                "id": "bp-ae-01-basics",
                "title": "Grundlagen der Programmierung",
                "description": "Datentypen und Kontrollfluss",
                "category": "BP-AE-01",
                "difficulty": "beginner",
                "examRelevance": "high",
                "estimatedTime": 45,
                "tags": ["programmierung"]
            }"#,
        )
        .with_document(
            ManifestSection::Modules,
            "m3.json",
            r#"{
                "id": "fue-01-planning",
                "title": "Projektplanung",
                "description": "Vorgehensmodelle",
                "category": "FÜ-01",
                "difficulty": "beginner",
                "examRelevance": "medium",
                "estimatedTime": 45,
                "tags": ["projektmanagement"]
            }"#,
        );
    let clock = FixedClock::at(1_000);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    runtime
        .block_on(load_corpus(&source, &clock))
        .expect("fixture corpus loads")
}

fn result_ids(corpus: &LoadedCorpus, query: &str) -> Vec<String> {
    search(&corpus.index, query, &SearchFilters::default())
        .iter()
        .map(|item| item.id().to_string())
        .collect()
}

proptest! {
    #[test]
    fn search_ignores_query_case(query in "[a-zA-ZäöüÄÖÜ ]{0,16}") {
        let corpus = fixture_corpus();
        let base = result_ids(&corpus, &query);
        prop_assert_eq!(&base, &result_ids(&corpus, &query.to_uppercase()));
        prop_assert_eq!(&base, &result_ids(&corpus, &query.to_lowercase()));
    }

    #[test]
    fn search_never_panics(query in ".{0,32}") {
        let corpus = fixture_corpus();
        let _ = result_ids(&corpus, &query);
    }
}

#[test]
fn known_queries_hit_expected_items() {
    let corpus = fixture_corpus();
    assert_eq!(result_ids(&corpus, "data"), vec!["bp-dpa-01-er-modeling".to_string()]);
    assert_eq!(
        result_ids(&corpus, "daten"),
        vec![
            "bp-ae-01-basics".to_string(),
            "bp-dpa-01-er-modeling".to_string()
        ]
    );
    assert!(result_ids(&corpus, "kein-treffer-vorhanden").is_empty());
}
