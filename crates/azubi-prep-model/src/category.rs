// SPDX-License-Identifier: Apache-2.0

use crate::specialization::Specialization;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The closed three-tier category set. Every module and quiz carries
/// exactly one; the label is always recomputable from the legacy code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThreeTierCategory {
    DatenProzessanalyse,
    Anwendungsentwicklung,
    Allgemein,
}

impl ThreeTierCategory {
    pub const ALL: [Self; 3] = [
        Self::DatenProzessanalyse,
        Self::Anwendungsentwicklung,
        Self::Allgemein,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DatenProzessanalyse => "daten-prozessanalyse",
            Self::Anwendungsentwicklung => "anwendungsentwicklung",
            Self::Allgemein => "allgemein",
        }
    }

    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "daten-prozessanalyse" => Some(Self::DatenProzessanalyse),
            "anwendungsentwicklung" => Some(Self::Anwendungsentwicklung),
            "allgemein" => Some(Self::Allgemein),
            _ => None,
        }
    }
}

impl Display for ThreeTierCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-specialization relevance weight of a three-tier category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Relevance {
    High,
    Medium,
    Low,
}

impl Relevance {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Recommendation weight for this relevance tier.
    #[must_use]
    pub const fn weight(self) -> f64 {
        match self {
            Self::High => 1.0,
            Self::Medium => 0.5,
            Self::Low => 0.1,
        }
    }
}

impl Display for Relevance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for Relevance {
    /// The `allgemein` tier is medium for both tracks; that makes
    /// medium the neutral value.
    fn default() -> Self {
        Self::Medium
    }
}

/// Fixed display metadata per category label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryConfig {
    pub icon: &'static str,
    pub color: &'static str,
    pub css_class: &'static str,
    pub display_name: &'static str,
}

#[must_use]
pub const fn category_config(category: ThreeTierCategory) -> CategoryConfig {
    match category {
        ThreeTierCategory::DatenProzessanalyse => CategoryConfig {
            icon: "📊",
            color: "#0ea5e9",
            css_class: "category-daten-prozessanalyse",
            display_name: "Daten- und Prozessanalyse",
        },
        ThreeTierCategory::Anwendungsentwicklung => CategoryConfig {
            icon: "💻",
            color: "#22c55e",
            css_class: "category-anwendungsentwicklung",
            display_name: "Anwendungsentwicklung",
        },
        ThreeTierCategory::Allgemein => CategoryConfig {
            icon: "📚",
            color: "#64748b",
            css_class: "category-allgemein",
            display_name: "Allgemeine Inhalte",
        },
    }
}

/// Maps a legacy IHK category code to its three-tier label.
///
/// Deterministic and total: `BP-DPA*` codes land in data/process
/// analysis, `BP-AE*` and the bare `BP-01..BP-05` codes in application
/// development, everything else (FÜ, FUE, unknown) in the general tier.
#[must_use]
pub fn map_legacy_category(legacy: &str) -> ThreeTierCategory {
    let folded = legacy.trim().to_lowercase();
    if folded.contains("bp-dpa") {
        return ThreeTierCategory::DatenProzessanalyse;
    }
    if folded.contains("bp-ae") {
        return ThreeTierCategory::Anwendungsentwicklung;
    }
    if let Some(rest) = folded.strip_prefix("bp-0") {
        if matches!(rest, "1" | "2" | "3" | "4" | "5") {
            return ThreeTierCategory::Anwendungsentwicklung;
        }
    }
    ThreeTierCategory::Allgemein
}

/// Full mapping step: a stored label wins when it is a member of the
/// closed set; a label outside the set is ignored with a warning and
/// the legacy code decides.
#[must_use]
pub fn map_to_three_tier(stored: Option<&str>, legacy: &str) -> ThreeTierCategory {
    if let Some(raw) = stored {
        if let Some(category) = ThreeTierCategory::parse(raw) {
            return category;
        }
        tracing::warn!(label = raw, "unknown three-tier label, falling back to legacy code");
    }
    map_legacy_category(legacy)
}

/// A mapped label together with its display bundle and stamp; what the
/// view layer receives for any content item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedCategory {
    pub category: ThreeTierCategory,
    pub config: CategoryConfig,
    pub mapped_at_ms: u64,
}

#[must_use]
pub fn map_to_three_tier_with_config(
    stored: Option<&str>,
    legacy: &str,
    mapped_at_ms: u64,
) -> MappedCategory {
    let category = map_to_three_tier(stored, legacy);
    MappedCategory {
        category,
        config: category_config(category),
        mapped_at_ms,
    }
}

/// Relevance table; symmetric in the two specializations.
#[must_use]
pub const fn relevance_for(category: ThreeTierCategory, spec: Specialization) -> Relevance {
    match (spec, category) {
        (Specialization::Anwendungsentwicklung, ThreeTierCategory::Anwendungsentwicklung)
        | (Specialization::DatenProzessanalyse, ThreeTierCategory::DatenProzessanalyse) => {
            Relevance::High
        }
        (_, ThreeTierCategory::Allgemein) => Relevance::Medium,
        _ => Relevance::Low,
    }
}

/// Enrichment metadata attached to every loaded content item.
///
/// `three_tier_category` here must always equal the enriched record's
/// outer label; the validation service checks the pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CategoryMapping {
    pub three_tier_category: ThreeTierCategory,
    pub source_category: String,
    pub mapped_at_ms: u64,
}

impl CategoryMapping {
    #[must_use]
    pub fn stamp(category: ThreeTierCategory, source_category: &str, mapped_at_ms: u64) -> Self {
        Self {
            three_tier_category: category,
            source_category: source_category.to_string(),
            mapped_at_ms,
        }
    }

    /// Equality ignoring the stamp, for determinism checks.
    #[must_use]
    pub fn same_mapping(&self, other: &Self) -> bool {
        self.three_tier_category == other.three_tier_category
            && self.source_category == other.source_category
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn dpa_codes_map_to_data_process_analysis() {
        assert_eq!(
            map_legacy_category("BP-DPA-01"),
            ThreeTierCategory::DatenProzessanalyse
        );
        assert_eq!(
            map_legacy_category("bp-dpa-03"),
            ThreeTierCategory::DatenProzessanalyse
        );
    }

    #[test]
    fn ae_codes_map_to_application_development() {
        assert_eq!(
            map_legacy_category("BP-AE-02"),
            ThreeTierCategory::Anwendungsentwicklung
        );
        for code in ["BP-01", "BP-02", "BP-03", "BP-04", "BP-05"] {
            assert_eq!(
                map_legacy_category(code),
                ThreeTierCategory::Anwendungsentwicklung,
                "{code}"
            );
        }
    }

    #[test]
    fn everything_else_is_general() {
        for code in ["FÜ-01", "FUE-02", "BP-06", "", "unknown"] {
            assert_eq!(map_legacy_category(code), ThreeTierCategory::Allgemein, "{code}");
        }
    }

    #[test]
    fn stored_label_wins_when_valid() {
        assert_eq!(
            map_to_three_tier(Some("anwendungsentwicklung"), "BP-DPA-01"),
            ThreeTierCategory::Anwendungsentwicklung
        );
        assert_eq!(
            map_to_three_tier(Some("not-a-label"), "BP-DPA-01"),
            ThreeTierCategory::DatenProzessanalyse
        );
    }

    #[test]
    fn relevance_table_is_symmetric() {
        assert_eq!(
            relevance_for(
                ThreeTierCategory::Anwendungsentwicklung,
                Specialization::Anwendungsentwicklung
            ),
            Relevance::High
        );
        assert_eq!(
            relevance_for(
                ThreeTierCategory::DatenProzessanalyse,
                Specialization::DatenProzessanalyse
            ),
            Relevance::High
        );
        assert_eq!(
            relevance_for(
                ThreeTierCategory::DatenProzessanalyse,
                Specialization::Anwendungsentwicklung
            ),
            Relevance::Low
        );
        assert_eq!(
            relevance_for(ThreeTierCategory::Allgemein, Specialization::DatenProzessanalyse),
            Relevance::Medium
        );
    }

    #[test]
    fn display_bundle_is_deterministic_ignoring_stamp() {
        let a = map_to_three_tier_with_config(None, "BP-DPA-01", 1);
        let b = map_to_three_tier_with_config(None, "BP-DPA-01", 2);
        assert_eq!(a.category, b.category);
        assert_eq!(a.config, b.config);
        assert_eq!(a.config.css_class, "category-daten-prozessanalyse");
    }

    proptest! {
        #[test]
        fn mapping_is_case_insensitive(code in "[a-zA-Z0-9ÄÖÜäöü-]{0,24}") {
            prop_assert_eq!(
                map_legacy_category(&code),
                map_legacy_category(&code.to_uppercase())
            );
        }

        #[test]
        fn mapping_is_total(code in ".*") {
            let _ = map_legacy_category(&code);
        }
    }
}
