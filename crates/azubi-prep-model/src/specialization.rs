// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The two vocational tracks a learner can commit to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Specialization {
    Anwendungsentwicklung,
    DatenProzessanalyse,
}

impl Specialization {
    pub const ALL: [Self; 2] = [Self::Anwendungsentwicklung, Self::DatenProzessanalyse];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anwendungsentwicklung => "anwendungsentwicklung",
            Self::DatenProzessanalyse => "daten-prozessanalyse",
        }
    }

    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "anwendungsentwicklung" => Some(Self::Anwendungsentwicklung),
            "daten-prozessanalyse" => Some(Self::DatenProzessanalyse),
            _ => None,
        }
    }

    #[must_use]
    pub const fn config(self) -> SpecializationConfig {
        match self {
            Self::Anwendungsentwicklung => SpecializationConfig {
                name: "Anwendungsentwicklung",
                short_name: "AE",
                icon: "💻",
                color: "#22c55e",
                exam_code: "AP2-AE",
                description: "Fachinformatiker/-in für Anwendungsentwicklung: Konzeption und Umsetzung von Softwarelösungen",
            },
            Self::DatenProzessanalyse => SpecializationConfig {
                name: "Daten- und Prozessanalyse",
                short_name: "DPA",
                icon: "📊",
                color: "#0ea5e9",
                exam_code: "AP2-DPA",
                description: "Fachinformatiker/-in für Daten- und Prozessanalyse: datengestützte Optimierung digitaler Prozesse",
            },
        }
    }
}

impl Display for Specialization {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecializationConfig {
    pub name: &'static str,
    pub short_name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub exam_code: &'static str,
    pub description: &'static str,
}
