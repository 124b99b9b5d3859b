// SPDX-License-Identifier: Apache-2.0

use crate::category::ThreeTierCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnomalySeverity {
    Error,
    Warning,
}

/// One item dropped or degraded during content load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoadAnomaly {
    pub severity: AnomalySeverity,
    pub item: String,
    pub message: String,
}

/// Outcome summary of a content load.
///
/// Integrity problems never abort the load; they land here and the
/// remaining corpus is served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub total: usize,
    pub loaded: usize,
    pub dropped: usize,
    #[serde(default)]
    pub anomalies: Vec<LoadAnomaly>,
    #[serde(default)]
    pub by_category: BTreeMap<ThreeTierCategory, usize>,
}

impl LoadReport {
    pub fn record_drop(&mut self, item: impl Into<String>, message: impl Into<String>) {
        self.dropped += 1;
        self.anomalies.push(LoadAnomaly {
            severity: AnomalySeverity::Error,
            item: item.into(),
            message: message.into(),
        });
    }

    pub fn record_warning(&mut self, item: impl Into<String>, message: impl Into<String>) {
        self.anomalies.push(LoadAnomaly {
            severity: AnomalySeverity::Warning,
            item: item.into(),
            message: message.into(),
        });
    }

    #[must_use]
    pub fn warnings(&self) -> usize {
        self.anomalies
            .iter()
            .filter(|a| a.severity == AnomalySeverity::Warning)
            .count()
    }
}

/// 2025 exam regulation changes, keyed by module id or title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExamChanges2025 {
    #[serde(default)]
    pub new_topics: Vec<String>,
    #[serde(default)]
    pub removed_topics: Vec<String>,
}
