// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationPhase {
    Detect,
    Snapshot,
    Transform,
    Stamp,
    Publish,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseRecord {
    pub phase: MigrationPhase,
    pub at_ms: u64,
    pub items: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    /// Wall-clock milliseconds over the whole migration span.
    pub response_time_ms: u64,
    pub migration_duration_ms: u64,
    pub snapshot_size_bytes: usize,
}

/// Records timestamps and per-phase counts while a migration runs, and
/// derives the summary report. Never touches progress itself.
#[derive(Debug, Clone)]
pub struct MigrationMonitor {
    started_at_ms: u64,
    phases: Vec<PhaseRecord>,
    snapshot_size_bytes: usize,
}

impl MigrationMonitor {
    #[must_use]
    pub fn started_at(started_at_ms: u64) -> Self {
        Self {
            started_at_ms,
            phases: Vec::new(),
            snapshot_size_bytes: 0,
        }
    }

    pub fn record_phase(&mut self, phase: MigrationPhase, at_ms: u64, items: usize) {
        self.phases.push(PhaseRecord { phase, at_ms, items });
    }

    pub fn record_snapshot_size(&mut self, bytes: usize) {
        self.snapshot_size_bytes = bytes;
    }

    #[must_use]
    pub fn finish(
        self,
        migration_id: Option<String>,
        finished_at_ms: u64,
        post_migration_valid: bool,
    ) -> MigrationSummary {
        let span_ms = finished_at_ms.saturating_sub(self.started_at_ms);
        let mut items_per_phase = BTreeMap::new();
        for record in &self.phases {
            items_per_phase.insert(record.phase, record.items);
        }
        MigrationSummary {
            migration_id,
            started_at_ms: self.started_at_ms,
            finished_at_ms,
            phases: self.phases,
            items_per_phase,
            performance_metrics: PerformanceMetrics {
                response_time_ms: span_ms,
                migration_duration_ms: span_ms,
                snapshot_size_bytes: self.snapshot_size_bytes,
            },
            post_migration_valid,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationSummary {
    pub migration_id: Option<String>,
    pub started_at_ms: u64,
    pub finished_at_ms: u64,
    pub phases: Vec<PhaseRecord>,
    pub items_per_phase: BTreeMap<MigrationPhase, usize>,
    pub performance_metrics: PerformanceMetrics,
    pub post_migration_valid: bool,
}
