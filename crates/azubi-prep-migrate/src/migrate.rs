// SPDX-License-Identifier: Apache-2.0

use crate::monitor::{MigrationMonitor, MigrationPhase, MigrationSummary};
use crate::three_tier::progress_with_three_tier_categories;
use azubi_prep_content::ContentService;
use azubi_prep_core::{canonical, Clock, EngineError, ErrorKind};
use azubi_prep_model::{MigrationInfo, ProgressState, THREE_TIER_STRUCTURE};
use azubi_prep_progress::StateStore;
use azubi_prep_store::{keys, StorageAdapter};
use serde::Serialize;
use std::sync::Arc;

/// Structure label of un-migrated progress records.
pub const SOURCE_STRUCTURE: &str = "legacy-categories";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationResult {
    pub success: bool,
    pub already_migrated: bool,
    pub migration_id: Option<String>,
    pub snapshot_key: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<MigrationSummary>,
}

impl MigrationResult {
    fn noop(message: &str, already_migrated: bool) -> Self {
        Self {
            success: true,
            already_migrated,
            migration_id: None,
            snapshot_key: None,
            message: message.to_string(),
            summary: None,
        }
    }
}

/// Drives the migration protocol: detect, snapshot, transform, stamp,
/// publish. Holds the conceptual progress lock for the whole span; a
/// failure at any step leaves the live record exactly as it was.
pub struct MigrationService {
    adapter: StorageAdapter,
    state: Arc<StateStore>,
    content: Arc<ContentService>,
    clock: Arc<dyn Clock>,
}

impl MigrationService {
    #[must_use]
    pub fn new(
        adapter: StorageAdapter,
        state: Arc<StateStore>,
        content: Arc<ContentService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            adapter,
            state,
            content,
            clock,
        }
    }

    /// Runs the migration if it is needed; re-running after success is
    /// a no-op reporting `already_migrated`.
    pub async fn migrate(&self) -> Result<MigrationResult, EngineError> {
        let mut monitor = MigrationMonitor::started_at(self.clock.now_ms());

        // Detect.
        let live = self.state.progress();
        let item_count = live.modules_completed.len()
            + live.modules_in_progress.len()
            + live.quiz_attempts.len();
        monitor.record_phase(MigrationPhase::Detect, self.clock.now_ms(), item_count);
        if live.is_migrated() {
            return Ok(MigrationResult::noop("progress already migrated", true));
        }
        if !live.has_meaningful_progress() {
            return Ok(MigrationResult::noop("no progress to migrate", false));
        }

        let live_hash = canonical::stable_json_hash_hex(&live)
            .map_err(|e| EngineError::new(ErrorKind::DataIntegrity, e.to_string()))?;
        let migration_id = canonical::short_token(&(live_hash.as_str(), self.clock.now_ms()))
            .map_err(|e| EngineError::new(ErrorKind::DataIntegrity, e.to_string()))?;
        let snapshot_key = keys::snapshot(&migration_id);

        // Snapshot, before any mutation.
        let snapshot_bytes = canonical::stable_json_bytes(&live)
            .map_err(|e| EngineError::new(ErrorKind::DataIntegrity, e.to_string()))?;
        monitor.record_snapshot_size(snapshot_bytes.len());
        self.adapter
            .put_json(&snapshot_key, &live)
            .await
            .map_err(|e| EngineError::new(ErrorKind::StorageFailure, e.to_string()))?;
        monitor.record_phase(MigrationPhase::Snapshot, self.clock.now_ms(), item_count);

        // Transform: derive the per-category view; its totals must
        // account for every migrated item.
        let by_category = progress_with_three_tier_categories(&self.content, &live).await?;
        let transformed_count: usize = by_category
            .values()
            .map(|s| s.modules_completed.len() + s.modules_in_progress.len() + s.quiz_attempts.len())
            .sum();
        monitor.record_phase(MigrationPhase::Transform, self.clock.now_ms(), transformed_count);
        if transformed_count != item_count {
            return Err(EngineError::new(
                ErrorKind::DataIntegrity,
                format!("transform covered {transformed_count} of {item_count} items"),
            ));
        }

        // Stamp. All original fields stay untouched.
        let mut stamped = live.clone();
        stamped.migration_info = Some(MigrationInfo {
            source_structure: SOURCE_STRUCTURE.to_string(),
            target_structure: THREE_TIER_STRUCTURE.to_string(),
            migrated_at_ms: self.clock.now_ms(),
            previous_snapshot_key: snapshot_key.clone(),
            migration_id: migration_id.clone(),
        });
        monitor.record_phase(MigrationPhase::Stamp, self.clock.now_ms(), item_count);

        // Publish, unless the live record moved under us.
        let current_hash = canonical::stable_json_hash_hex(&self.state.progress())
            .map_err(|e| EngineError::new(ErrorKind::DataIntegrity, e.to_string()))?;
        if current_hash != live_hash {
            return Err(EngineError::new(
                ErrorKind::MigrationConflict,
                "progress changed while the migration was staged",
            ));
        }
        self.adapter
            .put_json(keys::PROGRESS, &stamped)
            .await
            .map_err(|e| EngineError::new(ErrorKind::StorageFailure, e.to_string()))?;
        self.state.update_progress(stamped.clone());
        monitor.record_phase(MigrationPhase::Publish, self.clock.now_ms(), item_count);

        let post_valid = stamped.validate().is_empty() && stamped.is_migrated();
        let summary = monitor.finish(Some(migration_id.clone()), self.clock.now_ms(), post_valid);
        tracing::info!(
            migration_id = migration_id.as_str(),
            items = item_count,
            duration_ms = summary.performance_metrics.migration_duration_ms,
            "progress migrated to three-tier categories"
        );
        Ok(MigrationResult {
            success: true,
            already_migrated: false,
            migration_id: Some(migration_id),
            snapshot_key: Some(snapshot_key),
            message: format!("migrated {item_count} progress items"),
            summary: Some(summary),
        })
    }

    /// Restores the pre-migration snapshot and clears the migration
    /// stamp.
    pub async fn rollback(&self, migration_id: &str) -> Result<MigrationResult, EngineError> {
        let snapshot_key = keys::snapshot(migration_id);
        let Some(snapshot): Option<ProgressState> = self
            .adapter
            .get_json(&snapshot_key)
            .await
            .map_err(|e| EngineError::new(ErrorKind::StorageFailure, e.to_string()))?
        else {
            return Err(EngineError::new(
                ErrorKind::NotFound,
                format!("snapshot {snapshot_key} does not exist"),
            ));
        };

        self.adapter
            .put_json(keys::PROGRESS, &snapshot)
            .await
            .map_err(|e| EngineError::new(ErrorKind::StorageFailure, e.to_string()))?;
        self.state.update_progress(snapshot);
        tracing::info!(migration_id, "progress migration rolled back");
        Ok(MigrationResult {
            success: true,
            already_migrated: false,
            migration_id: Some(migration_id.to_string()),
            snapshot_key: Some(snapshot_key),
            message: "migration rolled back".to_string(),
            summary: None,
        })
    }

    /// Snapshot keys currently held in the store, oldest first.
    pub async fn snapshot_keys(&self) -> Result<Vec<String>, EngineError> {
        self.adapter
            .keys_with_prefix(keys::SNAPSHOT_PREFIX)
            .await
            .map_err(|e| EngineError::new(ErrorKind::StorageFailure, e.to_string()))
    }
}
