// SPDX-License-Identifier: Apache-2.0

use crate::state::StateStore;
use azubi_prep_core::{EngineError, ErrorKind, WriteOutcome};
use azubi_prep_model::{relevance_for, Relevance, Specialization, SpecializationConfig, ThreeTierCategory};
use azubi_prep_store::{keys, StorageAdapter};
use std::sync::Arc;

/// Owns the active specialization and its persistence.
///
/// Until the user chooses, the engine reports the application
/// development track with `has_selected = false` and writes nothing.
pub struct SpecializationService {
    adapter: StorageAdapter,
    state: Arc<StateStore>,
}

const DEFAULT_SPECIALIZATION: Specialization = Specialization::Anwendungsentwicklung;

impl SpecializationService {
    #[must_use]
    pub fn new(adapter: StorageAdapter, state: Arc<StateStore>) -> Self {
        Self { adapter, state }
    }

    /// Restores the persisted choice into the state store. Unknown
    /// stored values are ignored, not failed: the default track works.
    pub async fn rehydrate(&self) -> Result<(), EngineError> {
        let stored: Option<String> = self
            .adapter
            .get_json(keys::SPECIALIZATION_CURRENT)
            .await
            .map_err(|e| EngineError::new(ErrorKind::StorageFailure, e.to_string()))?;
        let has_selected: Option<bool> = self
            .adapter
            .get_json(keys::SPECIALIZATION_HAS_SELECTED)
            .await
            .map_err(|e| EngineError::new(ErrorKind::StorageFailure, e.to_string()))?;

        let specialization = stored.as_deref().and_then(Specialization::parse);
        if stored.is_some() && specialization.is_none() {
            tracing::warn!(value = ?stored, "ignoring unknown persisted specialization");
        }

        let mut snapshot = self.state.snapshot();
        snapshot.specialization = specialization;
        snapshot.has_selected = has_selected.unwrap_or(false) && specialization.is_some();
        self.state.rehydrate(snapshot);
        Ok(())
    }

    #[must_use]
    pub fn current(&self) -> Specialization {
        self.state
            .snapshot()
            .specialization
            .unwrap_or(DEFAULT_SPECIALIZATION)
    }

    #[must_use]
    pub fn has_selected(&self) -> bool {
        self.state.snapshot().has_selected
    }

    /// Persists the choice, then publishes `specialization-changed`.
    pub async fn set(&self, specialization: Specialization) -> Result<WriteOutcome, EngineError> {
        self.adapter
            .put_json(keys::SPECIALIZATION_CURRENT, &specialization.as_str())
            .await
            .map_err(|e| EngineError::new(ErrorKind::StorageFailure, e.to_string()))?;
        self.adapter
            .put_json(keys::SPECIALIZATION_HAS_SELECTED, &true)
            .await
            .map_err(|e| EngineError::new(ErrorKind::StorageFailure, e.to_string()))?;

        self.state.set_specialization(specialization, true);
        Ok(WriteOutcome::ok(format!(
            "specialization set to {specialization}"
        )))
    }

    #[must_use]
    pub fn config(&self) -> SpecializationConfig {
        self.current().config()
    }

    #[must_use]
    pub fn available(&self) -> [Specialization; 2] {
        Specialization::ALL
    }

    #[must_use]
    pub fn category_relevance(&self, category: ThreeTierCategory) -> Relevance {
        relevance_for(category, self.current())
    }
}
