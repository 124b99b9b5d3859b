// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! The view-facing surface of the azubi-prep engine.
//!
//! [`App::initialize`] wires the services in boot order: storage
//! rehydrates the state store, the specialization service publishes the
//! current tier, the content service loads and enriches the corpus, and
//! the migration runs iff stored progress still lacks the three-tier
//! schema marker. Everything the view layer calls lives on the
//! assembled services; this crate re-exports the commonly used types.

use std::collections::BTreeMap;
use std::sync::Arc;

pub use azubi_prep_content::{
    CategoryContentGroup, ContentService, ContentSource, DirSource, MemorySource, RecommendOptions,
    RelatedOptions, SearchFilters,
};
pub use azubi_prep_core::{Clock, EngineError, ErrorKind, FixedClock, SystemClock, WriteOutcome};
pub use azubi_prep_migrate::{
    progress_with_three_tier_categories, CategoryProgressSlice, MigrationResult, MigrationService,
};
pub use azubi_prep_model::{
    Difficulty, ExamRelevance, LearningPathId, Module, ModuleId, ProgressState, Quiz, QuizId,
    Specialization, ThreeTierCategory,
};
pub use azubi_prep_progress::{
    ProgressService, SpecializationService, StateEvent, StateKey, StateStore,
};
pub use azubi_prep_store::{
    DirBackend, MemoryBackend, SqliteBackend, StorageAdapter, StoreBackend,
};

pub const CRATE_NAME: &str = "azubi-prep-api";

/// The assembled engine.
pub struct App {
    pub storage: StorageAdapter,
    pub state: Arc<StateStore>,
    pub content: Arc<ContentService>,
    pub specialization: Arc<SpecializationService>,
    pub progress: Arc<ProgressService>,
    pub migration: Arc<MigrationService>,
    /// Outcome of the boot-time migration pass; `already_migrated` or
    /// a no-op for most boots.
    pub boot_migration: MigrationResult,
}

impl App {
    /// Boots the engine against a storage backend, a content source,
    /// and a clock.
    pub async fn initialize(
        backend: Arc<dyn StoreBackend>,
        source: Arc<dyn ContentSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, EngineError> {
        let storage = StorageAdapter::new(backend);
        let state = Arc::new(StateStore::new());
        let specialization = Arc::new(SpecializationService::new(storage.clone(), state.clone()));
        let content = Arc::new(ContentService::new(source, clock.clone()));
        let progress = Arc::new(ProgressService::new(
            storage.clone(),
            state.clone(),
            content.clone(),
            specialization.clone(),
            clock.clone(),
        ));
        let migration = Arc::new(MigrationService::new(
            storage.clone(),
            state.clone(),
            content.clone(),
            clock,
        ));

        specialization.rehydrate().await?;
        progress.rehydrate().await?;
        content.initialize().await?;

        // Relationship scores depend on the active specialization;
        // drop the memoised results whenever it changes.
        let cache_owner = content.clone();
        state.subscribe(StateKey::Specialization, move |_| {
            cache_owner.invalidate_relationship_cache();
        });

        // A failing migration must not block the boot; the live record
        // is untouched and the failure travels in the result.
        let boot_migration = match migration.migrate().await {
            Ok(result) => result,
            Err(err) => MigrationResult {
                success: false,
                already_migrated: false,
                migration_id: None,
                snapshot_key: None,
                message: err.to_string(),
                summary: None,
            },
        };
        tracing::info!(
            migrated = boot_migration.success && !boot_migration.already_migrated,
            "engine initialized"
        );

        Ok(Self {
            storage,
            state,
            content,
            specialization,
            progress,
            migration,
            boot_migration,
        })
    }

    /// The live progress, bucketed by current three-tier category.
    pub async fn progress_with_three_tier_categories(
        &self,
    ) -> Result<BTreeMap<ThreeTierCategory, CategoryProgressSlice>, EngineError> {
        progress_with_three_tier_categories(&self.content, &self.state.progress()).await
    }
}
