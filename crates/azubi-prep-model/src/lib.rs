// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! azubi-prep model SSOT.
//!
//! ```compile_fail
//! use azubi_prep_model::ThreeTierCategory;
//!
//! fn exhaustive_match(c: ThreeTierCategory) -> &'static str {
//!     match c {
//!         ThreeTierCategory::DatenProzessanalyse => "dpa",
//!         ThreeTierCategory::Anwendungsentwicklung => "ae",
//!     }
//! }
//! ```

mod category;
mod estimated_time;
mod ids;
mod learning_path;
mod module;
mod progress;
mod quiz;
mod report;
pub mod serde_helpers;
mod specialization;

pub use category::{
    category_config, map_legacy_category, map_to_three_tier, map_to_three_tier_with_config,
    relevance_for, CategoryConfig, CategoryMapping, MappedCategory, Relevance, ThreeTierCategory,
};
pub use estimated_time::parse_estimated_minutes;
pub use ids::{LearningPathId, ModuleId, ParseError, QuestionId, QuizId, ID_MAX_LEN};
pub use learning_path::{LearningPath, Milestone, PathModule, PathQuiz};
pub use module::{CodeExample, Difficulty, ExamRelevance, Module};
pub use progress::{
    MigrationInfo, ProgressState, QuizAttempt, PROGRESS_SCHEMA_VERSION, THREE_TIER_STRUCTURE,
};
pub use quiz::{CorrectAnswer, Question, QuestionKind, Quiz};
pub use report::{AnomalySeverity, ExamChanges2025, LoadAnomaly, LoadReport};
pub use specialization::{Specialization, SpecializationConfig};

pub const CRATE_NAME: &str = "azubi-prep-model";
