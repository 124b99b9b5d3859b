// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Live application state and the progress read models derived from it.

mod progress;
mod reports;
mod specialization;
mod state;

pub use progress::ProgressService;
pub use reports::{
    CategoryProgress, ExamReadiness, LegacyCategoryProgress, MainCategory, OverallProgress,
    ReadinessBreakdown, ReadinessLevel, ReadinessStatistics, Severity, WeakArea, WeakAreaKind,
};
pub use specialization::SpecializationService;
pub use state::{AppState, StateEvent, StateKey, StateStore};

pub const CRATE_NAME: &str = "azubi-prep-progress";
