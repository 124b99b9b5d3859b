// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! One-shot, reversible upgrade of persisted progress to the
//! three-tier category model.

mod migrate;
mod monitor;
mod three_tier;

pub use migrate::{MigrationResult, MigrationService, SOURCE_STRUCTURE};
pub use monitor::{MigrationMonitor, MigrationPhase, MigrationSummary, PerformanceMetrics};
pub use three_tier::{progress_with_three_tier_categories, CategoryProgressSlice};

pub const CRATE_NAME: &str = "azubi-prep-migrate";
