// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Stable error codes for everything the engine can fail with.
///
/// Lookups for unknown ids return `Option` and never construct one of
/// these; only writes and protocol operations do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    DataIntegrity,
    StorageFailure,
    MigrationConflict,
    AlreadyMigrated,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not-found",
            Self::InvalidInput => "invalid-input",
            Self::DataIntegrity => "data-integrity",
            Self::StorageFailure => "storage-failure",
            Self::MigrationConflict => "migration-conflict",
            Self::AlreadyMigrated => "already-migrated",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error value carried by every fallible engine operation.
///
/// The correlation id ties a surfaced failure back to its log line; the
/// view layer decides what, if anything, the user sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    pub kind: ErrorKind,
    pub message: String,
    pub correlation_id: String,
}

impl EngineError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let correlation_id = crate::time::next_correlation_id();
        tracing::warn!(
            code = kind.as_str(),
            correlation_id = %correlation_id,
            "{message}"
        );
        Self {
            kind,
            message,
            correlation_id,
        }
    }

    #[must_use]
    pub fn to_machine(&self) -> MachineError {
        MachineError::new(self.kind.as_str(), &self.message)
            .with_detail("correlation_id", &self.correlation_id)
    }
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for EngineError {}

/// Machine-readable error document for logs and exports.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MachineError {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

impl MachineError {
    #[must_use]
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            details: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_detail(mut self, key: &str, value: &str) -> Self {
        self.details.insert(key.to_string(), value.to_string());
        self
    }
}

impl Display for MachineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for MachineError {}

/// Result payload for state-changing operations.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WriteOutcome {
    pub success: bool,
    pub message: String,
}

impl WriteOutcome {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
