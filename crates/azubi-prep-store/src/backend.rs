// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreErrorCode {
    NotFound,
    Io,
    Serialization,
    QuotaExceeded,
    Internal,
}

impl StoreErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Io => "io_error",
            Self::Serialization => "serialization_error",
            Self::QuotaExceeded => "quota_exceeded",
            Self::Internal => "internal_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub code: StoreErrorCode,
    pub message: String,
}

impl StoreError {
    #[must_use]
    pub fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for StoreError {}

/// Raw string key/value store.
///
/// Reads of unknown keys return `Ok(None)`; `StoreErrorCode::NotFound`
/// is reserved for backends whose medium itself is missing. All four
/// operations are suspension points.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
    async fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}
