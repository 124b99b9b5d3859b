// SPDX-License-Identifier: Apache-2.0

use crate::backend::{StoreBackend, StoreError, StoreErrorCode};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;

/// In-memory backend; the single fake injected into every service under
/// test. Quota and fault flags cover the failure paths the persistent
/// backends can hit.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
    pub fail_writes: AtomicBool,
    pub write_count: AtomicU64,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    pub async fn used_bytes(&self) -> usize {
        self.entries
            .lock()
            .await
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.write_count.fetch_add(1, Ordering::Relaxed);
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::new(StoreErrorCode::Io, "injected write failure"));
        }
        let mut entries = self.entries.lock().await;
        if let Some(quota) = self.quota_bytes {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if used + key.len() + value.len() > quota {
                return Err(StoreError::new(
                    StoreErrorCode::QuotaExceeded,
                    format!("quota of {quota} bytes exceeded writing {key}"),
                ));
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .entries
            .lock()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_back_what_was_written() {
        let backend = MemoryBackend::new();
        backend.write("a", "1").await.expect("write");
        assert_eq!(backend.read("a").await.expect("read"), Some("1".to_string()));
        assert_eq!(backend.read("b").await.expect("read"), None);
    }

    #[tokio::test]
    async fn quota_rejects_oversized_writes() {
        let backend = MemoryBackend::with_quota(8);
        backend.write("k", "1234").await.expect("fits");
        let err = backend.write("k2", "123456").await.expect_err("over quota");
        assert_eq!(err.code, StoreErrorCode::QuotaExceeded);
        // Overwriting the existing key within quota still works.
        backend.write("k", "5678").await.expect("replace fits");
    }

    #[tokio::test]
    async fn injected_failures_surface_as_io_errors() {
        let backend = MemoryBackend::new();
        backend.fail_writes.store(true, Ordering::Relaxed);
        let err = backend.write("a", "1").await.expect_err("injected");
        assert_eq!(err.code, StoreErrorCode::Io);
    }

    #[tokio::test]
    async fn keys_filters_by_prefix_in_order() {
        let backend = MemoryBackend::new();
        for key in ["progress", "progress:snapshot:a", "specialization:current"] {
            backend.write(key, "x").await.expect("write");
        }
        let keys = backend.keys("progress:").await.expect("keys");
        assert_eq!(keys, vec!["progress:snapshot:a".to_string()]);
    }
}
