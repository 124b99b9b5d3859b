// SPDX-License-Identifier: Apache-2.0

use crate::backend::{StoreBackend, StoreError, StoreErrorCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Well-known keys of the persistent layout, pre-namespacing.
pub mod keys {
    pub const PROGRESS: &str = "progress";
    pub const SPECIALIZATION_CURRENT: &str = "specialization:current";
    pub const SPECIALIZATION_HAS_SELECTED: &str = "specialization:hasSelected";
    /// Owned by the wheel-of-fortune selector outside the core; the
    /// namespace protects it from collision, nothing here writes it.
    pub const LAST_WHEEL_MODULE: &str = "lastWheelModule";

    pub const SNAPSHOT_PREFIX: &str = "progress:snapshot:";

    #[must_use]
    pub fn snapshot(migration_id: &str) -> String {
        format!("{SNAPSHOT_PREFIX}{migration_id}")
    }
}

/// Namespaced, JSON-typed view over a raw backend.
///
/// Only this adapter knows the `azubi:` prefix; services talk in the
/// logical keys of [`keys`].
#[derive(Clone)]
pub struct StorageAdapter {
    backend: Arc<dyn StoreBackend>,
    namespace: &'static str,
}

const NAMESPACE: &str = "azubi:";

impl StorageAdapter {
    #[must_use]
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self {
            backend,
            namespace: NAMESPACE,
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{key}", self.namespace)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.backend.read(&self.full_key(key)).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StoreError::new(StoreErrorCode::Serialization, format!("{key}: {e}")))
    }

    pub async fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.backend.read(&self.full_key(key)).await
    }

    pub async fn put_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)
            .map_err(|e| StoreError::new(StoreErrorCode::Serialization, format!("{key}: {e}")))?;
        self.backend.write(&self.full_key(key), &raw).await
    }

    pub async fn put_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.backend.write(&self.full_key(key), value).await
    }

    pub async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.backend.remove(&self.full_key(key)).await
    }

    /// Logical keys under a logical prefix, namespace stripped.
    pub async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let keys = self.backend.keys(&self.full_key(prefix)).await?;
        Ok(keys
            .into_iter()
            .filter_map(|k| k.strip_prefix(self.namespace).map(str::to_string))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        n: u32,
    }

    #[tokio::test]
    async fn json_round_trip_under_namespace() {
        let backend = Arc::new(MemoryBackend::new());
        let adapter = StorageAdapter::new(backend.clone());

        adapter.put_json(keys::PROGRESS, &Doc { n: 7 }).await.expect("put");
        let loaded: Option<Doc> = adapter.get_json(keys::PROGRESS).await.expect("get");
        assert_eq!(loaded, Some(Doc { n: 7 }));

        // The raw key carries the namespace.
        assert_eq!(
            backend.read("azubi:progress").await.expect("read"),
            Some("{\"n\":7}".to_string())
        );
    }

    #[tokio::test]
    async fn malformed_json_is_a_serialization_error() {
        let backend = Arc::new(MemoryBackend::new());
        backend.write("azubi:progress", "not json").await.expect("seed");
        let adapter = StorageAdapter::new(backend);

        let err = adapter.get_json::<Doc>(keys::PROGRESS).await.expect_err("malformed");
        assert_eq!(err.code, StoreErrorCode::Serialization);
    }

    #[tokio::test]
    async fn snapshot_keys_share_the_reserved_prefix() {
        assert_eq!(keys::snapshot("m-1"), "progress:snapshot:m-1");
        assert!(keys::snapshot("m-1").starts_with(keys::SNAPSHOT_PREFIX));
    }

    #[tokio::test]
    async fn prefix_listing_strips_the_namespace() {
        let backend = Arc::new(MemoryBackend::new());
        let adapter = StorageAdapter::new(backend);
        adapter.put_raw(&keys::snapshot("a"), "{}").await.expect("put");
        adapter.put_raw(keys::PROGRESS, "{}").await.expect("put");

        let snapshots = adapter
            .keys_with_prefix(keys::SNAPSHOT_PREFIX)
            .await
            .expect("keys");
        assert_eq!(snapshots, vec!["progress:snapshot:a".to_string()]);
    }
}
