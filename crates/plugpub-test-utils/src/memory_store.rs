// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory object store with fault injection.

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use plugpub_core::{ObjectBody, ObjectStore, RegistryError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

/// An [`ObjectStore`] backed by a map, recording every successful write.
///
/// Failures can be injected per key for `get`, `put`, and the confirmation wait.
pub struct MemoryObjectStore {
    name: String,
    max_object_size: Option<u64>,
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    writes: Mutex<Vec<String>>,
    fail_get: Mutex<HashSet<String>>,
    fail_put: Mutex<HashSet<String>>,
    fail_confirm: Mutex<HashSet<String>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::named("memory-bucket")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_object_size: None,
            objects: Mutex::new(BTreeMap::new()),
            writes: Mutex::new(Vec::new()),
            fail_get: Mutex::new(HashSet::new()),
            fail_put: Mutex::new(HashSet::new()),
            fail_confirm: Mutex::new(HashSet::new()),
        }
    }

    /// Reject objects larger than `bytes` as too large.
    pub fn with_max_object_size(mut self, bytes: u64) -> Self {
        self.max_object_size = Some(bytes);
        self
    }

    /// Seed an object without recording a write.
    pub async fn insert(&self, key: &str, bytes: impl Into<Vec<u8>>) {
        self.objects.lock().await.insert(key.to_string(), bytes.into());
    }

    /// Seed an object with JSON content.
    pub async fn insert_json<T: Serialize>(&self, key: &str, value: &T) {
        let bytes = serde_json::to_vec(value).unwrap_or_default();
        self.insert(key, bytes).await;
    }

    pub async fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().await.get(key).cloned()
    }

    /// Decode an object as JSON. `None` when absent or undecodable.
    pub async fn json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.object(key)
            .await
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
    }

    pub async fn keys(&self) -> Vec<String> {
        self.objects.lock().await.keys().cloned().collect()
    }

    /// Keys written through `put`, in order.
    pub async fn writes(&self) -> Vec<String> {
        self.writes.lock().await.clone()
    }

    pub async fn fail_get_on(&self, key: &str) {
        self.fail_get.lock().await.insert(key.to_string());
    }

    pub async fn fail_put_on(&self, key: &str) {
        self.fail_put.lock().await.insert(key.to_string());
    }

    pub async fn fail_confirm_on(&self, key: &str) {
        self.fail_confirm.lock().await.insert(key.to_string());
    }

    fn injected(&self, key: &str, op: &str) -> RegistryError {
        RegistryError::Storage {
            bucket: self.name.clone(),
            key: key.to_string(),
            source: format!("injected {op} failure").into(),
        }
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn location(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RegistryError> {
        if self.fail_get.lock().await.contains(key) {
            return Err(self.injected(key, "get"));
        }
        Ok(self.object(key).await)
    }

    async fn put(&self, key: &str, body: ObjectBody) -> Result<(), RegistryError> {
        let bytes = match body {
            ObjectBody::Bytes(bytes) => bytes,
            ObjectBody::File(path) => tokio::fs::read(&path)
                .await
                .map_err(|e| RegistryError::io(path, e))?,
        };

        if let Some(max) = self.max_object_size
            && bytes.len() as u64 > max
        {
            return Err(RegistryError::ArtifactTooLarge {
                bucket: self.name.clone(),
                key: key.to_string(),
            });
        }
        if self.fail_put.lock().await.contains(key) {
            return Err(self.injected(key, "put"));
        }

        self.objects.lock().await.insert(key.to_string(), bytes);
        self.writes.lock().await.push(key.to_string());
        Ok(())
    }

    async fn wait_until_exists(&self, key: &str, timeout: Duration) -> Result<(), RegistryError> {
        let confirmed =
            !self.fail_confirm.lock().await.contains(key) && self.object(key).await.is_some();
        if confirmed {
            Ok(())
        } else {
            Err(RegistryError::Unconfirmed {
                key: key.to_string(),
                timeout,
                source: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_and_write_log() {
        let store = MemoryObjectStore::new();
        assert!(store.get("a").await.unwrap().is_none());

        store.put("a", ObjectBody::Bytes(b"1".to_vec())).await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.writes().await, vec!["a"]);
        store
            .wait_until_exists("a", Duration::from_secs(1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn size_limit_and_injected_failures() {
        let store = MemoryObjectStore::new().with_max_object_size(2);
        let err = store
            .put("big", ObjectBody::Bytes(vec![0; 3]))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::ArtifactTooLarge { .. }));

        store.fail_put_on("k").await;
        assert!(matches!(
            store.put("k", ObjectBody::Bytes(vec![1])).await,
            Err(RegistryError::Storage { .. })
        ));

        store.insert("c", vec![1]).await;
        store.fail_confirm_on("c").await;
        assert!(matches!(
            store.wait_until_exists("c", Duration::from_secs(1)).await,
            Err(RegistryError::Unconfirmed { .. })
        ));
        assert!(store.writes().await.is_empty());
    }
}
