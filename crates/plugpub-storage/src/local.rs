// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Directory-backed object store.
//!
//! Keys map to relative paths under a root directory. Useful for staging a
//! registry on disk, serving it from a static file host, and for tests.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use plugpub_core::{ObjectBody, ObjectStore, RegistryError};
use tokio::time::Instant;
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// An [`ObjectStore`] rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    location: String,
    max_object_size: Option<u64>,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            location: root.display().to_string(),
            root,
            max_object_size: None,
        }
    }

    /// Reject objects larger than `bytes` as too large.
    pub fn with_max_object_size(mut self, bytes: Option<u64>) -> Self {
        self.max_object_size = bytes;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path of a key. Keys must be relative and stay under the root.
    fn path_for(&self, key: &str) -> Result<PathBuf, RegistryError> {
        let rel = Path::new(key);
        let valid =
            !key.is_empty() && rel.components().all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(self.error(
                key,
                io::Error::new(io::ErrorKind::InvalidInput, "invalid object key"),
            ));
        }
        Ok(self.root.join(rel))
    }

    fn error(&self, key: &str, source: io::Error) -> RegistryError {
        RegistryError::Storage {
            bucket: self.location.clone(),
            key: key.to_string(),
            source: Box::new(source),
        }
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn location(&self) -> &str {
        &self.location
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RegistryError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.error(key, e)),
        }
    }

    async fn put(&self, key: &str, body: ObjectBody) -> Result<(), RegistryError> {
        let path = self.path_for(key)?;

        let size = match &body {
            ObjectBody::Bytes(bytes) => bytes.len() as u64,
            ObjectBody::File(src) => tokio::fs::metadata(src)
                .await
                .map_err(|e| RegistryError::io(src, e))?
                .len(),
        };
        if let Some(max) = self.max_object_size
            && size > max
        {
            return Err(RegistryError::ArtifactTooLarge {
                bucket: self.location.clone(),
                key: key.to_string(),
            });
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.error(key, e))?;
        }

        // Write next to the target and rename so readers never see a partial object.
        let mut partial = path.clone().into_os_string();
        partial.push(".partial");
        let partial = PathBuf::from(partial);
        let written = match body {
            ObjectBody::Bytes(bytes) => tokio::fs::write(&partial, bytes).await,
            ObjectBody::File(src) => tokio::fs::copy(&src, &partial).await.map(|_| ()),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(self.error(key, e));
        }
        tokio::fs::rename(&partial, &path)
            .await
            .map_err(|e| self.error(key, e))?;

        debug!(%key, size, root = %self.location, "object written");
        Ok(())
    }

    async fn wait_until_exists(&self, key: &str, timeout: Duration) -> Result<(), RegistryError> {
        let path = self.path_for(key)?;
        let deadline = Instant::now() + timeout;
        loop {
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(RegistryError::Unconfirmed {
                    key: key.to_string(),
                    timeout,
                    source: None,
                });
            }
            tokio::time::sleep(POLL_INTERVAL.min(timeout)).await;
        }
    }
}
