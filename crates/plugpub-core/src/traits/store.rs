// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Object storage capability used for artifacts and catalogs.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::RegistryError;

/// Body of an object write.
#[derive(Debug, Clone)]
pub enum ObjectBody {
    /// In-memory content (catalog JSON).
    Bytes(Vec<u8>),
    /// Content streamed from a local file (release artifacts).
    File(PathBuf),
}

/// A remote, non-transactional key/value object store.
///
/// Implementations must report a size rejection as
/// [`RegistryError::ArtifactTooLarge`] and wrap every other failure with the
/// key it concerns.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Human-readable location (bucket name or root directory).
    fn location(&self) -> &str;

    /// Fetch an object. A missing object is `Ok(None)`, not an error.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RegistryError>;

    /// Write (or overwrite) an object.
    async fn put(&self, key: &str, body: ObjectBody) -> Result<(), RegistryError>;

    /// Block until the object is readable, or fail after `timeout`.
    async fn wait_until_exists(&self, key: &str, timeout: Duration)
    -> Result<(), RegistryError>;
}

/// Content type for an object key, based on its extension.
pub fn content_type_for(key: &str) -> &'static str {
    if key.ends_with(".json") {
        "application/json"
    } else if key.ends_with(".tar.gz") || key.ends_with(".tgz") {
        "application/gzip"
    } else {
        "application/octet-stream"
    }
}
