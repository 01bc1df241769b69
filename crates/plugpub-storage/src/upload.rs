// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Upload client: one artifact to its remote key, then a bounded confirmation.

use std::sync::Arc;
use std::time::Duration;

use plugpub_core::{ObjectBody, ObjectStore, RegistryError, Release};
use tracing::{info, warn};

/// Write an object and block until the store confirms it is readable.
///
/// A confirmation failure after a successful write is always reported as
/// [`RegistryError::Unconfirmed`]: the object may well exist.
pub async fn put_confirmed(
    store: &dyn ObjectStore,
    key: &str,
    body: ObjectBody,
    timeout: Duration,
) -> Result<(), RegistryError> {
    store.put(key, body).await?;

    store
        .wait_until_exists(key, timeout)
        .await
        .map_err(|e| match e {
            e @ RegistryError::Unconfirmed { .. } => e,
            other => RegistryError::Unconfirmed {
                key: key.to_string(),
                timeout,
                source: Some(Box::new(other)),
            },
        })
        .inspect_err(|_| {
            warn!(%key, ?timeout, "object written but not confirmed; verify it manually");
        })
}

/// Uploads release artifacts. No retries: each call is a single attempt.
#[derive(Clone)]
pub struct UploadClient {
    store: Arc<dyn ObjectStore>,
    confirm_timeout: Duration,
}

impl UploadClient {
    pub fn new(store: Arc<dyn ObjectStore>, confirm_timeout: Duration) -> Self {
        Self {
            store,
            confirm_timeout,
        }
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Upload one release and return its remote key.
    pub async fn upload(&self, release: &Release) -> Result<String, RegistryError> {
        let key = release.remote_key();

        let metadata = tokio::fs::metadata(&release.path)
            .await
            .map_err(|e| RegistryError::io(&release.path, e))?;
        if !metadata.is_file() {
            return Err(RegistryError::Validation(format!(
                "artifact {} is not a file",
                release.path.display()
            )));
        }

        info!(
            %release,
            bucket = %self.store.location(),
            %key,
            size = metadata.len(),
            "uploading artifact"
        );
        put_confirmed(
            self.store.as_ref(),
            &key,
            ObjectBody::File(release.path.clone()),
            self.confirm_timeout,
        )
        .await?;

        info!(%release, %key, "artifact uploaded and confirmed");
        Ok(key)
    }
}
