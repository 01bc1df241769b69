// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publish coordination: upload every artifact of a version, then index it.

use std::sync::Arc;

use plugpub_config::PlugpubConfig;
use plugpub_core::{ObjectStore, PluginDescriptor, PublishRequest, RegistryError, Release};
use plugpub_index::{IndexSynchronizer, SyncReport};
use plugpub_storage::UploadClient;
use tracing::{info, warn};

/// Result of a completed publish.
#[derive(Debug)]
pub struct PublishSummary {
    /// Remote keys of the uploaded artifacts, in upload order.
    pub uploaded: Vec<String>,
    pub sync: SyncReport,
}

/// Sequences uploads and catalog synchronization for one version.
///
/// Uploads run one at a time and the first failure aborts the publish
/// before any catalog is touched. Artifacts uploaded before the failure
/// stay in the store; re-running the publish overwrites them.
pub struct PublishCoordinator {
    upload: UploadClient,
    index: IndexSynchronizer,
}

impl PublishCoordinator {
    pub fn new(upload: UploadClient, index: IndexSynchronizer) -> Self {
        Self { upload, index }
    }

    /// Coordinator over `store` using the registry and index settings.
    pub fn from_config(store: Arc<dyn ObjectStore>, config: &PlugpubConfig) -> Self {
        let timeout = config.registry.confirm_timeout();
        let index = IndexSynchronizer::new(store.clone(), timeout)
            .with_public_url(config.registry.public_url.clone())
            .allow_partial(config.index.allow_partial);
        Self::new(UploadClient::new(store, timeout), index)
    }

    pub async fn publish(&self, request: &PublishRequest) -> Result<PublishSummary, RegistryError> {
        let (descriptor, releases) = prepare(request)?;

        let mut uploaded = Vec::with_capacity(releases.len());
        for release in &releases {
            let key = self.upload.upload(release).await?;
            info!(%release, %key, "uploaded release");
            uploaded.push(key);
        }

        let sync = self
            .index
            .synchronize(&request.plugin, &request.version, &releases, &descriptor)
            .await?;
        Ok(PublishSummary { uploaded, sync })
    }

    /// Re-run only catalog synchronization for artifacts already in the store.
    pub async fn reindex(&self, request: &PublishRequest) -> Result<SyncReport, RegistryError> {
        let (descriptor, releases) = prepare(request)?;
        self.index
            .synchronize(&request.plugin, &request.version, &releases, &descriptor)
            .await
    }
}

/// Check the request and load the descriptor snapshot before any remote call.
fn prepare(request: &PublishRequest) -> Result<(PluginDescriptor, Vec<Release>), RegistryError> {
    if request.plugin.trim().is_empty() || request.version.trim().is_empty() {
        return Err(RegistryError::Validation(
            "a plugin id and a version are required".to_string(),
        ));
    }

    let releases = request.to_releases();
    if releases.is_empty() {
        return Err(RegistryError::Validation(format!(
            "no artifacts given for {} {}",
            request.plugin, request.version
        )));
    }

    let descriptor = PluginDescriptor::load(&request.metadata_path)?;
    descriptor.validate()?;
    if descriptor.id != request.plugin {
        return Err(RegistryError::Validation(format!(
            "descriptor {} is for plugin `{}`, not `{}`",
            request.metadata_path.display(),
            descriptor.id,
            request.plugin
        )));
    }
    if descriptor.version != request.version {
        warn!(
            descriptor_version = %descriptor.version,
            version = %request.version,
            "descriptor version differs from the published version"
        );
    }

    Ok((descriptor, releases))
}
