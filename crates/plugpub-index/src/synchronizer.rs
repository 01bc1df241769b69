// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Index synchronizer: merge a published version into both catalogs.
//!
//! Each catalog update is a full fetch, an in-memory merge, and a full
//! overwrite. Nothing here locks or conditionally writes, so two publishers
//! racing on the same catalog can lose an update (last writer wins).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use plugpub_core::{
    ArchitectureInfo, ObjectBody, ObjectStore, PluginCatalog, PluginDescriptor,
    REGISTRY_CATALOG_KEY, RegistryCatalog, RegistryError, Release, VersionRecord,
};
use plugpub_storage::put_confirmed;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::checksum::artifact_info;

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// A release that could not be hashed or stat'ed.
#[derive(Debug)]
pub struct ReleaseFailure {
    pub release: Release,
    pub error: RegistryError,
}

impl fmt::Display for ReleaseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.release, self.error)
    }
}

/// Outcome of a successful synchronization.
#[derive(Debug)]
pub struct SyncReport {
    /// The plugin catalog as written.
    pub catalog: PluginCatalog,
    /// Architecture keys recorded for this version.
    pub indexed: Vec<String>,
    /// Releases ignored because they belong to another plugin or version.
    pub skipped: Vec<Release>,
    /// Releases left out because their artifact could not be read.
    pub failures: Vec<ReleaseFailure>,
    /// Whether the plugin was new to the registry catalog.
    pub registry_entry_added: bool,
}

/// Updates the plugin and registry catalogs for one published version.
pub struct IndexSynchronizer {
    store: Arc<dyn ObjectStore>,
    confirm_timeout: Duration,
    public_url: Option<String>,
    allow_partial: bool,
    clock: Clock,
}

impl IndexSynchronizer {
    pub fn new(store: Arc<dyn ObjectStore>, confirm_timeout: Duration) -> Self {
        Self {
            store,
            confirm_timeout,
            public_url: None,
            allow_partial: false,
            clock: Arc::new(Utc::now),
        }
    }

    /// Prefix download URLs with a public base URL instead of the bare key.
    pub fn with_public_url(mut self, url: Option<String>) -> Self {
        self.public_url = url.map(|u| u.trim_end_matches('/').to_string());
        self
    }

    /// Index the readable releases even when others failed.
    pub fn allow_partial(mut self, allow: bool) -> Self {
        self.allow_partial = allow;
        self
    }

    /// Replace the timestamp source.
    pub fn with_clock(
        mut self,
        clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static,
    ) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    fn download_url(&self, key: &str) -> String {
        match &self.public_url {
            Some(base) => format!("{base}/{key}"),
            None => key.to_string(),
        }
    }

    /// Record `version` of `plugin_id` in both catalogs.
    ///
    /// Assumes every release has already been uploaded. Releases for another
    /// plugin or version are skipped with a warning. Unreadable artifacts are
    /// collected; unless partial indexing is allowed they abort the run before
    /// anything is written.
    pub async fn synchronize(
        &self,
        plugin_id: &str,
        version: &str,
        releases: &[Release],
        descriptor: &PluginDescriptor,
    ) -> Result<SyncReport, RegistryError> {
        if releases.is_empty() {
            return Err(RegistryError::Validation(
                "cannot index an empty set of releases".to_string(),
            ));
        }

        let catalog_key = PluginCatalog::object_key(plugin_id);
        let mut catalog = self
            .fetch::<PluginCatalog>(&catalog_key)
            .await?
            .unwrap_or_else(|| PluginCatalog::empty(plugin_id));

        let mut architectures = BTreeMap::new();
        let mut skipped = Vec::new();
        let mut failures = Vec::new();
        for release in releases {
            if release.plugin != catalog.id || release.version != version {
                warn!(
                    %release,
                    catalog = %catalog.id,
                    %version,
                    "release does not belong to this plugin version, skipping"
                );
                skipped.push(release.clone());
                continue;
            }

            match artifact_info(&release.path).await {
                Ok((checksum, size)) => {
                    let info = ArchitectureInfo {
                        checksum,
                        download_url: self.download_url(&release.remote_key()),
                        size,
                    };
                    architectures.insert(release.os_arch(), info);
                }
                Err(e) => {
                    warn!(%release, error = %e, "failed to read artifact");
                    failures.push(ReleaseFailure {
                        release: release.clone(),
                        error: RegistryError::io(&release.path, e),
                    });
                }
            }
        }

        if architectures.is_empty() || (!failures.is_empty() && !self.allow_partial) {
            if failures.is_empty() {
                return Err(RegistryError::Validation(format!(
                    "no releases of {plugin_id} {version} to index"
                )));
            }
            return Err(RegistryError::PartialIndex {
                failed: failures.iter().map(ToString::to_string).collect(),
            });
        }

        let indexed: Vec<String> = architectures.keys().cloned().collect();
        let now = (self.clock)();
        catalog.record_version(VersionRecord {
            metadata: descriptor.clone(),
            version: version.to_string(),
            architectures,
            created: now,
            updated: now,
        });
        catalog.refresh_display(descriptor);

        info!(key = %catalog_key, %version, architectures = ?indexed, "writing plugin catalog");
        self.write(&catalog_key, &catalog).await?;

        let mut registry = self
            .fetch::<RegistryCatalog>(REGISTRY_CATALOG_KEY)
            .await?
            .unwrap_or_default();
        let registry_entry_added = registry.upsert(catalog.to_entry());

        info!(
            key = REGISTRY_CATALOG_KEY,
            plugin = %catalog.id,
            added = registry_entry_added,
            "writing registry catalog"
        );
        self.write(REGISTRY_CATALOG_KEY, &registry).await?;

        Ok(SyncReport {
            catalog,
            indexed,
            skipped,
            failures,
            registry_entry_added,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, RegistryError> {
        let Some(bytes) = self.store.get(key).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| RegistryError::Catalog {
                key: key.to_string(),
                message: format!("couldn't decode catalog: {e}"),
            })
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), RegistryError> {
        let bytes = serde_json::to_vec(value).map_err(|e| RegistryError::Catalog {
            key: key.to_string(),
            message: format!("couldn't encode catalog: {e}"),
        })?;
        put_confirmed(
            self.store.as_ref(),
            key,
            ObjectBody::Bytes(bytes),
            self.confirm_timeout,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use plugpub_core::{Arch, Os, PlatformTarget};
    use plugpub_test_utils::{MemoryObjectStore, PluginFixture};
    use tracing_test::traced_test;

    use super::*;

    #[tokio::test]
    #[traced_test]
    async fn foreign_release_is_skipped_with_warning() {
        let fixture = PluginFixture::new("p", "1.0.0").unwrap();
        let own = Release {
            plugin: "p".into(),
            version: "1.0.0".into(),
            target: PlatformTarget::new(Os::Linux, Arch::Amd64),
            path: fixture.artifact("own.tar.gz", b"own").unwrap(),
        };
        let foreign = Release {
            plugin: "other".into(),
            path: fixture.artifact("foreign.tar.gz", b"foreign").unwrap(),
            ..own.clone()
        };
        let store = Arc::new(MemoryObjectStore::new());
        let sync = IndexSynchronizer::new(store.clone(), Duration::from_secs(1));

        let report = sync
            .synchronize("p", "1.0.0", &[own, foreign.clone()], &fixture.descriptor)
            .await
            .unwrap();

        assert_eq!(report.indexed, vec!["linux_amd64"]);
        assert_eq!(report.skipped, vec![foreign]);
        assert!(logs_contain("does not belong to this plugin version"));
    }

    #[test]
    fn public_url_prefixes_keys() {
        let sync = IndexSynchronizer::new(Arc::new(MemoryObjectStore::new()), Duration::ZERO)
            .with_public_url(Some("https://plugins.example.dev/".into()));
        assert_eq!(
            sync.download_url("p/1.0.0/linux-amd64.tar.gz"),
            "https://plugins.example.dev/p/1.0.0/linux-amd64.tar.gz"
        );

        let bare = IndexSynchronizer::new(Arc::new(MemoryObjectStore::new()), Duration::ZERO);
        assert_eq!(bare.download_url("k"), "k");
    }
}
