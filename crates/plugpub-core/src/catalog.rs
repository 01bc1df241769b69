// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry catalog documents.
//!
//! Two JSON documents live in the object store: one [`PluginCatalog`] per
//! plugin at `<plugin-id>/index.json`, and the single [`RegistryCatalog`] at
//! the store root. These types carry the in-memory merge rules; fetching and
//! writing them is the index synchronizer's job.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::descriptor::{PluginDescriptor, null_as_default};

/// Key of the registry-wide catalog.
pub const REGISTRY_CATALOG_KEY: &str = "index.json";

/// Download information for one architecture variant of a version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchitectureInfo {
    /// Hex-encoded SHA-256 of the artifact bytes.
    pub checksum: String,
    pub download_url: String,
    /// Artifact size in bytes.
    pub size: u64,
}

/// One published version of a plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionRecord {
    /// Descriptor snapshot taken at publish time.
    pub metadata: PluginDescriptor,
    pub version: String,
    /// Keyed by `<os>_<arch>`.
    #[serde(deserialize_with = "null_as_default")]
    pub architectures: BTreeMap<String, ArchitectureInfo>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Summary of one plugin in the registry catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryEntry {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub official: bool,
    pub latest_version: Option<VersionRecord>,
}

/// Release history of a single plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginCatalog {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub official: bool,
    pub latest_version: Option<VersionRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub versions: Vec<VersionRecord>,
}

impl PluginCatalog {
    /// Minimal catalog for a plugin that has never been published.
    pub fn empty(plugin_id: &str) -> Self {
        Self {
            id: plugin_id.to_string(),
            name: plugin_id.to_string(),
            ..Default::default()
        }
    }

    /// Object key of a plugin's catalog: `<plugin-id>/index.json`.
    pub fn object_key(plugin_id: &str) -> String {
        format!("{plugin_id}/index.json")
    }

    /// Record a version and mirror it into `latest_version`.
    ///
    /// A version that already exists is updated in place: its `created`
    /// timestamp is kept, architecture entries are merged, and metadata and
    /// `updated` come from `record`. Otherwise the record is appended.
    pub fn record_version(&mut self, record: VersionRecord) -> &VersionRecord {
        let index = match self
            .versions
            .iter()
            .position(|existing| existing.version == record.version)
        {
            Some(index) => {
                let existing = &mut self.versions[index];
                existing.architectures.extend(record.architectures);
                existing.metadata = record.metadata;
                existing.updated = record.updated;
                index
            }
            None => {
                self.versions.push(record);
                self.versions.len() - 1
            }
        };

        self.latest_version = Some(self.versions[index].clone());
        &self.versions[index]
    }

    /// Display metadata always comes from the descriptor.
    pub fn refresh_display(&mut self, descriptor: &PluginDescriptor) {
        self.name = descriptor.name.clone();
        self.description = descriptor.description.clone();
        self.icon = descriptor.icon.clone();
    }

    /// Registry summary of this plugin, marked official.
    pub fn to_entry(&self) -> RegistryEntry {
        RegistryEntry {
            id: self.id.clone(),
            name: self.name.clone(),
            icon: self.icon.clone(),
            description: self.description.clone(),
            official: true,
            latest_version: self.latest_version.clone(),
        }
    }
}

/// The set of known plugins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryCatalog {
    #[serde(deserialize_with = "null_as_default")]
    pub plugins: Vec<RegistryEntry>,
}

impl RegistryCatalog {
    /// Replace the entry with the same id, or append a new one.
    ///
    /// Returns `true` when a new entry was appended.
    pub fn upsert(&mut self, entry: RegistryEntry) -> bool {
        match self.plugins.iter_mut().find(|p| p.id == entry.id) {
            Some(existing) => {
                *existing = entry;
                false
            }
            None => {
                self.plugins.push(entry);
                true
            }
        }
    }

    pub fn get(&self, plugin_id: &str) -> Option<&RegistryEntry> {
        self.plugins.iter().find(|p| p.id == plugin_id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn record(version: &str, arch: &str, at: DateTime<Utc>) -> VersionRecord {
        let mut architectures = BTreeMap::new();
        architectures.insert(
            arch.to_string(),
            ArchitectureInfo {
                checksum: "abc".into(),
                download_url: format!("p/{version}/{arch}.tar.gz"),
                size: 10,
            },
        );
        VersionRecord {
            metadata: PluginDescriptor::default(),
            version: version.to_string(),
            architectures,
            created: at,
            updated: at,
        }
    }

    #[test]
    fn empty_catalog_is_keyed_by_id() {
        let catalog = PluginCatalog::empty("p");
        assert_eq!(catalog.id, "p");
        assert_eq!(catalog.name, "p");
        assert!(catalog.versions.is_empty());
        assert_eq!(PluginCatalog::object_key("p"), "p/index.json");
    }

    #[test]
    fn republish_updates_in_place() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();

        let mut catalog = PluginCatalog::empty("p");
        catalog.record_version(record("1.2.0", "linux_amd64", t0));
        catalog.record_version(record("1.2.0", "darwin_arm64", t1));

        assert_eq!(catalog.versions.len(), 1);
        let v = &catalog.versions[0];
        assert_eq!(v.created, t0);
        assert_eq!(v.updated, t1);
        assert_eq!(v.architectures.len(), 2);
        assert_eq!(catalog.latest_version.as_ref(), Some(v));
    }

    #[test]
    fn new_version_is_appended_and_becomes_latest() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut catalog = PluginCatalog::empty("p");
        catalog.record_version(record("1.0.0", "linux_amd64", t0));
        catalog.record_version(record("1.1.0", "linux_amd64", t0));

        let versions: Vec<&str> = catalog.versions.iter().map(|v| v.version.as_str()).collect();
        assert_eq!(versions, vec!["1.0.0", "1.1.0"]);
        assert_eq!(catalog.latest_version.unwrap().version, "1.1.0");
    }

    #[test]
    fn upsert_replaces_by_id() {
        let mut registry = RegistryCatalog::default();
        let mut entry = PluginCatalog::empty("q").to_entry();
        assert!(registry.upsert(entry.clone()));

        entry.description = "changed".into();
        assert!(!registry.upsert(entry));
        assert_eq!(registry.plugins.len(), 1);
        assert_eq!(registry.get("q").unwrap().description, "changed");
        assert!(registry.get("q").unwrap().official);
    }

    #[test]
    fn decodes_catalog_with_nulls_and_zero_times() {
        let json = r#"{
            "id": "p", "name": "P", "icon": "", "description": "", "official": true,
            "latest_version": {"metadata": {}, "version": "", "architectures": null,
                "created": "0001-01-01T00:00:00Z", "updated": "0001-01-01T00:00:00Z"},
            "versions": null
        }"#;
        let catalog: PluginCatalog = serde_json::from_str(json).unwrap();
        assert!(catalog.versions.is_empty());
        assert!(catalog.latest_version.unwrap().architectures.is_empty());
    }
}
