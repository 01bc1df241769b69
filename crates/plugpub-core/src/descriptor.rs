// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin descriptor (`plugin.yaml`) loading and validation.
//!
//! The descriptor is the static metadata file at the root of a plugin. It is
//! copied into every platform package and embedded as a snapshot into each
//! published catalog version.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::RegistryError;

/// Capabilities that require a backend binary.
const BACKEND_CAPABILITIES: [&str; 4] = ["resource", "exec", "networker", "settings"];

/// Parsed plugin descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginDescriptor {
    pub id: String,
    pub version: String,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub repository: String,
    pub website: String,
    #[serde(deserialize_with = "null_as_default")]
    pub maintainers: Vec<Maintainer>,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub dependencies: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub capabilities: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub theme: Theme,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Maintainer {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    #[serde(deserialize_with = "null_as_default")]
    pub colors: ThemeColors,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeColors {
    pub primary: String,
    pub secondary: String,
    pub tertiary: String,
}

impl PluginDescriptor {
    /// Read and parse a descriptor file. Does not validate.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|e| RegistryError::Descriptor {
            path: path.to_path_buf(),
            message: format!("failed to read plugin metadata: {e}"),
        })?;
        Self::parse(&content).map_err(|message| RegistryError::Descriptor {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse descriptor YAML content.
    pub fn parse(content: &str) -> Result<Self, String> {
        serde_yaml::from_str(content).map_err(|e| format!("failed to parse descriptor: {e}"))
    }

    /// Check that every required field is present.
    ///
    /// All missing fields are reported together.
    pub fn validate(&self) -> Result<(), RegistryError> {
        let mut missing = Vec::new();

        let required = [
            ("id", self.id.is_empty()),
            ("name", self.name.is_empty()),
            ("version", self.version.is_empty()),
            ("description", self.description.is_empty()),
            ("repository", self.repository.is_empty()),
            ("website", self.website.is_empty()),
            ("maintainers", self.maintainers.is_empty()),
            ("capabilities", self.capabilities.is_empty()),
        ];
        for (field, absent) in required {
            if absent {
                missing.push(field.to_string());
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(RegistryError::MissingFields(missing))
        }
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    /// Write the descriptor back out as YAML.
    pub fn save(&self, path: &Path) -> Result<(), RegistryError> {
        let out = serde_yaml::to_string(self).map_err(|e| RegistryError::Descriptor {
            path: path.to_path_buf(),
            message: format!("failed to serialize descriptor: {e}"),
        })?;
        std::fs::write(path, out).map_err(|e| RegistryError::io(path, e))
    }

    /// Whether the plugin ships a UI.
    pub fn has_ui_capability(&self) -> bool {
        self.capabilities.iter().any(|c| c == "ui")
    }

    /// Whether the plugin ships a backend binary.
    pub fn has_backend_capability(&self) -> bool {
        self.capabilities
            .iter()
            .any(|c| BACKEND_CAPABILITIES.contains(&c.as_str()))
    }
}

/// Decode an explicit `null` as the type's default.
///
/// Catalogs written by other tooling encode empty lists as `null`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r##"
id: kubernetes
version: 0.1.0
name: Kubernetes
icon: LuShip
description: Manage Kubernetes clusters
repository: https://github.com/example/kubernetes-plugin
website: https://example.dev
maintainers:
  - name: Jane Doe
    email: jane@example.dev
tags: [k8s, containers]
capabilities: [resource, ui]
theme:
  colors:
    primary: "#326CE5"
"##;

    #[test]
    fn parse_full_descriptor() {
        let desc = PluginDescriptor::parse(FULL).unwrap();
        assert_eq!(desc.id, "kubernetes");
        assert_eq!(desc.maintainers.len(), 1);
        assert_eq!(desc.maintainers[0].email, "jane@example.dev");
        assert_eq!(desc.tags, vec!["k8s", "containers"]);
        assert!(desc.dependencies.is_empty());
        assert_eq!(desc.theme.colors.primary, "#326CE5");
        assert!(desc.validate().is_ok());
        assert!(desc.has_ui_capability());
        assert!(desc.has_backend_capability());
    }

    #[test]
    fn validate_reports_all_missing_fields_in_order() {
        let desc = PluginDescriptor {
            id: "p".into(),
            name: "P".into(),
            ..Default::default()
        };
        match desc.validate() {
            Err(RegistryError::MissingFields(fields)) => assert_eq!(
                fields,
                vec![
                    "version",
                    "description",
                    "repository",
                    "website",
                    "maintainers",
                    "capabilities"
                ]
            ),
            other => panic!("expected MissingFields, got {other:?}"),
        }
    }

    #[test]
    fn json_nulls_decode_as_empty() {
        let json = r#"{"id":"p","tags":null,"dependencies":null,"maintainers":null,"capabilities":["ui"]}"#;
        let desc: PluginDescriptor = serde_json::from_str(json).unwrap();
        assert!(desc.tags.is_empty());
        assert!(desc.maintainers.is_empty());
        assert!(!desc.has_backend_capability());
    }

    #[test]
    fn save_and_reload_keeps_new_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plugin.yaml");
        let mut desc = PluginDescriptor::parse(FULL).unwrap();
        desc.set_version("2.0.0");
        desc.save(&path).unwrap();

        let reloaded = PluginDescriptor::load(&path).unwrap();
        assert_eq!(reloaded.version, "2.0.0");
        assert_eq!(reloaded, desc);
    }

    #[test]
    fn load_missing_file_is_descriptor_error() {
        let err = PluginDescriptor::load(Path::new("/nonexistent/plugin.yaml")).unwrap_err();
        assert!(matches!(err, RegistryError::Descriptor { .. }));
    }
}
