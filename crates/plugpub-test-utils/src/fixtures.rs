// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin descriptor and artifact fixtures.

use std::path::{Path, PathBuf};

use plugpub_core::{Maintainer, PluginDescriptor};
use tempfile::TempDir;

/// A complete, valid descriptor for `id` at `version`.
pub fn descriptor(id: &str, version: &str) -> PluginDescriptor {
    PluginDescriptor {
        id: id.to_string(),
        version: version.to_string(),
        name: format!("{id} plugin"),
        icon: "LuBox".to_string(),
        description: format!("The {id} plugin"),
        repository: format!("https://github.com/example/{id}"),
        website: "https://example.dev".to_string(),
        maintainers: vec![Maintainer {
            name: "Jane Doe".to_string(),
            email: "jane@example.dev".to_string(),
        }],
        tags: vec!["test".to_string()],
        capabilities: vec!["resource".to_string(), "ui".to_string()],
        ..Default::default()
    }
}

/// A plugin source tree in a temporary directory.
pub struct PluginFixture {
    dir: TempDir,
    pub descriptor: PluginDescriptor,
}

impl PluginFixture {
    /// Create a plugin directory holding a valid `plugin.yaml`.
    pub fn new(id: &str, version: &str) -> std::io::Result<Self> {
        Self::with_descriptor(descriptor(id, version))
    }

    pub fn with_descriptor(descriptor: PluginDescriptor) -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        descriptor
            .save(&dir.path().join("plugin.yaml"))
            .map_err(std::io::Error::other)?;
        Ok(Self { dir, descriptor })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.dir.path().join("plugin.yaml")
    }

    /// Write a fake artifact file and return its path.
    pub fn artifact(&self, name: &str, content: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join("artifacts").join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_descriptor_is_valid_and_on_disk() {
        let fixture = PluginFixture::new("p", "1.2.0").unwrap();
        let loaded = PluginDescriptor::load(&fixture.descriptor_path()).unwrap();
        assert!(loaded.validate().is_ok());
        assert_eq!(loaded, fixture.descriptor);
    }
}
