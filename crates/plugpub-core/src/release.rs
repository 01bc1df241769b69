// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Releases: one (plugin, version, platform) artifact destined for the registry.

use std::fmt;
use std::path::PathBuf;

use crate::platform::{Arch, Os, PlatformTarget};

/// A single per-platform artifact of a plugin version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub plugin: String,
    pub version: String,
    pub target: PlatformTarget,
    /// Local path of the `.tar.gz` artifact.
    pub path: PathBuf,
}

impl Release {
    /// Object key of the artifact: `<plugin>/<version>/<os>-<arch>.tar.gz`.
    pub fn remote_key(&self) -> String {
        format!(
            "{}/{}/{}-{}.tar.gz",
            self.plugin, self.version, self.target.os, self.target.arch
        )
    }

    /// Architecture key used inside catalogs: `<os>_<arch>`.
    pub fn os_arch(&self) -> String {
        self.target.key()
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}/{}] - {}",
            self.plugin, self.target.os, self.target.arch, self.version
        )
    }
}

/// Everything needed to publish one plugin version.
///
/// Per-platform paths left empty produce no release.
#[derive(Debug, Clone, Default)]
pub struct PublishRequest {
    pub plugin: String,
    pub version: String,
    /// Path to the plugin descriptor used as the catalog metadata snapshot.
    pub metadata_path: PathBuf,
    pub darwin_arm64: Option<PathBuf>,
    pub darwin_amd64: Option<PathBuf>,
    pub windows_arm64: Option<PathBuf>,
    pub windows_amd64: Option<PathBuf>,
    pub linux_arm64: Option<PathBuf>,
    pub linux_amd64: Option<PathBuf>,
}

impl PublishRequest {
    /// Set the artifact path for a target.
    pub fn set_artifact(&mut self, target: PlatformTarget, path: PathBuf) {
        let slot = match (target.os, target.arch) {
            (Os::Darwin, Arch::Arm64) => &mut self.darwin_arm64,
            (Os::Darwin, Arch::Amd64) => &mut self.darwin_amd64,
            (Os::Windows, Arch::Arm64) => &mut self.windows_arm64,
            (Os::Windows, Arch::Amd64) => &mut self.windows_amd64,
            (Os::Linux, Arch::Arm64) => &mut self.linux_arm64,
            (Os::Linux, Arch::Amd64) => &mut self.linux_amd64,
        };
        *slot = Some(path);
    }

    /// Derive the releases in a fixed platform order.
    pub fn to_releases(&self) -> Vec<Release> {
        let slots = [
            (Os::Darwin, Arch::Arm64, &self.darwin_arm64),
            (Os::Darwin, Arch::Amd64, &self.darwin_amd64),
            (Os::Windows, Arch::Arm64, &self.windows_arm64),
            (Os::Windows, Arch::Amd64, &self.windows_amd64),
            (Os::Linux, Arch::Arm64, &self.linux_arm64),
            (Os::Linux, Arch::Amd64, &self.linux_amd64),
        ];

        slots
            .into_iter()
            .filter_map(|(os, arch, path)| {
                let path = path.as_ref().filter(|p| !p.as_os_str().is_empty())?;
                Some(Release {
                    plugin: self.plugin.clone(),
                    version: self.version.clone(),
                    target: PlatformTarget::new(os, arch),
                    path: path.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_key_uses_hyphen_and_os_arch_uses_underscore() {
        let release = Release {
            plugin: "p".into(),
            version: "1.2.0".into(),
            target: PlatformTarget::new(Os::Linux, Arch::Amd64),
            path: PathBuf::from("build/linux_amd64.tar.gz"),
        };
        assert_eq!(release.remote_key(), "p/1.2.0/linux-amd64.tar.gz");
        assert_eq!(release.os_arch(), "linux_amd64");
        assert_eq!(release.to_string(), "p [linux/amd64] - 1.2.0");
    }

    #[test]
    fn only_non_empty_paths_produce_releases() {
        let request = PublishRequest {
            plugin: "p".into(),
            version: "1.0.0".into(),
            linux_amd64: Some("a.tar.gz".into()),
            darwin_arm64: Some("b.tar.gz".into()),
            windows_amd64: Some(PathBuf::new()),
            ..Default::default()
        };
        let releases = request.to_releases();
        let keys: Vec<String> = releases.iter().map(|r| r.os_arch()).collect();
        assert_eq!(keys, vec!["darwin_arm64", "linux_amd64"]);
        assert!(releases.iter().all(|r| r.plugin == "p" && r.version == "1.0.0"));
    }

    #[test]
    fn set_artifact_fills_matching_slot() {
        let mut request = PublishRequest::default();
        request.set_artifact(
            PlatformTarget::new(Os::Windows, Arch::Arm64),
            "w.tar.gz".into(),
        );
        assert_eq!(
            request.windows_arm64.as_deref(),
            Some(std::path::Path::new("w.tar.gz"))
        );
        assert_eq!(request.to_releases().len(), 1);
    }
}
