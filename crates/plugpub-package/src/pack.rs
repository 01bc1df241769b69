// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The packaging pipeline: validate, build, archive.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use plugpub_config::PackageConfig;
use plugpub_core::{BuildError, PlatformTarget, PluginDescriptor, PublishRequest, RegistryError};
use tracing::{info, warn};

use crate::archive::{ArchiveOutput, tar_gz};
use crate::orchestrator::BuildOrchestrator;

/// Inputs of one packaging run.
#[derive(Debug, Clone)]
pub struct PackageOptions {
    pub plugin_dir: PathBuf,
    /// Output directory, relative to `plugin_dir` unless absolute.
    pub out_dir: PathBuf,
    /// Overrides the descriptor's version when set.
    pub version: Option<String>,
    /// Remove the output directory before building.
    pub clean: bool,
    pub platforms: Vec<PlatformTarget>,
}

impl PackageOptions {
    /// Options for `plugin_dir` taken from the packaging configuration.
    pub fn from_config(
        plugin_dir: impl Into<PathBuf>,
        config: &PackageConfig,
    ) -> Result<Self, RegistryError> {
        Ok(Self {
            plugin_dir: plugin_dir.into(),
            out_dir: config.out_dir.clone(),
            version: None,
            clean: config.clean,
            platforms: config.targets().map_err(RegistryError::Config)?,
        })
    }
}

/// A platform archive ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedArtifact {
    pub target: PlatformTarget,
    pub archive: ArchiveOutput,
}

/// Why a platform produced no artifact.
#[derive(Debug)]
pub enum PackageFailure {
    Build(BuildError),
    Archive(RegistryError),
}

impl fmt::Display for PackageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageFailure::Build(e) => write!(f, "{e}"),
            PackageFailure::Archive(e) => write!(f, "{e}"),
        }
    }
}

#[derive(Debug)]
pub struct PlatformFailure {
    pub target: PlatformTarget,
    pub cause: PackageFailure,
}

/// Summary of a packaging run.
#[derive(Debug)]
pub struct PackageReport {
    /// The descriptor as written back (version override applied).
    pub descriptor: PluginDescriptor,
    pub descriptor_path: PathBuf,
    pub out_dir: PathBuf,
    pub artifacts: Vec<PackagedArtifact>,
    pub failures: Vec<PlatformFailure>,
}

impl PackageReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Publish request covering exactly the artifacts that were packaged.
    pub fn to_publish_request(&self) -> PublishRequest {
        let mut request = PublishRequest {
            plugin: self.descriptor.id.clone(),
            version: self.descriptor.version.clone(),
            metadata_path: self.descriptor_path.clone(),
            ..Default::default()
        };
        for artifact in &self.artifacts {
            request.set_artifact(artifact.target, artifact.archive.archive.clone());
        }
        request
    }
}

/// Resolve and check the output directory against the plugin directory.
///
/// The result is absolute with `.` and `..` removed. It may not be the
/// plugin directory or one of its ancestors, since cleaning would delete
/// the plugin sources.
pub fn resolve_out_dir(plugin_dir: &Path, out_dir: &Path) -> Result<PathBuf, RegistryError> {
    if out_dir.as_os_str().is_empty() {
        return Err(RegistryError::Validation(
            "cannot build to an empty output directory".to_string(),
        ));
    }

    let plugin_root = std::path::absolute(plugin_dir)
        .map(|p| normalize(&p))
        .map_err(|e| RegistryError::io(plugin_dir, e))?;
    let resolved = std::path::absolute(plugin_root.join(out_dir))
        .map(|p| normalize(&p))
        .map_err(|e| RegistryError::io(out_dir, e))?;

    if resolved.parent().is_none() {
        return Err(RegistryError::Validation(
            "refusing to use the root directory as the output directory".to_string(),
        ));
    }
    if plugin_root.starts_with(&resolved) {
        return Err(RegistryError::Validation(format!(
            "output directory {} contains the plugin directory {}",
            resolved.display(),
            plugin_root.display()
        )));
    }
    Ok(resolved)
}

/// Drop `.` and fold `..` into its parent without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Run the full packaging pipeline for one plugin.
///
/// Validation failures abort before anything is built or deleted. Build and
/// archive failures are per platform and end up in the report.
pub async fn run_package(
    orchestrator: &BuildOrchestrator,
    options: &PackageOptions,
) -> Result<PackageReport, RegistryError> {
    if options.platforms.is_empty() {
        return Err(RegistryError::Validation(
            "no target platforms selected".to_string(),
        ));
    }
    let out_dir = resolve_out_dir(&options.plugin_dir, &options.out_dir)?;

    let descriptor_path = options.plugin_dir.join(orchestrator.descriptor_file());
    let mut descriptor = PluginDescriptor::load(&descriptor_path)?;
    if let Some(version) = options.version.as_deref().filter(|v| !v.trim().is_empty()) {
        descriptor.set_version(version);
    }
    descriptor.validate()?;
    if options.version.is_some() {
        descriptor.save(&descriptor_path)?;
    }

    if options.clean && tokio::fs::try_exists(&out_dir).await.unwrap_or(false) {
        info!(dir = %out_dir.display(), "cleaning output directory");
        tokio::fs::remove_dir_all(&out_dir)
            .await
            .map_err(|e| RegistryError::io(&out_dir, e))?;
    }
    tokio::fs::create_dir_all(&out_dir)
        .await
        .map_err(|e| RegistryError::io(&out_dir, e))?;

    info!(
        plugin = %descriptor.id,
        version = %descriptor.version,
        platforms = options.platforms.len(),
        "packaging plugin"
    );
    let outcomes = orchestrator
        .build_all(
            &options.plugin_dir,
            &out_dir,
            &descriptor.version,
            &options.platforms,
        )
        .await;

    let mut artifacts = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        let target = outcome.target;
        if let Err(e) = outcome.result {
            warn!(platform = %target, error = %e, "build failed");
            failures.push(PlatformFailure {
                target,
                cause: PackageFailure::Build(e),
            });
            continue;
        }

        let dest = out_dir.join(format!("{}.tar.gz", target.key()));
        let staging = outcome.staging_dir;
        let archived = tokio::task::spawn_blocking(move || tar_gz(&staging, &dest))
            .await
            .unwrap_or_else(|e| {
                Err(RegistryError::Internal(format!("archive task failed: {e}")))
            });

        match archived {
            Ok(archive) => {
                info!(platform = %target, archive = %archive.archive.display(), "packaged");
                artifacts.push(PackagedArtifact { target, archive });
            }
            Err(e) => {
                warn!(platform = %target, error = %e, "archiving failed");
                failures.push(PlatformFailure {
                    target,
                    cause: PackageFailure::Archive(e),
                });
            }
        }
    }

    Ok(PackageReport {
        descriptor,
        descriptor_path,
        out_dir,
        artifacts,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_root_out_dirs_are_rejected() {
        let plugin = Path::new("/work/plugin");
        assert!(matches!(
            resolve_out_dir(plugin, Path::new("")),
            Err(RegistryError::Validation(_))
        ));
        assert!(matches!(
            resolve_out_dir(plugin, Path::new("/")),
            Err(RegistryError::Validation(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn plugin_dir_itself_is_rejected() {
        let plugin = Path::new("/work/plugin");
        assert!(matches!(
            resolve_out_dir(plugin, Path::new(".")),
            Err(RegistryError::Validation(_))
        ));
        assert!(matches!(
            resolve_out_dir(plugin, Path::new("/work/plugin")),
            Err(RegistryError::Validation(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn parent_components_cannot_reach_the_plugin_or_its_ancestors() {
        let plugin = Path::new("/work/plugin");
        for out in ["../plugin", "..", "../..", "build/../..", "./"] {
            assert!(
                matches!(
                    resolve_out_dir(plugin, Path::new(out)),
                    Err(RegistryError::Validation(_))
                ),
                "{out} should be rejected"
            );
        }
        assert!(matches!(
            resolve_out_dir(Path::new("/work/plugin/."), Path::new("/work")),
            Err(RegistryError::Validation(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn parent_components_are_folded() {
        let plugin = Path::new("/work/plugin");
        assert_eq!(
            resolve_out_dir(plugin, Path::new("../dist")).unwrap(),
            PathBuf::from("/work/dist")
        );
        assert_eq!(
            resolve_out_dir(plugin, Path::new("build/../out")).unwrap(),
            PathBuf::from("/work/plugin/out")
        );
    }

    #[cfg(unix)]
    #[test]
    fn relative_out_dir_resolves_under_plugin() {
        let plugin = Path::new("/work/plugin");
        assert_eq!(
            resolve_out_dir(plugin, Path::new("build")).unwrap(),
            PathBuf::from("/work/plugin/build")
        );
        assert_eq!(
            resolve_out_dir(plugin, Path::new("/tmp/out")).unwrap(),
            PathBuf::from("/tmp/out")
        );
    }
}
