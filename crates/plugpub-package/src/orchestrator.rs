// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Build orchestrator: one shared UI build plus N concurrent binary builds.
//!
//! Every target gets an isolated staging directory `<out_root>/<os>_<arch>`
//! holding the plugin descriptor, `bin/<binary>` and, once the UI build has
//! finished, `assets/`. Results are collected from all tasks first and the UI
//! outcome is applied afterwards, so no task ever mutates another's result.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use plugpub_core::{BuildError, Builder, CompileRequest, PlatformTarget, UiBundler};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::fsutil::copy_dir_all;

/// Result of building one target.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub target: PlatformTarget,
    pub staging_dir: PathBuf,
    /// Path of the built binary, or why this target cannot be packaged.
    pub result: Result<PathBuf, BuildError>,
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs the builds for a set of targets.
pub struct BuildOrchestrator {
    builder: Arc<dyn Builder>,
    bundler: Arc<dyn UiBundler>,
    descriptor_file: String,
    binary_name: String,
}

impl BuildOrchestrator {
    pub fn new(builder: Arc<dyn Builder>, bundler: Arc<dyn UiBundler>) -> Self {
        Self {
            builder,
            bundler,
            descriptor_file: "plugin.yaml".to_string(),
            binary_name: "plugin".to_string(),
        }
    }

    /// Descriptor file name at the plugin root.
    pub fn with_descriptor_file(mut self, name: impl Into<String>) -> Self {
        self.descriptor_file = name.into();
        self
    }

    /// Base name of the built binary.
    pub fn with_binary_name(mut self, name: impl Into<String>) -> Self {
        self.binary_name = name.into();
        self
    }

    pub fn descriptor_file(&self) -> &str {
        &self.descriptor_file
    }

    /// Build every target and return exactly one outcome per target, in input order.
    pub async fn build_all(
        &self,
        plugin_dir: &Path,
        out_root: &Path,
        version: &str,
        platforms: &[PlatformTarget],
    ) -> Vec<BuildOutcome> {
        let descriptor = plugin_dir.join(&self.descriptor_file);

        // Stage every target before any build starts.
        let mut staged = Vec::with_capacity(platforms.len());
        for &target in platforms {
            let dir = out_root.join(target.key());
            let result = stage(&dir, &descriptor, &self.descriptor_file)
                .await
                .map_err(|e| {
                    warn!(platform = %target, error = %e, "failed to prepare staging directory");
                    BuildError::Staging {
                        platform: target.key(),
                        message: e.to_string(),
                    }
                });
            staged.push((target, dir, result));
        }

        let asset_dirs: Vec<(String, PathBuf)> = staged
            .iter()
            .filter(|(_, _, result)| result.is_ok())
            .map(|(target, dir, _)| (target.key(), dir.join("assets")))
            .collect();
        let ui_task = tokio::spawn(build_ui(
            Arc::clone(&self.bundler),
            plugin_dir.to_path_buf(),
            asset_dirs,
        ));

        let tasks: Vec<(PlatformTarget, PathBuf, Result<JoinHandle<_>, BuildError>)> = staged
            .into_iter()
            .map(|(target, dir, result)| {
                let task = result.map(|()| {
                    let request = CompileRequest {
                        plugin_dir: plugin_dir.to_path_buf(),
                        target,
                        version: version.to_string(),
                        output: dir.join("bin").join(target.binary_name(&self.binary_name)),
                    };
                    tokio::spawn(build_binary(Arc::clone(&self.builder), request))
                });
                (target, dir, task)
            })
            .collect();

        // Phase one: wait for all N + 1 tasks.
        let (ui_joined, outcomes) = tokio::join!(
            ui_task,
            join_all(tasks.into_iter().map(|(target, staging_dir, task)| async move {
                let result = match task {
                    Ok(handle) => handle.await.unwrap_or_else(|e| {
                        Err(BuildError::Binary {
                            platform: target.key(),
                            message: format!("build task failed: {e}"),
                        })
                    }),
                    Err(staging) => Err(staging),
                };
                BuildOutcome {
                    target,
                    staging_dir,
                    result,
                }
            }))
        );
        let ui_result = ui_joined.unwrap_or_else(|e| {
            Err(BuildError::Ui {
                message: format!("UI build task failed: {e}"),
            })
        });

        // Phase two: apply the UI outcome.
        apply_ui_result(outcomes, ui_result)
    }
}

/// Mark every otherwise successful outcome failed when the UI build failed.
///
/// Outcomes that already failed keep their own cause.
pub fn apply_ui_result(
    outcomes: Vec<BuildOutcome>,
    ui_result: Result<(), BuildError>,
) -> Vec<BuildOutcome> {
    let Err(ui_error) = ui_result else {
        return outcomes;
    };
    warn!(error = %ui_error, "UI build failed, invalidating all platform builds");

    outcomes
        .into_iter()
        .map(|mut outcome| {
            if outcome.result.is_ok() {
                outcome.result = Err(BuildError::UiInvalidated {
                    cause: Box::new(ui_error.clone()),
                });
            }
            outcome
        })
        .collect()
}

async fn stage(dir: &Path, descriptor: &Path, descriptor_file: &str) -> io::Result<()> {
    tokio::fs::create_dir_all(dir.join("bin")).await?;
    tokio::fs::copy(descriptor, dir.join(descriptor_file)).await?;
    Ok(())
}

async fn build_binary(
    builder: Arc<dyn Builder>,
    request: CompileRequest,
) -> Result<PathBuf, BuildError> {
    let platform = request.target;
    if tokio::fs::try_exists(&request.output).await.unwrap_or(false) {
        info!(%platform, "binary already built, skipping");
        return Ok(request.output);
    }

    info!(%platform, "building binary");
    match builder.compile(&request).await {
        Ok(path) => {
            info!(%platform, "built binary");
            Ok(path)
        }
        Err(e) => {
            warn!(%platform, error = %e, "binary build failed");
            Err(e)
        }
    }
}

async fn build_ui(
    bundler: Arc<dyn UiBundler>,
    plugin_dir: PathBuf,
    asset_dirs: Vec<(String, PathBuf)>,
) -> Result<(), BuildError> {
    info!("building UI");
    let assets = bundler.bundle(&plugin_dir).await?;

    tokio::task::spawn_blocking(move || {
        for (platform, dest) in &asset_dirs {
            copy_dir_all(&assets, dest).map_err(|e| BuildError::Ui {
                message: format!("failed to copy UI assets to {platform}: {e}"),
            })?;
        }
        info!(platforms = asset_dirs.len(), "built and distributed UI assets");
        Ok(())
    })
    .await
    .map_err(|e| BuildError::Ui {
        message: format!("asset copy task failed: {e}"),
    })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugpub_core::{Arch, Os};

    fn outcome(target: PlatformTarget, result: Result<PathBuf, BuildError>) -> BuildOutcome {
        BuildOutcome {
            target,
            staging_dir: PathBuf::from(target.key()),
            result,
        }
    }

    #[test]
    fn ui_success_leaves_outcomes_untouched() {
        let linux = PlatformTarget::new(Os::Linux, Arch::Amd64);
        let outcomes = vec![outcome(linux, Ok("bin/plugin".into()))];
        let applied = apply_ui_result(outcomes, Ok(()));
        assert!(applied[0].is_success());
    }

    #[test]
    fn ui_failure_invalidates_successes_only() {
        let linux = PlatformTarget::new(Os::Linux, Arch::Amd64);
        let mac = PlatformTarget::new(Os::Darwin, Arch::Arm64);
        let binary_err = BuildError::Binary {
            platform: mac.key(),
            message: "boom".into(),
        };
        let ui_err = BuildError::Ui {
            message: "pnpm failed".into(),
        };

        let applied = apply_ui_result(
            vec![
                outcome(linux, Ok("bin/plugin".into())),
                outcome(mac, Err(binary_err.clone())),
            ],
            Err(ui_err.clone()),
        );

        let linux_err = applied[0].result.as_ref().unwrap_err();
        assert_eq!(linux_err.root_cause(), &ui_err);
        assert_eq!(applied[1].result.as_ref().unwrap_err(), &binary_err);
    }
}
