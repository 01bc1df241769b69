// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subprocess-backed [`Builder`] and [`UiBundler`] implementations.
//!
//! Both run an external toolchain (by default `go build` and `pnpm run build`)
//! and treat it as opaque: a zero exit status is success, anything else is a
//! build error carrying the combined output.

use std::path::{Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use plugpub_config::{CompilerConfig, UiConfig};
use plugpub_core::{BuildError, Builder, CompileRequest, UiBundler};
use tokio::process::Command;
use tracing::debug;

/// Compiles plugin binaries by invoking the configured compiler.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    config: CompilerConfig,
}

impl CommandBuilder {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    /// Arguments with `{output}`, `{os}`, `{arch}`, and `{version}` substituted.
    pub fn render_args(&self, request: &CompileRequest) -> Vec<String> {
        let output = request.output.display().to_string();
        let os = request.target.os.to_string();
        let arch = request.target.arch.to_string();
        self.config
            .args
            .iter()
            .map(|arg| {
                arg.replace("{output}", &output)
                    .replace("{os}", &os)
                    .replace("{arch}", &arch)
                    .replace("{version}", &request.version)
            })
            .collect()
    }
}

#[async_trait]
impl Builder for CommandBuilder {
    async fn compile(&self, request: &CompileRequest) -> Result<PathBuf, BuildError> {
        let platform = request.target.key();
        let args = self.render_args(request);
        debug!(%platform, program = %self.config.program, ?args, "running compiler");

        let output = Command::new(&self.config.program)
            .args(&args)
            .current_dir(&request.plugin_dir)
            .env(&self.config.os_env, request.target.os.to_string())
            .env(&self.config.arch_env, request.target.arch.to_string())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| BuildError::Binary {
                platform: platform.clone(),
                message: format!("failed to run `{}`: {e}", self.config.program),
            })?;

        if !output.status.success() {
            return Err(BuildError::Binary {
                platform,
                message: failure_message(&self.config.program, &output),
            });
        }

        Ok(request.output.clone())
    }
}

/// Builds the shared UI by invoking the configured bundler in the UI directory.
#[derive(Debug, Clone)]
pub struct CommandBundler {
    config: UiConfig,
}

impl CommandBundler {
    pub fn new(config: UiConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl UiBundler for CommandBundler {
    async fn bundle(&self, plugin_dir: &Path) -> Result<PathBuf, BuildError> {
        let ui_dir = plugin_dir.join(&self.config.dir);
        debug!(dir = %ui_dir.display(), program = %self.config.program, "running UI build");

        let output = Command::new(&self.config.program)
            .args(&self.config.args)
            .current_dir(&ui_dir)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| BuildError::Ui {
                message: format!(
                    "failed to run `{}` in {}: {e}",
                    self.config.program,
                    ui_dir.display()
                ),
            })?;

        if !output.status.success() {
            return Err(BuildError::Ui {
                message: failure_message(&self.config.program, &output),
            });
        }

        let dist = ui_dir.join(&self.config.dist);
        if !dist.is_dir() {
            return Err(BuildError::Ui {
                message: format!("UI build produced no assets at {}", dist.display()),
            });
        }
        Ok(dist)
    }
}

fn failure_message(program: &str, output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!(
        "`{program}` exited with {}\n{}{}",
        output.status,
        stdout.trim_end(),
        if stderr.trim().is_empty() {
            String::new()
        } else {
            format!("\n{}", stderr.trim_end())
        }
    )
}

#[cfg(test)]
mod tests {
    use plugpub_core::{Arch, Os, PlatformTarget};

    use super::*;

    fn request(dir: &Path) -> CompileRequest {
        CompileRequest {
            plugin_dir: dir.to_path_buf(),
            target: PlatformTarget::new(Os::Windows, Arch::Arm64),
            version: "1.2.0".into(),
            output: dir.join("build/windows_arm64/bin/plugin.exe"),
        }
    }

    #[test]
    fn placeholders_are_substituted() {
        let builder = CommandBuilder::new(CompilerConfig {
            args: vec![
                "build".into(),
                "-ldflags=-X main.version={version}".into(),
                "-o".into(),
                "{output}".into(),
                "./cmd/{os}-{arch}".into(),
            ],
            ..CompilerConfig::default()
        });
        let req = request(Path::new("/src/p"));
        let args = builder.render_args(&req);
        assert_eq!(args[1], "-ldflags=-X main.version=1.2.0");
        assert_eq!(args[3], req.output.display().to_string());
        assert_eq!(args[4], "./cmd/windows-arm64");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn compiler_receives_target_env() {
        let dir = tempfile::tempdir().unwrap();
        let builder = CommandBuilder::new(CompilerConfig {
            program: "sh".into(),
            args: vec![
                "-c".into(),
                "mkdir -p \"$(dirname \"$0\")\" && echo \"$GOOS/$GOARCH\" > \"$0\"".into(),
                "{output}".into(),
            ],
            ..CompilerConfig::default()
        });
        let req = request(dir.path());

        let out = builder.compile(&req).await.unwrap();
        assert_eq!(out, req.output);
        assert_eq!(
            std::fs::read_to_string(&out).unwrap().trim(),
            "windows/arm64"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_binary_error_with_output() {
        let dir = tempfile::tempdir().unwrap();
        let builder = CommandBuilder::new(CompilerConfig {
            program: "sh".into(),
            args: vec!["-c".into(), "echo 'undefined: foo' >&2; exit 2".into()],
            ..CompilerConfig::default()
        });

        match builder.compile(&request(dir.path())).await {
            Err(BuildError::Binary { platform, message }) => {
                assert_eq!(platform, "windows_arm64");
                assert!(message.contains("undefined: foo"), "{message}");
            }
            other => panic!("expected Binary error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_binary_error() {
        let dir = tempfile::tempdir().unwrap();
        let builder = CommandBuilder::new(CompilerConfig {
            program: "plugpub-no-such-compiler".into(),
            ..CompilerConfig::default()
        });
        let err = builder.compile(&request(dir.path())).await.unwrap_err();
        assert!(matches!(err, BuildError::Binary { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn bundler_returns_dist_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("ui")).unwrap();
        let bundler = CommandBundler::new(UiConfig {
            program: "sh".into(),
            args: vec![
                "-c".into(),
                "mkdir -p dist/assets && echo ok > dist/assets/index.js".into(),
            ],
            ..UiConfig::default()
        });

        let dist = bundler.bundle(dir.path()).await.unwrap();
        assert_eq!(dist, dir.path().join("ui/dist/assets"));
        assert!(dist.join("index.js").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn bundler_without_assets_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("ui")).unwrap();
        let bundler = CommandBundler::new(UiConfig {
            program: "true".into(),
            args: vec![],
            ..UiConfig::default()
        });
        let err = bundler.bundle(dir.path()).await.unwrap_err();
        assert!(matches!(err, BuildError::Ui { ref message } if message.contains("no assets")));
    }
}
