// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock build tools for deterministic orchestrator tests.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use plugpub_core::{BuildError, Builder, CompileRequest, PlatformTarget, UiBundler};
use tokio::sync::Mutex;

/// A compiler that writes a small fake binary, or fails for chosen targets.
#[derive(Default)]
pub struct MockBuilder {
    failing: HashSet<PlatformTarget>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    compiled: Mutex<Vec<PlatformTarget>>,
}

impl MockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every compile for `target`.
    pub fn failing_on(mut self, target: PlatformTarget) -> Self {
        self.failing.insert(target);
        self
    }

    /// Sleep before each compile (to exercise concurrency).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `compile` calls, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Targets compiled successfully, in completion order.
    pub async fn compiled(&self) -> Vec<PlatformTarget> {
        self.compiled.lock().await.clone()
    }

    /// Content written as the fake binary for a request.
    pub fn binary_content(request: &CompileRequest) -> String {
        format!("binary {} {}", request.target.key(), request.version)
    }
}

#[async_trait]
impl Builder for MockBuilder {
    async fn compile(&self, request: &CompileRequest) -> Result<PathBuf, BuildError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.contains(&request.target) {
            return Err(BuildError::Binary {
                platform: request.target.key(),
                message: "mock compiler failure".to_string(),
            });
        }

        let write = async {
            if let Some(parent) = request.output.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&request.output, Self::binary_content(request)).await
        };
        write.await.map_err(|e| BuildError::Binary {
            platform: request.target.key(),
            message: e.to_string(),
        })?;

        self.compiled.lock().await.push(request.target);
        Ok(request.output.clone())
    }
}

/// Assets written by a successful [`MockBundler`] run, relative to the dist dir.
pub const MOCK_ASSETS: [(&str, &str); 2] = [
    ("index.js", "console.log('plugin ui');"),
    ("css/app.css", "body { margin: 0; }"),
];

/// A UI bundler that writes [`MOCK_ASSETS`] under `<plugin>/ui/dist/assets`, or fails.
#[derive(Default)]
pub struct MockBundler {
    failure: Option<String>,
    calls: AtomicUsize,
}

impl MockBundler {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bundler whose every run fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UiBundler for MockBundler {
    async fn bundle(&self, plugin_dir: &Path) -> Result<PathBuf, BuildError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(BuildError::Ui {
                message: message.clone(),
            });
        }

        let dist = plugin_dir.join("ui/dist/assets");
        for (rel, content) in MOCK_ASSETS {
            let path = dist.join(rel);
            let write = async {
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&path, content).await
            };
            write.await.map_err(|e| BuildError::Ui {
                message: e.to_string(),
            })?;
        }
        Ok(dist)
    }
}
