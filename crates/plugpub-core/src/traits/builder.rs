// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Build tool capabilities.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::BuildError;
use crate::platform::PlatformTarget;

/// Inputs for compiling one platform binary.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    /// Root of the plugin source tree.
    pub plugin_dir: PathBuf,
    pub target: PlatformTarget,
    /// Version being packaged.
    pub version: String,
    /// Where the binary must be written.
    pub output: PathBuf,
}

/// Compiles the plugin's backend binary for one target.
#[async_trait]
pub trait Builder: Send + Sync + 'static {
    /// Produce the binary at `request.output` and return its path.
    async fn compile(&self, request: &CompileRequest) -> Result<PathBuf, BuildError>;
}

/// Builds the plugin's shared UI assets once for all platforms.
#[async_trait]
pub trait UiBundler: Send + Sync + 'static {
    /// Run the UI build and return the directory holding the built assets.
    async fn bundle(&self, plugin_dir: &Path) -> Result<PathBuf, BuildError>;
}
