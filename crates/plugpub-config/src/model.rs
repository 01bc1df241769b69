// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for plugpub.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;
use std::time::Duration;

use plugpub_core::{PlatformTarget, SUPPORTED_PLATFORMS};
use serde::{Deserialize, Serialize};

/// Top-level plugpub configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlugpubConfig {
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Object store holding artifacts and catalogs.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Build and packaging settings.
    #[serde(default)]
    pub package: PackageConfig,

    /// Catalog synchronization settings.
    #[serde(default)]
    pub index: IndexConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Which object store implementation backs the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryBackend {
    /// An S3 (or S3-compatible) bucket.
    #[default]
    S3,
    /// A directory on the local filesystem.
    Local,
}

/// Registry object store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    #[serde(default)]
    pub backend: RegistryBackend,

    /// Bucket name. Also read from `AWS_S3_BUCKET`.
    #[serde(default)]
    pub bucket: Option<String>,

    /// AWS region override. `None` uses the SDK's default chain.
    #[serde(default)]
    pub region: Option<String>,

    /// Custom endpoint for S3-compatible stores.
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Root directory when `backend = "local"`.
    #[serde(default)]
    pub local_root: Option<PathBuf>,

    /// Bound on the post-upload existence check, in seconds.
    #[serde(default = "default_confirm_timeout_secs")]
    pub confirm_timeout_secs: u64,

    /// Largest object the local backend accepts, in bytes.
    #[serde(default)]
    pub max_object_size: Option<u64>,

    /// Public base URL prefixed to artifact keys in catalog download URLs.
    #[serde(default)]
    pub public_url: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            backend: RegistryBackend::default(),
            bucket: None,
            region: None,
            endpoint_url: None,
            local_root: None,
            confirm_timeout_secs: default_confirm_timeout_secs(),
            max_object_size: None,
            public_url: None,
        }
    }
}

impl RegistryConfig {
    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }

    /// The bucket to use: an explicit flag wins over configuration.
    pub fn resolve_bucket(&self, flag: Option<&str>) -> Option<String> {
        flag.filter(|b| !b.trim().is_empty())
            .map(str::to_string)
            .or_else(|| self.bucket.clone().filter(|b| !b.trim().is_empty()))
    }
}

fn default_confirm_timeout_secs() -> u64 {
    60
}

/// Packaging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PackageConfig {
    /// Output directory, relative to the plugin directory unless absolute.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Remove the output directory before packaging.
    #[serde(default = "default_clean")]
    pub clean: bool,

    /// Descriptor file name at the plugin root.
    #[serde(default = "default_descriptor_file")]
    pub descriptor_file: String,

    /// Targets to build, as `<os>_<arch>` keys.
    #[serde(default = "default_platforms")]
    pub platforms: Vec<String>,

    /// Base name of the built binary (`.exe` is appended on Windows).
    #[serde(default = "default_binary_name")]
    pub binary_name: String,

    #[serde(default)]
    pub compiler: CompilerConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            clean: default_clean(),
            descriptor_file: default_descriptor_file(),
            platforms: default_platforms(),
            binary_name: default_binary_name(),
            compiler: CompilerConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl PackageConfig {
    /// Parse the configured platform keys.
    pub fn targets(&self) -> Result<Vec<PlatformTarget>, String> {
        self.platforms.iter().map(|p| p.parse()).collect()
    }
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_clean() -> bool {
    true
}

fn default_descriptor_file() -> String {
    "plugin.yaml".to_string()
}

fn default_platforms() -> Vec<String> {
    SUPPORTED_PLATFORMS.iter().map(|p| p.key()).collect()
}

fn default_binary_name() -> String {
    "plugin".to_string()
}

/// Backend compiler invocation.
///
/// `args` may use the placeholders `{output}`, `{os}`, `{arch}`, and `{version}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerConfig {
    #[serde(default = "default_compiler_program")]
    pub program: String,

    #[serde(default = "default_compiler_args")]
    pub args: Vec<String>,

    /// Environment variable receiving the target OS.
    #[serde(default = "default_os_env")]
    pub os_env: String,

    /// Environment variable receiving the target architecture.
    #[serde(default = "default_arch_env")]
    pub arch_env: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: default_compiler_program(),
            args: default_compiler_args(),
            os_env: default_os_env(),
            arch_env: default_arch_env(),
        }
    }
}

fn default_compiler_program() -> String {
    "go".to_string()
}

fn default_compiler_args() -> Vec<String> {
    ["build", "-o", "{output}", "./pkg"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_os_env() -> String {
    "GOOS".to_string()
}

fn default_arch_env() -> String {
    "GOARCH".to_string()
}

/// Shared UI build invocation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UiConfig {
    /// UI project directory, relative to the plugin directory.
    #[serde(default = "default_ui_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_ui_program")]
    pub program: String,

    #[serde(default = "default_ui_args")]
    pub args: Vec<String>,

    /// Built assets directory, relative to the UI directory.
    #[serde(default = "default_ui_dist")]
    pub dist: PathBuf,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            dir: default_ui_dir(),
            program: default_ui_program(),
            args: default_ui_args(),
            dist: default_ui_dist(),
        }
    }
}

fn default_ui_dir() -> PathBuf {
    PathBuf::from("ui")
}

fn default_ui_program() -> String {
    "pnpm".to_string()
}

fn default_ui_args() -> Vec<String> {
    vec!["run".to_string(), "build".to_string()]
}

fn default_ui_dist() -> PathBuf {
    PathBuf::from("dist/assets")
}

/// Catalog synchronization configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IndexConfig {
    /// Index the releases that hashed successfully even when others failed.
    #[serde(default)]
    pub allow_partial: bool,
}
