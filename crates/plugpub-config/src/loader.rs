// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./plugpub.toml` > `~/.config/plugpub/plugpub.toml` > `/etc/plugpub/plugpub.toml`
//! with environment variable overrides via `PLUGPUB_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::PlugpubConfig;

/// Legacy variable holding the registry bucket.
pub const LEGACY_BUCKET_ENV: &str = "AWS_S3_BUCKET";

/// Nested sections, longest first so `package_compiler_` wins over `package_`.
const ENV_SECTIONS: [(&str, &str); 6] = [
    ("package_compiler_", "package.compiler."),
    ("package_ui_", "package.ui."),
    ("package_", "package."),
    ("registry_", "registry."),
    ("logging_", "logging."),
    ("index_", "index."),
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/plugpub/plugpub.toml` (system-wide)
/// 3. `~/.config/plugpub/plugpub.toml` (user XDG config)
/// 4. `./plugpub.toml` (local directory)
/// 5. `AWS_S3_BUCKET`
/// 6. `PLUGPUB_*` environment variables
pub fn load_config() -> Result<PlugpubConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<PlugpubConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PlugpubConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PlugpubConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PlugpubConfig::default()))
        .merge(Toml::file(path))
        .merge(legacy_env_provider())
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(PlugpubConfig::default()))
        .merge(Toml::file("/etc/plugpub/plugpub.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("plugpub/plugpub.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("plugpub.toml"))
        .merge(legacy_env_provider())
        .merge(env_provider())
}

/// Map a prefix-stripped env var name to its dotted config key.
///
/// Uses explicit section prefixes rather than `Env::split("_")` because key
/// names contain underscores: `PLUGPUB_REGISTRY_CONFIRM_TIMEOUT_SECS` must map
/// to `registry.confirm_timeout_secs`.
pub fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for (prefix, section) in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(prefix) {
            return format!("{section}{rest}");
        }
    }
    key
}

fn env_provider() -> Env {
    Env::prefixed("PLUGPUB_").map(|key| map_env_key(key.as_str()).into())
}

fn legacy_env_provider() -> Env {
    Env::raw()
        .only(&[LEGACY_BUCKET_ENV])
        .map(|_| "registry.bucket".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("registry_bucket"), "registry.bucket");
        assert_eq!(
            map_env_key("registry_confirm_timeout_secs"),
            "registry.confirm_timeout_secs"
        );
        assert_eq!(map_env_key("package_out_dir"), "package.out_dir");
        assert_eq!(map_env_key("package_compiler_os_env"), "package.compiler.os_env");
        assert_eq!(map_env_key("package_ui_program"), "package.ui.program");
        assert_eq!(map_env_key("index_allow_partial"), "index.allow_partial");
        assert_eq!(map_env_key("logging_level"), "logging.level");
    }

    #[test]
    fn env_keys_map_regardless_of_case() {
        assert_eq!(map_env_key("REGISTRY_BUCKET"), "registry.bucket");
        assert_eq!(map_env_key("REGISTRY_LOCAL_ROOT"), "registry.local_root");
        assert_eq!(
            map_env_key("PACKAGE_COMPILER_PROGRAM"),
            "package.compiler.program"
        );
    }
}
