// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as supported platform keys, a usable backend, and a compiler command
//! that writes where the packager expects.

use std::collections::HashSet;
use std::path::Path;

use plugpub_core::PlatformTarget;

use crate::diagnostic::ConfigError;
use crate::model::{PlugpubConfig, RegistryBackend};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &PlugpubConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        fail(format!(
            "logging.level `{}` must be one of: {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        ));
    }

    // Registry
    let registry = &config.registry;
    if registry.confirm_timeout_secs == 0 {
        fail("registry.confirm_timeout_secs must be greater than 0".to_string());
    }
    if registry.backend == RegistryBackend::Local && registry.local_root.is_none() {
        fail("registry.local_root is required when registry.backend = \"local\"".to_string());
    }
    if registry.max_object_size == Some(0) {
        fail("registry.max_object_size must be greater than 0 when set".to_string());
    }
    if let Some(url) = &registry.public_url
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        fail(format!(
            "registry.public_url `{url}` must start with http:// or https://"
        ));
    }

    // Packaging
    let package = &config.package;
    if package.out_dir.as_os_str().is_empty() {
        fail("package.out_dir must not be empty".to_string());
    } else if package.out_dir == Path::new("/") {
        fail("package.out_dir must not be the root directory".to_string());
    }

    if package.descriptor_file.trim().is_empty() {
        fail("package.descriptor_file must not be empty".to_string());
    }

    if package.platforms.is_empty() {
        fail("package.platforms must list at least one platform".to_string());
    }
    let mut seen = HashSet::new();
    for key in &package.platforms {
        match key.parse::<PlatformTarget>() {
            Ok(target) => {
                if !seen.insert(target) {
                    fail(format!("duplicate platform `{key}` in package.platforms"));
                }
            }
            Err(reason) => fail(format!("package.platforms: {reason}")),
        }
    }

    if package.binary_name.trim().is_empty() {
        fail("package.binary_name must not be empty".to_string());
    }
    if package.compiler.program.trim().is_empty() {
        fail("package.compiler.program must not be empty".to_string());
    }
    if !package.compiler.args.iter().any(|a| a.contains("{output}")) {
        fail("package.compiler.args must contain the `{output}` placeholder".to_string());
    }
    if package.ui.program.trim().is_empty() {
        fail("package.ui.program must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = PlugpubConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn local_backend_requires_root() {
        let mut config = PlugpubConfig::default();
        config.registry.backend = RegistryBackend::Local;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "registry.local_root"));

        config.registry.local_root = Some("/srv/registry".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn root_out_dir_fails_validation() {
        let mut config = PlugpubConfig::default();
        config.package.out_dir = "/".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "root directory"));
    }

    #[test]
    fn unknown_and_duplicate_platforms_fail() {
        let mut config = PlugpubConfig::default();
        config.package.platforms = vec![
            "linux_amd64".to_string(),
            "linux_amd64".to_string(),
            "plan9_amd64".to_string(),
        ];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "duplicate platform `linux_amd64`"));
        assert!(has_error(&errors, "plan9"));
    }

    #[test]
    fn compiler_args_need_output_placeholder() {
        let mut config = PlugpubConfig::default();
        config.package.compiler.args = vec!["build".to_string()];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "{output}"));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = PlugpubConfig::default();
        config.logging.level = "loud".to_string();
        config.registry.confirm_timeout_secs = 0;
        config.package.platforms.clear();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
