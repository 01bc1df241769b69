// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use plugpub_config::{ConfigError, PackageConfig, PlugpubConfig};
use plugpub_core::{PlatformTarget, PublishRequest, RegistryError};
use plugpub_package::PackageOptions;

/// Plugpub - package plugins and publish them to a plugin registry.
#[derive(Parser, Debug)]
#[command(name = "plugpub", version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build, stage, and archive a plugin for every target platform.
    Package(PackageArgs),
    /// Upload per-platform artifacts of a version and update the registry catalogs.
    Publish(ReleaseArgs),
    /// Update the registry catalogs for artifacts that are already uploaded.
    Index(ReleaseArgs),
    /// Print the effective configuration as TOML.
    Config,
}

#[derive(Args, Debug)]
pub struct PackageArgs {
    /// Plugin directory containing the descriptor.
    pub path: PathBuf,

    /// Output directory for the packages, relative to the plugin directory.
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Version to package. Defaults to the descriptor's version.
    #[arg(long = "version", value_name = "VERSION")]
    pub set_version: Option<String>,

    /// Remove the output directory before packaging.
    #[arg(short, long, conflicts_with = "no_clean")]
    pub clean: bool,

    /// Keep the existing output directory.
    #[arg(long)]
    pub no_clean: bool,

    /// Only build these targets (`<os>_<arch>`, repeatable).
    #[arg(long = "platform", value_name = "OS_ARCH")]
    pub platforms: Vec<PlatformTarget>,

    /// Publish the packaged artifacts after building.
    #[arg(short, long)]
    pub publish: bool,

    /// Bucket to publish to.
    #[arg(short, long, requires = "publish")]
    pub bucket: Option<String>,
}

impl PackageArgs {
    /// Command-line flags layered over the packaging configuration.
    pub fn to_options(&self, config: &PackageConfig) -> Result<PackageOptions, RegistryError> {
        let mut options = PackageOptions::from_config(&self.path, config)?;
        if let Some(out) = &self.out {
            options.out_dir = out.clone();
        }
        if self.clean {
            options.clean = true;
        } else if self.no_clean {
            options.clean = false;
        }
        if !self.platforms.is_empty() {
            options.platforms = self.platforms.clone();
        }
        options.version = self.set_version.clone();
        Ok(options)
    }
}

#[derive(Args, Debug)]
pub struct ReleaseArgs {
    /// Plugin id.
    pub plugin: String,

    /// Version being released.
    #[arg(value_name = "VERSION")]
    pub release_version: String,

    /// Bucket holding the registry.
    #[arg(short, long)]
    pub bucket: Option<String>,

    /// Path to the plugin descriptor.
    #[arg(short, long, value_name = "PATH")]
    pub metadata: PathBuf,

    /// Path to a darwin/arm64 build.
    #[arg(long, alias = "darwin_arm64", value_name = "PATH")]
    pub darwin_arm64: Option<PathBuf>,

    /// Path to a darwin/amd64 build.
    #[arg(long, alias = "darwin_amd64", value_name = "PATH")]
    pub darwin_amd64: Option<PathBuf>,

    /// Path to a windows/arm64 build.
    #[arg(long, alias = "windows_arm64", value_name = "PATH")]
    pub windows_arm64: Option<PathBuf>,

    /// Path to a windows/amd64 build.
    #[arg(long, alias = "windows_amd64", value_name = "PATH")]
    pub windows_amd64: Option<PathBuf>,

    /// Path to a linux/arm64 build.
    #[arg(long, alias = "linux_arm64", value_name = "PATH")]
    pub linux_arm64: Option<PathBuf>,

    /// Path to a linux/amd64 build.
    #[arg(long, alias = "linux_amd64", value_name = "PATH")]
    pub linux_amd64: Option<PathBuf>,
}

impl ReleaseArgs {
    pub fn to_request(&self) -> PublishRequest {
        PublishRequest {
            plugin: self.plugin.clone(),
            version: self.release_version.clone(),
            metadata_path: self.metadata.clone(),
            darwin_arm64: self.darwin_arm64.clone(),
            darwin_amd64: self.darwin_amd64.clone(),
            windows_arm64: self.windows_arm64.clone(),
            windows_amd64: self.windows_amd64.clone(),
            linux_arm64: self.linux_arm64.clone(),
            linux_amd64: self.linux_amd64.clone(),
        }
    }
}

impl Cli {
    /// Load configuration from `--config` or the standard hierarchy.
    pub fn load_config(&self) -> Result<PlugpubConfig, Vec<ConfigError>> {
        match &self.config {
            Some(path) => plugpub_config::load_and_validate_path(path),
            None => plugpub_config::load_and_validate(),
        }
    }

    /// Log level after applying `-v` on top of the configured level.
    pub fn log_level<'a>(&self, configured: &'a str) -> &'a str {
        match self.verbose {
            0 => configured,
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use plugpub_core::{Arch, Os};

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn publish_flags_build_request_in_platform_order() {
        let cli = Cli::try_parse_from([
            "plugpub",
            "publish",
            "p",
            "1.2.0",
            "-m",
            "plugin.yaml",
            "--linux-amd64",
            "build/linux_amd64.tar.gz",
            "--darwin_arm64",
            "build/darwin_arm64.tar.gz",
        ])
        .unwrap();

        let Commands::Publish(args) = cli.command else {
            panic!("expected publish");
        };
        let request = args.to_request();
        assert_eq!(request.plugin, "p");
        assert_eq!(request.version, "1.2.0");
        let keys: Vec<String> = request.to_releases().iter().map(|r| r.os_arch()).collect();
        assert_eq!(keys, vec!["darwin_arm64", "linux_amd64"]);
    }

    #[test]
    fn package_flags_override_config() {
        let cli = Cli::try_parse_from([
            "plugpub",
            "-v",
            "package",
            "plugins/k8s",
            "--no-clean",
            "-o",
            "dist",
            "--version",
            "2.0.0",
            "--platform",
            "linux_arm64",
        ])
        .unwrap();
        assert_eq!(cli.log_level("info"), "debug");

        let Commands::Package(args) = cli.command else {
            panic!("expected package");
        };
        let options = args.to_options(&PackageConfig::default()).unwrap();
        assert!(!options.clean);
        assert_eq!(options.out_dir, PathBuf::from("dist"));
        assert_eq!(options.version.as_deref(), Some("2.0.0"));
        assert_eq!(
            options.platforms,
            vec![PlatformTarget::new(Os::Linux, Arch::Arm64)]
        );
    }

    #[test]
    fn package_defaults_come_from_config() {
        let cli = Cli::try_parse_from(["plugpub", "package", "."]).unwrap();
        let Commands::Package(args) = cli.command else {
            panic!("expected package");
        };
        let options = args.to_options(&PackageConfig::default()).unwrap();
        assert!(options.clean);
        assert_eq!(options.out_dir, PathBuf::from("build"));
        assert_eq!(options.platforms.len(), 6);
        assert!(options.version.is_none());
    }

    #[test]
    fn bucket_requires_publish_and_clean_flags_conflict() {
        assert!(Cli::try_parse_from(["plugpub", "package", ".", "-b", "bucket"]).is_err());
        assert!(Cli::try_parse_from(["plugpub", "package", ".", "--clean", "--no-clean"]).is_err());
        assert!(Cli::try_parse_from(["plugpub", "package", ".", "-p", "-b", "bucket"]).is_ok());
        assert!(Cli::try_parse_from(["plugpub", "package", ".", "--platform", "plan9_amd64"]).is_err());
    }

    #[test]
    fn publish_requires_plugin_and_version() {
        assert!(Cli::try_parse_from(["plugpub", "publish", "p", "-m", "plugin.yaml"]).is_err());
    }
}
