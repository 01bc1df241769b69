// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `plugpub package` command implementation.

use std::sync::Arc;

use plugpub_config::{PackageConfig, PlugpubConfig};
use plugpub_core::RegistryError;
use plugpub_package::{
    BuildOrchestrator, CommandBuilder, CommandBundler, PackageReport, run_package,
};
use plugpub_storage::open_store;
use tracing::info;

use crate::cli::PackageArgs;
use crate::publish::{PublishCoordinator, PublishSummary};

/// What a `package` run produced.
#[derive(Debug)]
pub struct PackageOutcome {
    pub report: PackageReport,
    /// Set when `--publish` was given and something was packaged.
    pub published: Option<PublishSummary>,
}

impl PackageOutcome {
    pub fn is_success(&self) -> bool {
        self.report.is_complete() && !self.report.artifacts.is_empty()
    }
}

/// Orchestrator running the configured compiler and UI build commands.
pub fn orchestrator_from_config(config: &PackageConfig) -> BuildOrchestrator {
    BuildOrchestrator::new(
        Arc::new(CommandBuilder::new(config.compiler.clone())),
        Arc::new(CommandBundler::new(config.ui.clone())),
    )
    .with_descriptor_file(config.descriptor_file.clone())
    .with_binary_name(config.binary_name.clone())
}

/// Run the `package` command with the given orchestrator.
///
/// With `--publish` the store is opened before anything is built, so a
/// missing bucket fails fast. Only the artifacts that were actually packaged
/// are published.
pub async fn run_package_command(
    orchestrator: &BuildOrchestrator,
    args: &PackageArgs,
    config: &PlugpubConfig,
) -> Result<PackageOutcome, RegistryError> {
    let store = if args.publish {
        Some(open_store(&config.registry, args.bucket.as_deref()).await?)
    } else {
        None
    };

    let options = args.to_options(&config.package)?;
    let report = run_package(orchestrator, &options).await?;

    let published = match store {
        Some(store) if !report.artifacts.is_empty() => {
            info!(bucket = %store.location(), "publishing to registry");
            let coordinator = PublishCoordinator::from_config(store, config);
            Some(coordinator.publish(&report.to_publish_request()).await?)
        }
        _ => None,
    };

    Ok(PackageOutcome { report, published })
}

/// Print the packaging report, failures last.
pub fn print_report(report: &PackageReport) {
    for artifact in &report.artifacts {
        println!(
            "packaged {} [{}] {} ({} bytes, sha256 {})",
            report.descriptor.id,
            artifact.target,
            artifact.archive.archive.display(),
            artifact.archive.size,
            artifact.archive.checksum
        );
    }

    if !report.failures.is_empty() {
        eprintln!("{} platform(s) failed:", report.failures.len());
        for failure in &report.failures {
            eprintln!("  {}: {}", failure.target, failure.cause);
        }
    }
}
