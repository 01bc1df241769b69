// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command implementations for the `plugpub` binary.

pub mod cli;
pub mod package;
pub mod publish;

use std::process::ExitCode;

use plugpub_config::PlugpubConfig;
use plugpub_core::RegistryError;
use plugpub_storage::open_store;

use crate::cli::{Commands, ReleaseArgs};
use crate::package::{orchestrator_from_config, print_report, run_package_command};
use crate::publish::{PublishCoordinator, PublishSummary};

/// Run a parsed subcommand against the loaded configuration.
pub async fn execute(command: &Commands, config: &PlugpubConfig) -> Result<ExitCode, RegistryError> {
    match command {
        Commands::Package(args) => {
            let orchestrator = orchestrator_from_config(&config.package);
            let outcome = run_package_command(&orchestrator, args, config).await?;
            print_report(&outcome.report);
            if let Some(summary) = &outcome.published {
                print_summary(summary);
            }
            Ok(exit_code(outcome.is_success()))
        }
        Commands::Publish(args) => {
            let coordinator = coordinator(args, config).await?;
            let summary = coordinator.publish(&args.to_request()).await?;
            print_summary(&summary);
            Ok(exit_code(summary.sync.failures.is_empty()))
        }
        Commands::Index(args) => {
            let coordinator = coordinator(args, config).await?;
            let report = coordinator.reindex(&args.to_request()).await?;
            println!(
                "indexed {} {} [{}]",
                report.catalog.id,
                args.release_version,
                report.indexed.join(", ")
            );
            Ok(exit_code(report.failures.is_empty()))
        }
        Commands::Config => match plugpub_config::to_toml_string(config) {
            Ok(rendered) => {
                print!("{rendered}");
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => Err(RegistryError::Config(e.to_string())),
        },
    }
}

async fn coordinator(
    args: &ReleaseArgs,
    config: &PlugpubConfig,
) -> Result<PublishCoordinator, RegistryError> {
    let store = open_store(&config.registry, args.bucket.as_deref()).await?;
    Ok(PublishCoordinator::from_config(store, config))
}

fn print_summary(summary: &PublishSummary) {
    for key in &summary.uploaded {
        println!("uploaded {key}");
    }
    for release in &summary.sync.skipped {
        eprintln!("skipped {release}: not part of this plugin version");
    }
    for failure in &summary.sync.failures {
        eprintln!("not indexed: {failure}");
    }
    let catalog = &summary.sync.catalog;
    if let Some(latest) = &catalog.latest_version {
        println!(
            "published {} {} [{}]",
            catalog.id,
            latest.version,
            summary.sync.indexed.join(", ")
        );
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
