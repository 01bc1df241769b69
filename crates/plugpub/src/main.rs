// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugpub - package plugins and publish them to a plugin registry.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::error::Error as _;
use std::process::ExitCode;

use clap::Parser;
use plugpub::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(errors) => {
            plugpub_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(cli.log_level(&config.logging.level));

    match plugpub::execute(&cli.command, &config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("plugpub: {e}");
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("plugpub={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
