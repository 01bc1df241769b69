// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Packaging for plugpub: concurrent multi-platform builds, staging, and
//! checksummed `.tar.gz` archives.

pub mod archive;
pub mod command;
pub mod fsutil;
pub mod orchestrator;
pub mod pack;

pub use archive::{ArchiveOutput, checksum_path, tar_gz};
pub use command::{CommandBuilder, CommandBundler};
pub use orchestrator::{BuildOrchestrator, BuildOutcome, apply_ui_result};
pub use pack::{
    PackageFailure, PackageOptions, PackageReport, PackagedArtifact, PlatformFailure,
    resolve_out_dir, run_package,
};
