// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog synchronization for plugpub.
//!
//! After a version's artifacts are uploaded, the [`IndexSynchronizer`]
//! records the version in the plugin's catalog and refreshes the plugin's
//! entry in the registry catalog.

pub mod checksum;
pub mod synchronizer;

pub use checksum::artifact_info;
pub use synchronizer::{IndexSynchronizer, ReleaseFailure, SyncReport};
