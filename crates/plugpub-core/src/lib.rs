// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the plugpub release pipeline.
//!
//! This crate provides the data model shared by every stage (platforms,
//! releases, plugin descriptors, catalog documents), the error taxonomy, and
//! the capability traits that packaging, upload, and indexing are written
//! against.

pub mod catalog;
pub mod descriptor;
pub mod error;
pub mod platform;
pub mod release;
pub mod traits;

// Re-export key items at crate root for ergonomic imports.
pub use catalog::{
    ArchitectureInfo, PluginCatalog, REGISTRY_CATALOG_KEY, RegistryCatalog, RegistryEntry,
    VersionRecord,
};
pub use descriptor::{Maintainer, PluginDescriptor};
pub use error::{BuildError, RegistryError};
pub use platform::{Arch, Os, PlatformTarget, SUPPORTED_PLATFORMS};
pub use release::{PublishRequest, Release};
pub use traits::{Builder, CompileRequest, ObjectBody, ObjectStore, UiBundler};
