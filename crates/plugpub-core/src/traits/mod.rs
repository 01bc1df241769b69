// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits at the seams of the release pipeline.
//!
//! Build tools and object storage are reached only through these traits so
//! the pipeline can run against mocks in tests.

pub mod builder;
pub mod store;

pub use builder::{Builder, CompileRequest, UiBundler};
pub use store::{ObjectBody, ObjectStore};
