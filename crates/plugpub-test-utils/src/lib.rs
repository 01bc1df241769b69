// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for plugpub integration tests.
//!
//! Provides mock build tools, an in-memory object store, and plugin fixtures
//! so the pipeline can be exercised without compilers or a real bucket.
//!
//! # Components
//!
//! - [`MockBuilder`] - Compiler stand-in with per-platform failure injection
//! - [`MockBundler`] - UI bundler stand-in that writes fake assets or fails
//! - [`MemoryObjectStore`] - Object store with size limit, fault injection, and a write log

pub mod fixtures;
pub mod memory_store;
pub mod mock_build;

pub use fixtures::{PluginFixture, descriptor};
pub use memory_store::MemoryObjectStore;
pub use mock_build::{MOCK_ASSETS, MockBuilder, MockBundler};
