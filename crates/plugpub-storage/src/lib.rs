// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Object storage for plugpub.
//!
//! Provides the [`ObjectStore`] backends (S3 behind the `s3` feature, and a
//! local directory) plus the [`UploadClient`] that pushes release artifacts.

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;
pub mod upload;

use std::sync::Arc;

use plugpub_config::{RegistryBackend, RegistryConfig};
use plugpub_core::{ObjectStore, RegistryError};

pub use local::LocalObjectStore;
#[cfg(feature = "s3")]
pub use s3::S3ObjectStore;
pub use upload::{UploadClient, put_confirmed};

/// Open the configured object store.
///
/// `bucket_flag` (from the command line) wins over the configured bucket.
pub async fn open_store(
    config: &RegistryConfig,
    bucket_flag: Option<&str>,
) -> Result<Arc<dyn ObjectStore>, RegistryError> {
    match config.backend {
        RegistryBackend::Local => {
            let root = config.local_root.as_ref().ok_or_else(|| {
                RegistryError::Config(
                    "registry.local_root is required for the local backend".to_string(),
                )
            })?;
            Ok(Arc::new(
                LocalObjectStore::new(root).with_max_object_size(config.max_object_size),
            ))
        }
        RegistryBackend::S3 => open_s3(config, bucket_flag).await,
    }
}

#[cfg(feature = "s3")]
async fn open_s3(
    config: &RegistryConfig,
    bucket_flag: Option<&str>,
) -> Result<Arc<dyn ObjectStore>, RegistryError> {
    let bucket = config.resolve_bucket(bucket_flag).ok_or_else(|| {
        RegistryError::Config(format!(
            "a bucket is required: pass --bucket or set {}",
            plugpub_config::LEGACY_BUCKET_ENV
        ))
    })?;
    Ok(Arc::new(S3ObjectStore::from_config(config, bucket).await))
}

#[cfg(not(feature = "s3"))]
async fn open_s3(
    _config: &RegistryConfig,
    _bucket_flag: Option<&str>,
) -> Result<Arc<dyn ObjectStore>, RegistryError> {
    Err(RegistryError::Config(
        "plugpub was built without S3 support; use registry.backend = \"local\"".to_string(),
    ))
}
