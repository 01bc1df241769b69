// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! S3 (and S3-compatible) object store.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::client::Waiters;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::primitives::ByteStream;
use plugpub_config::RegistryConfig;
use plugpub_core::traits::store::content_type_for;
use plugpub_core::{ObjectBody, ObjectStore, RegistryError};
use tracing::debug;

/// Error code S3 returns when an object exceeds the maximum upload size.
const ENTITY_TOO_LARGE: &str = "EntityTooLarge";

/// An [`ObjectStore`] backed by one S3 bucket.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a client from the default AWS credential chain plus registry overrides.
    pub async fn from_config(config: &RegistryConfig, bucket: impl Into<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        Self::new(Client::from_conf(builder.build()), bucket)
    }

    fn storage_error<E>(&self, key: &str, source: E) -> RegistryError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        RegistryError::Storage {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            source: Box::new(source),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn location(&self) -> &str {
        &self.bucket
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RegistryError> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                let err = err.into_service_error();
                if err.is_no_such_key() {
                    return Ok(None);
                }
                return Err(self.storage_error(key, err));
            }
        };

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| self.storage_error(key, e))?;
        Ok(Some(bytes.into_bytes().to_vec()))
    }

    async fn put(&self, key: &str, body: ObjectBody) -> Result<(), RegistryError> {
        let stream = match body {
            ObjectBody::Bytes(bytes) => ByteStream::from(bytes),
            ObjectBody::File(path) => ByteStream::from_path(&path)
                .await
                .map_err(|e| self.storage_error(key, e))?,
        };

        let result = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type_for(key))
            .body(stream)
            .send()
            .await;

        match result {
            Ok(_) => {
                debug!(bucket = %self.bucket, %key, "object uploaded");
                Ok(())
            }
            Err(err) => {
                let err = err.into_service_error();
                if err.code() == Some(ENTITY_TOO_LARGE) {
                    Err(RegistryError::ArtifactTooLarge {
                        bucket: self.bucket.clone(),
                        key: key.to_string(),
                    })
                } else {
                    Err(self.storage_error(key, err))
                }
            }
        }
    }

    async fn wait_until_exists(&self, key: &str, timeout: Duration) -> Result<(), RegistryError> {
        self.client
            .wait_until_object_exists()
            .bucket(&self.bucket)
            .key(key)
            .wait(timeout)
            .await
            .map(|_| ())
            .map_err(|e| RegistryError::Unconfirmed {
                key: key.to_string(),
                timeout,
                source: Some(DisplayErrorContext(&e).to_string().into()),
            })
    }
}
