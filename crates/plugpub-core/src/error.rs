// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the plugpub release pipeline.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// The primary error type used across packaging, upload, and index synchronization.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Configuration errors (missing bucket, unusable backend settings).
    #[error("configuration error: {0}")]
    Config(String),

    /// Input rejected before any work starts (empty output dir, empty release set, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// The plugin descriptor could not be read, parsed, or written.
    #[error("invalid plugin descriptor {path}: {message}")]
    Descriptor { path: PathBuf, message: String },

    /// The plugin descriptor is missing required fields.
    #[error("plugin descriptor is missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// Local filesystem failure outside of archiving.
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Archive creation or staging cleanup failed.
    #[error("failed to archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The object store rejected the object because of its size.
    #[error("error while uploading object to {bucket}: the object {key} is too large")]
    ArtifactTooLarge { bucket: String, key: String },

    /// Any other object store failure, wrapped with the target key.
    #[error("object store error for {bucket}:{key}: {source}")]
    Storage {
        bucket: String,
        key: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The object was written but could not be confirmed within the wait bound.
    ///
    /// The object may exist; this state needs manual verification.
    #[error("object {key} was uploaded but could not be confirmed within {timeout:?}")]
    Unconfirmed {
        key: String,
        timeout: Duration,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A catalog object could not be fetched, decoded, or encoded.
    #[error("catalog error for {key}: {message}")]
    Catalog { key: String, message: String },

    /// Some releases could not be hashed or stat'ed and partial indexing is not allowed.
    #[error("{} release(s) could not be indexed: {}", .failed.len(), .failed.join("; "))]
    PartialIndex { failed: Vec<String> },

    /// Internal or unexpected errors (task panics, ...).
    #[error("internal error: {0}")]
    Internal(String),
}

impl RegistryError {
    /// Shorthand for wrapping an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RegistryError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Per-platform build failure.
///
/// Cloneable so one shared UI failure can be attached to every platform outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    /// The staging directory for the platform could not be prepared.
    #[error("failed to prepare staging directory for {platform}: {message}")]
    Staging { platform: String, message: String },

    /// The binary build for one platform failed.
    #[error("binary build failed for {platform}: {message}")]
    Binary { platform: String, message: String },

    /// The shared UI build (or distributing its assets) failed.
    #[error("UI build error: {message}")]
    Ui { message: String },

    /// The platform's binary built, but the shared UI build failed.
    #[error("UI build failed: {cause}")]
    UiInvalidated {
        #[source]
        cause: Box<BuildError>,
    },
}

impl BuildError {
    /// Returns the innermost error in the chain.
    pub fn root_cause(&self) -> &BuildError {
        match self {
            BuildError::UiInvalidated { cause } => cause.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_lists_every_field() {
        let err = RegistryError::MissingFields(vec!["id".into(), "website".into()]);
        assert_eq!(
            err.to_string(),
            "plugin descriptor is missing required fields: id, website"
        );
    }

    #[test]
    fn ui_invalidated_exposes_root_cause() {
        let ui = BuildError::Ui {
            message: "pnpm exited with status 1".into(),
        };
        let err = BuildError::UiInvalidated {
            cause: Box::new(ui.clone()),
        };
        assert_eq!(err.root_cause(), &ui);
        assert!(err.to_string().contains("pnpm exited with status 1"));

        let source = std::error::Error::source(&err).expect("cause is the source");
        assert_eq!(source.to_string(), ui.to_string());
    }

    #[test]
    fn unconfirmed_is_distinct_from_storage() {
        let err = RegistryError::Unconfirmed {
            key: "p/1.0.0/linux-amd64.tar.gz".into(),
            timeout: Duration::from_secs(60),
            source: None,
        };
        assert!(matches!(err, RegistryError::Unconfirmed { .. }));
        assert!(err.to_string().contains("could not be confirmed"));
    }
}
