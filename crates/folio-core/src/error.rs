// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Folio catalog service.

use thiserror::Error;

/// The primary error type used across all Folio crates.
#[derive(Debug, Error)]
pub enum FolioError {
    /// Configuration errors (invalid values reaching runtime components).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (connection, query failure, constraint violation).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A catalog entity was not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Caller-supplied input was rejected before reaching storage.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Payload (de)serialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No delivery handler exists for an outbox message kind.
    #[error("unsupported outbox kind: {kind}")]
    UnsupportedKind { kind: i64 },

    /// A delivery handler failed to notify the downstream system.
    #[error("delivery failed: {message}")]
    Delivery {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FolioError {
    /// Wrap any storage-layer error.
    pub fn storage(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        FolioError::Storage {
            source: Box::new(source),
        }
    }

    /// Wrap a serde (or similar) error.
    pub fn serialization(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        FolioError::Serialization {
            source: Box::new(source),
        }
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(e: serde_json::Error) -> Self {
        FolioError::serialization(e)
    }
}
