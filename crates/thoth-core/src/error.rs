// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Thoth assistant.

use thiserror::Error;

use crate::types::SourceKind;

/// The primary error type used across all Thoth adapter traits and core operations.
#[derive(Debug, Error)]
pub enum ThothError {
    /// Configuration errors (invalid TOML, missing keys, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Answer engine errors (HTTP failure, bad response, model not found).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A single retrieval source failed. The fan-out layer absorbs these.
    #[error("{source_kind} retrieval failed: {message}")]
    Retrieval {
        source_kind: SourceKind,
        message: String,
    },

    /// A document was handed to ingestion with a file type we cannot read.
    #[error("unsupported file type: {extension}")]
    UnsupportedDocument { extension: String },

    /// A supported document could not be read.
    #[error("failed to load document {path}: {message}")]
    Document { path: String, message: String },

    /// Caller supplied an unusable value (blank question, blank thread name).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ThothError {
    /// Wraps any error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ThothError::Storage {
            source: Box::new(err),
        }
    }

    /// True for errors raised by document ingestion rather than a turn.
    pub fn is_ingestion_error(&self) -> bool {
        matches!(
            self,
            ThothError::UnsupportedDocument { .. } | ThothError::Document { .. }
        )
    }
}
