// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Similarity-searchable index over ingested document chunks.

use async_trait::async_trait;

use crate::error::ThothError;
use crate::types::{ContextFragment, DocumentChunk, IndexedDocument};

/// Nearest-neighbour lookup over previously ingested chunks.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Returns up to `k` fragments ranked by relevance to `text`.
    async fn query(&self, text: &str, k: usize) -> Result<Vec<ContextFragment>, ThothError>;

    /// Adds chunks to the index.
    async fn add(&self, chunks: Vec<DocumentChunk>) -> Result<(), ThothError>;
}

/// Registry of documents already ingested into a [`ContextStore`].
#[async_trait]
pub trait DocumentRegistry: Send + Sync {
    async fn is_indexed(&self, name: &str) -> Result<bool, ThothError>;

    /// Atomically replaces a document's indexed chunks and records it.
    ///
    /// Returns whether an earlier version was replaced. A failed call leaves
    /// the earlier version searchable.
    async fn replace_document(
        &self,
        name: &str,
        chunks: Vec<DocumentChunk>,
    ) -> Result<bool, ThothError>;

    /// All indexed documents ordered by name.
    async fn list_documents(&self) -> Result<Vec<IndexedDocument>, ThothError>;

    /// Removes every chunk and registry entry.
    async fn reset_documents(&self) -> Result<(), ThothError>;
}
