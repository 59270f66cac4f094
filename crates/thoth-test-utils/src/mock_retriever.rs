// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock retrieval source and in-memory context store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use thoth_core::ThothError;
use thoth_core::traits::{ContextStore, PluginAdapter, Retriever};
use thoth_core::types::{AdapterType, ContextFragment, DocumentChunk, HealthStatus, SourceKind};

/// A retriever that returns fixed fragments, or fails on every call.
///
/// Counts its invocations so tests can assert whether a source was reached.
pub struct MockRetriever {
    kind: SourceKind,
    name: String,
    fragments: Vec<ContextFragment>,
    fail: bool,
    calls: AtomicUsize,
}

impl MockRetriever {
    /// A source that answers every query with `fragments`.
    pub fn returning(kind: SourceKind, fragments: Vec<ContextFragment>) -> Self {
        Self {
            kind,
            name: format!("mock-{kind}"),
            fragments,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// A source whose every query fails with `ThothError::Retrieval`.
    pub fn failing(kind: SourceKind) -> Self {
        Self {
            fail: true,
            ..Self::returning(kind, Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PluginAdapter for MockRetriever {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Retriever
    }

    async fn health_check(&self) -> Result<HealthStatus, ThothError> {
        if self.fail {
            Ok(HealthStatus::Unhealthy("configured to fail".into()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }
}

#[async_trait]
impl Retriever for MockRetriever {
    fn source_kind(&self) -> SourceKind {
        self.kind
    }

    async fn query(&self, _text: &str) -> Result<Vec<ContextFragment>, ThothError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ThothError::Retrieval {
                source_kind: self.kind,
                message: "mock source unavailable".into(),
            });
        }
        Ok(self.fragments.clone())
    }
}

/// In-memory context store ranking chunks by shared lowercase terms.
#[derive(Default)]
pub struct MockContextStore {
    chunks: Mutex<Vec<DocumentChunk>>,
}

impl MockContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.chunks.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl ContextStore for MockContextStore {
    async fn query(&self, text: &str, k: usize) -> Result<Vec<ContextFragment>, ThothError> {
        let wanted = terms(text);
        let chunks = self
            .chunks
            .lock()
            .map_err(|e| ThothError::Internal(e.to_string()))?;
        let mut scored: Vec<(usize, &DocumentChunk)> = chunks
            .iter()
            .map(|chunk| {
                let have = terms(&chunk.text);
                (wanted.iter().filter(|t| have.contains(t)).count(), chunk)
            })
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, chunk)| ContextFragment::new(chunk.text.clone(), chunk.source.clone()))
            .collect())
    }

    async fn add(&self, chunks: Vec<DocumentChunk>) -> Result<(), ThothError> {
        self.chunks
            .lock()
            .map_err(|e| ThothError::Internal(e.to_string()))?
            .extend(chunks);
        Ok(())
    }
}
