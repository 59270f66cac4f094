// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retriever over the private document index.

use std::sync::Arc;

use async_trait::async_trait;
use thoth_core::types::ContextFragment;
use thoth_core::{
    AdapterType, ContextStore, HealthStatus, PluginAdapter, Retriever, SourceKind, ThothError,
};

/// Top-`k` lookup against a [`ContextStore`].
pub struct DocumentRetriever {
    store: Arc<dyn ContextStore>,
    k: usize,
}

impl DocumentRetriever {
    pub fn new(store: Arc<dyn ContextStore>, k: usize) -> Self {
        Self { store, k }
    }
}

#[async_trait]
impl PluginAdapter for DocumentRetriever {
    fn name(&self) -> &str {
        "documents"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Retriever
    }

    async fn health_check(&self) -> Result<HealthStatus, ThothError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl Retriever for DocumentRetriever {
    fn source_kind(&self) -> SourceKind {
        SourceKind::Documents
    }

    async fn query(&self, text: &str) -> Result<Vec<ContextFragment>, ThothError> {
        self.store.query(text, self.k).await
    }
}
