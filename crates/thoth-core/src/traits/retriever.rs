// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retriever trait shared by the document index and the external lookup services.

use async_trait::async_trait;

use crate::error::ThothError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ContextFragment, SourceKind};

/// A "query -> ranked snippets" lookup service.
///
/// Implementations must return an error rather than hang; the fan-out layer
/// also enforces its own per-source timeout.
#[async_trait]
pub trait Retriever: PluginAdapter {
    /// Which source group this retriever feeds.
    fn source_kind(&self) -> SourceKind;

    /// Returns fragments in the source's native ranking order.
    async fn query(&self, text: &str) -> Result<Vec<ContextFragment>, ThothError>;
}
