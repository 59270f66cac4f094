// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Concurrent, fail-soft fan-out across the enabled retrieval sources.
//!
//! Every enabled source is queried at once. A source that errors or runs past
//! its timeout contributes nothing and is logged; the others are unaffected.
//! Results are concatenated in [`SourceKind`] order with each source's native
//! ranking preserved and no deduplication.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::future::join_all;
use thoth_core::types::{ContextFragment, RetrievalFlags};
use thoth_core::{Retriever, SourceKind};
use tracing::{debug, info, warn};

/// Fans a query out to a set of retrievers.
pub struct RetrievalFanout {
    retrievers: Vec<Arc<dyn Retriever>>,
    timeout: Option<Duration>,
    invocations: AtomicU64,
}

impl RetrievalFanout {
    /// `timeout` bounds each source individually. `None` waits indefinitely.
    pub fn new(retrievers: Vec<Arc<dyn Retriever>>, timeout: Option<Duration>) -> Self {
        Self {
            retrievers,
            timeout,
            invocations: AtomicU64::new(0),
        }
    }

    /// Total source lookups started since construction.
    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }

    /// Source kinds that have at least one registered retriever.
    pub fn kinds(&self) -> Vec<SourceKind> {
        let mut kinds: Vec<SourceKind> = self.retrievers.iter().map(|r| r.source_kind()).collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }

    /// Query every enabled source and merge the results.
    ///
    /// Never fails. Disabled sources are never invoked.
    pub async fn retrieve(&self, query: &str, flags: &RetrievalFlags) -> Vec<ContextFragment> {
        let enabled: Vec<&Arc<dyn Retriever>> = self
            .retrievers
            .iter()
            .filter(|r| flags.is_enabled(r.source_kind()))
            .collect();
        if enabled.is_empty() {
            debug!("no retrieval sources enabled");
            return Vec::new();
        }

        let lookups = enabled.into_iter().enumerate().map(|(position, retriever)| {
            self.invocations.fetch_add(1, Ordering::Relaxed);
            let kind = retriever.source_kind();
            async move {
                debug!(source = %kind, adapter = retriever.name(), "invoking retriever");
                let outcome = match self.timeout {
                    Some(limit) => match tokio::time::timeout(limit, retriever.query(query)).await {
                        Ok(result) => result,
                        Err(_) => Err(thoth_core::ThothError::Timeout { duration: limit }),
                    },
                    None => retriever.query(query).await,
                };
                let fragments = match outcome {
                    Ok(fragments) => {
                        debug!(source = %kind, hits = fragments.len(), "retriever returned");
                        fragments
                    }
                    Err(e) => {
                        warn!(source = %kind, adapter = retriever.name(), error = %e, "retriever failed, continuing without it");
                        Vec::new()
                    }
                };
                (kind, position, fragments)
            }
        });

        let mut results = join_all(lookups).await;
        results.sort_by_key(|(kind, position, _)| (*kind, *position));

        let merged: Vec<ContextFragment> = results
            .into_iter()
            .flat_map(|(_, _, fragments)| fragments)
            .collect();
        info!(fragments = merged.len(), "retrieval fan-out complete");
        merged
    }
}

/// Render fragments as one block, one cited line per fragment.
pub fn format_context_block(fragments: &[ContextFragment]) -> String {
    fragments
        .iter()
        .map(ContextFragment::render)
        .collect::<Vec<_>>()
        .join("\n")
}
