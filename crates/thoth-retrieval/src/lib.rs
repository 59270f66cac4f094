// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval sources for the Thoth assistant and the fan-out layer that
//! queries them concurrently.

pub mod arxiv;
pub mod documents;
pub mod fanout;
mod http;
pub mod web;
pub mod wikipedia;

use std::sync::Arc;
use std::time::Duration;

use thoth_config::ThothConfig;
use thoth_core::{ContextStore, Retriever, ThothError};

pub use arxiv::ArxivRetriever;
pub use documents::DocumentRetriever;
pub use fanout::{RetrievalFanout, format_context_block};
pub use web::TavilyRetriever;
pub use wikipedia::WikipediaRetriever;

/// Build the standard four-source fan-out from configuration.
pub fn standard_fanout(
    config: &ThothConfig,
    store: Arc<dyn ContextStore>,
) -> Result<RetrievalFanout, ThothError> {
    let secs = config.retrieval.source_timeout_secs;
    let timeout = (secs > 0).then(|| Duration::from_secs(secs));
    // HTTP clients get a little headroom so the fan-out timeout fires first.
    let http_timeout = Duration::from_secs(if secs > 0 { secs + 5 } else { 120 });

    let retrievers: Vec<Arc<dyn Retriever>> = vec![
        Arc::new(DocumentRetriever::new(store, config.retrieval.documents_k)),
        Arc::new(WikipediaRetriever::new(config.wikipedia.clone(), http_timeout)?),
        Arc::new(ArxivRetriever::new(config.arxiv.clone(), http_timeout)?),
        Arc::new(TavilyRetriever::new(&config.web, http_timeout)?),
    ];
    Ok(RetrievalFanout::new(retrievers, timeout))
}
