// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encyclopedic lookup through the MediaWiki action API.
//!
//! One request runs a full-text search and returns the plain-text intro
//! extract and canonical URL of each hit.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thoth_config::model::WikipediaConfig;
use thoth_core::types::ContextFragment;
use thoth_core::{AdapterType, HealthStatus, PluginAdapter, Retriever, SourceKind, ThothError};
use tracing::debug;

use crate::http::{build_client, ensure_success, retrieval_error, truncate_chars};

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<QueryPages>,
}

#[derive(Debug, Deserialize)]
struct QueryPages {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    /// Search rank, 1-based.
    #[serde(default)]
    index: u32,
    #[serde(default)]
    extract: String,
    #[serde(default)]
    fullurl: String,
}

pub struct WikipediaRetriever {
    client: reqwest::Client,
    config: WikipediaConfig,
}

impl WikipediaRetriever {
    pub fn new(config: WikipediaConfig, timeout: Duration) -> Result<Self, ThothError> {
        Ok(Self {
            client: build_client(SourceKind::Encyclopedia, timeout)?,
            config,
        })
    }
}

#[async_trait]
impl PluginAdapter for WikipediaRetriever {
    fn name(&self) -> &str {
        "wikipedia"
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
impl Retriever for WikipediaRetriever {
    fn source_kind(&self) -> SourceKind {
        SourceKind::Encyclopedia
    }

    async fn query(&self, text: &str) -> Result<Vec<ContextFragment>, ThothError> {
        let limit = self.config.top_k.to_string();
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("generator", "search"),
                ("gsrsearch", text),
                ("gsrlimit", limit.as_str()),
                ("prop", "extracts|info"),
                ("inprop", "url"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("exlimit", "max"),
            ])
            .send()
            .await
            .map_err(|e| retrieval_error(SourceKind::Encyclopedia, e.to_string()))?;
        let response = ensure_success(SourceKind::Encyclopedia, response).await?;
        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| retrieval_error(SourceKind::Encyclopedia, format!("bad response: {e}")))?;

        let mut pages = body.query.map(|q| q.pages).unwrap_or_default();
        pages.sort_by_key(|p| p.index);
        let fragments: Vec<ContextFragment> = pages
            .into_iter()
            .filter(|p| !p.extract.trim().is_empty())
            .map(|p| {
                let source = if p.fullurl.is_empty() {
                    p.title
                } else {
                    p.fullurl
                };
                ContextFragment::new(truncate_chars(p.extract.trim(), self.config.max_chars), source)
            })
            .collect();
        debug!(hits = fragments.len(), "wikipedia lookup complete");
        Ok(fragments)
    }
}
