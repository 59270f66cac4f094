// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Academic paper lookup against the arXiv Atom API.
//!
//! Each entry becomes one fragment holding the title and abstract. The
//! entry identifier (the abstract URL) is the citation label.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use thoth_config::model::ArxivConfig;
use thoth_core::types::ContextFragment;
use thoth_core::{AdapterType, HealthStatus, PluginAdapter, Retriever, SourceKind, ThothError};
use tracing::debug;

use crate::http::{build_client, ensure_success, retrieval_error};

static ENTRY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<entry\b[^>]*>(.*?)</entry>").unwrap());
static ENTRY_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<id>(.*?)</id>").unwrap());
static TITLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<title\b[^>]*>(.*?)</title>").unwrap());
static SUMMARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<summary\b[^>]*>(.*?)</summary>").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// A paper parsed out of an Atom feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArxivEntry {
    pub entry_id: String,
    pub title: String,
    pub summary: String,
}

/// Parse `<entry>` elements from an arXiv Atom feed, in feed order.
///
/// Entries without an identifier or abstract are dropped.
pub fn parse_feed(xml: &str) -> Vec<ArxivEntry> {
    ENTRY
        .captures_iter(xml)
        .filter_map(|entry| {
            let body = entry.get(1)?.as_str();
            let field = |re: &Regex| {
                re.captures(body)
                    .and_then(|c| c.get(1))
                    .map(|m| normalize(m.as_str()))
                    .unwrap_or_default()
            };
            let entry_id = field(&ENTRY_ID);
            let summary = field(&SUMMARY);
            if entry_id.is_empty() || summary.is_empty() {
                return None;
            }
            Some(ArxivEntry {
                entry_id,
                title: field(&TITLE),
                summary,
            })
        })
        .collect()
}

fn normalize(raw: &str) -> String {
    let text = raw
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&");
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

pub struct ArxivRetriever {
    client: reqwest::Client,
    config: ArxivConfig,
}

impl ArxivRetriever {
    pub fn new(config: ArxivConfig, timeout: Duration) -> Result<Self, ThothError> {
        Ok(Self {
            client: build_client(SourceKind::Academic, timeout)?,
            config,
        })
    }
}

#[async_trait]
impl PluginAdapter for ArxivRetriever {
    fn name(&self) -> &str {
        "arxiv"
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
impl Retriever for ArxivRetriever {
    fn source_kind(&self) -> SourceKind {
        SourceKind::Academic
    }

    async fn query(&self, text: &str) -> Result<Vec<ContextFragment>, ThothError> {
        let search = format!("all:{}", text.trim());
        let max_results = self.config.max_results.to_string();
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("search_query", search.as_str()),
                ("start", "0"),
                ("max_results", max_results.as_str()),
            ])
            .send()
            .await
            .map_err(|e| retrieval_error(SourceKind::Academic, e.to_string()))?;
        let response = ensure_success(SourceKind::Academic, response).await?;
        let xml = response
            .text()
            .await
            .map_err(|e| retrieval_error(SourceKind::Academic, e.to_string()))?;

        let fragments: Vec<ContextFragment> = parse_feed(&xml)
            .into_iter()
            .map(|e| {
                let text = if e.title.is_empty() {
                    e.summary
                } else {
                    format!("{}: {}", e.title, e.summary)
                };
                ContextFragment::new(text, e.entry_id)
            })
            .collect();
        debug!(hits = fragments.len(), "arxiv lookup complete");
        Ok(fragments)
    }
}
