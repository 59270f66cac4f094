// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Web search through the Tavily search API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thoth_config::model::WebSearchConfig;
use thoth_core::types::ContextFragment;
use thoth_core::{AdapterType, HealthStatus, PluginAdapter, Retriever, SourceKind, ThothError};
use tracing::debug;

use crate::http::{build_client, ensure_success, retrieval_error};

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    search_depth: &'static str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

pub struct TavilyRetriever {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    max_results: usize,
}

impl TavilyRetriever {
    /// The API key is resolved once here; `None` makes every query fail softly.
    pub fn new(config: &WebSearchConfig, timeout: Duration) -> Result<Self, ThothError> {
        Ok(Self {
            client: build_client(SourceKind::Web, timeout)?,
            base_url: config.base_url.clone(),
            api_key: config.resolved_api_key(),
            max_results: config.max_results,
        })
    }
}

#[async_trait]
impl PluginAdapter for TavilyRetriever {
    fn name(&self) -> &str {
        "tavily"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Retriever
    }

    async fn health_check(&self) -> Result<HealthStatus, ThothError> {
        Ok(match self.api_key {
            Some(_) => HealthStatus::Healthy,
            None => HealthStatus::Degraded("no Tavily API key configured".into()),
        })
    }
}

#[async_trait]
impl Retriever for TavilyRetriever {
    fn source_kind(&self) -> SourceKind {
        SourceKind::Web
    }

    async fn query(&self, text: &str) -> Result<Vec<ContextFragment>, ThothError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            retrieval_error(
                SourceKind::Web,
                "no API key (set web.api_key or TAVILY_API_KEY)",
            )
        })?;
        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(api_key)
            .json(&SearchRequest {
                api_key,
                query: text,
                max_results: self.max_results,
                search_depth: "basic",
            })
            .send()
            .await
            .map_err(|e| retrieval_error(SourceKind::Web, e.to_string()))?;
        let response = ensure_success(SourceKind::Web, response).await?;
        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| retrieval_error(SourceKind::Web, format!("bad response: {e}")))?;

        let fragments: Vec<ContextFragment> = body
            .results
            .into_iter()
            .filter(|r| !r.content.trim().is_empty())
            .map(|r| ContextFragment::new(r.content, r.url))
            .collect();
        debug!(hits = fragments.len(), "web search complete");
        Ok(fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn retriever(uri: &str, key: Option<&str>) -> TavilyRetriever {
        let mut retriever = TavilyRetriever::new(
            &WebSearchConfig {
                base_url: uri.to_string(),
                api_key: key.map(str::to_string),
                max_results: 5,
            },
            Duration::from_secs(5),
        )
        .unwrap();
        // Keep the ambient TAVILY_API_KEY out of the tests.
        retriever.api_key = key.map(str::to_string);
        retriever
    }

    #[tokio::test]
    async fn url_becomes_source_label() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer tvly-test"))
            .and(body_partial_json(serde_json::json!({"query": "rust 2024 edition", "max_results": 5})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "query": "rust 2024 edition",
                "results": [
                    {"title": "Rust Blog", "url": "https://blog.rust-lang.org/2025/02/20/Rust-1.85.0.html",
                     "content": "Rust 1.85 stabilizes the 2024 edition.", "score": 0.9},
                    {"title": "Empty", "url": "https://example.com", "content": "  ", "score": 0.1}
                ]
            })))
            .mount(&server)
            .await;

        let hits = retriever(&server.uri(), Some("tvly-test"))
            .query("rust 2024 edition")
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source, "https://blog.rust-lang.org/2025/02/20/Rust-1.85.0.html");
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let r = retriever(&server.uri(), None);
        assert!(matches!(
            r.query("anything").await,
            Err(ThothError::Retrieval { source_kind: SourceKind::Web, .. })
        ));
        assert!(matches!(r.health_check().await.unwrap(), HealthStatus::Degraded(_)));
    }
}
