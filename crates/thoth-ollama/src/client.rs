// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Ollama REST API.

use std::time::Duration;

use thoth_core::ThothError;
use tracing::{debug, warn};

use crate::types::{
    ApiErrorResponse, GenerateRequest, GenerateResponse, PullRequest, PullResponse, TagsResponse,
};

/// Ollama HTTP client with one retry on transient errors (429, 500, 503).
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl OllamaClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ThothError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ThothError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: 1,
            retry_delay: Duration::from_secs(1),
        })
    }

    /// Shortens the pause between attempts (tests).
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Run a non-streaming generation.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ThothError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying generate request after transient error");
                tokio::time::sleep(self.retry_delay).await;
            }

            let response = self
                .client
                .post(self.url("/api/generate"))
                .json(request)
                .send()
                .await
                .map_err(|e| ThothError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, model = %request.model, "generate response received");

            if status.is_success() {
                return response
                    .json::<GenerateResponse>()
                    .await
                    .map_err(|e| ThothError::Provider {
                        message: format!("failed to parse generate response: {e}"),
                        source: Some(Box::new(e)),
                    });
            }

            let body = response.text().await.unwrap_or_default();
            let error = ThothError::Provider {
                message: describe_error(status, &body),
                source: None,
            };
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(error);
                continue;
            }
            return Err(error);
        }

        Err(last_error.unwrap_or_else(|| ThothError::Provider {
            message: "generate request failed after retries".into(),
            source: None,
        }))
    }

    /// Names of models already downloaded on the server, sorted.
    pub async fn list_models(&self) -> Result<Vec<String>, ThothError> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .send()
            .await
            .map_err(|e| ThothError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ThothError::Provider {
                message: describe_error(status, &body),
                source: None,
            });
        }
        let tags: TagsResponse = response.json().await.map_err(|e| ThothError::Provider {
            message: format!("failed to parse model list: {e}"),
            source: Some(Box::new(e)),
        })?;
        let mut names: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Download a model, blocking until Ollama reports completion.
    pub async fn pull_model(&self, model: &str) -> Result<String, ThothError> {
        let response = self
            .client
            .post(self.url("/api/pull"))
            .json(&PullRequest {
                model: model.to_string(),
                stream: false,
            })
            .send()
            .await
            .map_err(|e| ThothError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ThothError::Provider {
                message: describe_error(status, &body),
                source: None,
            });
        }
        let pulled: PullResponse = response.json().await.map_err(|e| ThothError::Provider {
            message: format!("failed to parse pull response: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(pulled.status)
    }
}

/// True when `model` matches a local tag exactly, via the implicit
/// `:latest` tag, or by bare family name.
pub fn is_model_local(model: &str, local: &[String]) -> bool {
    let latest = format!("{model}:latest");
    local.iter().any(|m| {
        m == model || *m == latest || m.split(':').next().is_some_and(|family| family == model)
    })
}

fn describe_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => format!("Ollama error ({status}): {}", api_err.error),
        Err(_) => format!("Ollama returned {status}: {body}"),
    }
}

/// Returns true for HTTP status codes worth one retry.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}
