// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama provider adapter for Thoth.
//!
//! Every call names its model explicitly, so switching models between turns
//! never mutates shared state.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use thoth_config::model::OllamaConfig;
use thoth_core::types::{ProviderRequest, ProviderResponse};
use thoth_core::{AdapterType, HealthStatus, PluginAdapter, ProviderAdapter, ThothError};
use tracing::debug;

pub use client::{OllamaClient, is_model_local};
use types::GenerateRequest;

/// Widely used models offered alongside local ones when picking a model.
pub const POPULAR_MODELS: &[&str] = &[
    "llama3.1:8b",
    "llama3.1:70b",
    "llama3.2:1b",
    "llama3.2:3b",
    "llama3.3:70b",
    "qwen3:0.6b",
    "qwen3:1.7b",
    "qwen3:4b",
    "qwen3:8b",
    "qwen3:14b",
    "qwen3:30b",
    "qwen2.5:7b",
    "qwen2.5:14b",
    "qwen2.5:32b",
    "qwen2.5:72b",
    "gemma3:1b",
    "gemma3:4b",
    "gemma3:12b",
    "gemma3:27b",
    "mistral:7b",
    "mixtral:8x7b",
    "phi4:14b",
    "phi4-mini:3.8b",
    "deepseek-r1:1.5b",
    "deepseek-r1:7b",
    "deepseek-r1:8b",
    "deepseek-r1:14b",
    "deepseek-r1:32b",
    "deepseek-r1:70b",
];

/// Answer engine backed by a local Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: OllamaClient,
    default_model: String,
}

impl OllamaProvider {
    pub fn new(config: &OllamaConfig) -> Result<Self, ThothError> {
        let client = OllamaClient::new(&config.base_url, Duration::from_secs(config.timeout_secs))?;
        Ok(Self {
            client,
            default_model: config.default_model.clone(),
        })
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn client(&self) -> &OllamaClient {
        &self.client
    }

    /// Local models merged with [`POPULAR_MODELS`], sorted and deduplicated.
    pub async fn list_all_models(&self) -> Vec<String> {
        let mut all = self.client.list_models().await.unwrap_or_default();
        all.extend(POPULAR_MODELS.iter().map(|m| m.to_string()));
        all.sort();
        all.dedup();
        all
    }
}

#[async_trait]
impl PluginAdapter for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    /// Healthy when the server answers and the default model is downloaded.
    async fn health_check(&self) -> Result<HealthStatus, ThothError> {
        match self.client.list_models().await {
            Ok(local) if is_model_local(&self.default_model, &local) => Ok(HealthStatus::Healthy),
            Ok(_) => Ok(HealthStatus::Degraded(format!(
                "model {} is not downloaded",
                self.default_model
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl ProviderAdapter for OllamaProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ThothError> {
        let model = if request.model.trim().is_empty() {
            self.default_model.clone()
        } else {
            request.model
        };
        let reply = self
            .client
            .generate(&GenerateRequest {
                model: model.clone(),
                prompt: request.prompt,
                stream: false,
            })
            .await?;
        debug!(model = %model, chars = reply.response.len(), "completion received");
        Ok(ProviderResponse {
            content: reply.response,
            model: reply.model,
        })
    }
}
