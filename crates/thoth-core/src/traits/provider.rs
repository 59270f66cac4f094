// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for the answer engine (Ollama, etc.).

use async_trait::async_trait;

use crate::error::ThothError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ProviderRequest, ProviderResponse};

/// Adapter for text-generation backends.
///
/// Calls are single-shot and stateless. The model is carried on every
/// request so concurrent turns never share a mutable "current model".
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends a prompt and returns the generated text.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ThothError>;
}
