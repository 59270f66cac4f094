// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compression: condenses the merged fan-out results into one cited block
//! with a single generative call.

use thoth_core::ThothError;
use thoth_core::traits::ProviderAdapter;
use thoth_core::types::{ContextFragment, ProviderRequest};
use thoth_retrieval::format_context_block;

use crate::prompts::compression_prompt;

/// Compresses `fragments` down to what is relevant to `question`.
///
/// Returns `Ok(None)` without calling the model when there is nothing to
/// compress, or when the model answers with blank text. Provider failures
/// propagate.
pub async fn compress_context(
    provider: &dyn ProviderAdapter,
    model: &str,
    fragments: &[ContextFragment],
    question: &str,
) -> Result<Option<String>, ThothError> {
    if fragments.is_empty() {
        tracing::debug!("nothing retrieved, skipping compression");
        return Ok(None);
    }

    let block = format_context_block(fragments);
    let request = ProviderRequest {
        model: model.to_string(),
        prompt: compression_prompt(&block, question),
    };
    let response = provider.complete(request).await?;
    let compressed = response.content.trim().to_string();

    tracing::info!(
        model = model,
        fragments = fragments.len(),
        input_chars = block.chars().count(),
        output_chars = compressed.chars().count(),
        "context compressed"
    );

    if compressed.is_empty() {
        tracing::warn!("compression returned no text, nothing appended");
        return Ok(None);
    }
    Ok(Some(compressed))
}
