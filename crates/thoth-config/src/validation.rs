// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::ThothConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every violation instead of failing fast.
pub fn validate_config(config: &ThothConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.ollama.default_model.trim().is_empty() {
        fail("ollama.default_model must not be empty".to_string());
    }

    for (key, url) in [
        ("ollama.base_url", &config.ollama.base_url),
        ("wikipedia.base_url", &config.wikipedia.base_url),
        ("arxiv.base_url", &config.arxiv.base_url),
        ("web.base_url", &config.web.base_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            fail(format!("{key} must be an http(s) URL, got `{url}`"));
        }
    }

    if !matches!(
        config.agent.log_level.as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        fail(format!(
            "agent.log_level must be one of trace, debug, info, warn, error; got `{}`",
            config.agent.log_level
        ));
    }

    if config.retrieval.documents_k == 0 {
        fail("retrieval.documents_k must be at least 1".to_string());
    }

    let docs = &config.documents;
    if docs.chunk_size == 0 {
        fail("documents.chunk_size must be at least 1".to_string());
    }
    if docs.chunk_overlap >= docs.chunk_size {
        fail(format!(
            "documents.chunk_overlap ({}) must be smaller than documents.chunk_size ({})",
            docs.chunk_overlap, docs.chunk_size
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
