// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared HTTP plumbing for the external lookup services.

use std::time::Duration;

use thoth_core::{SourceKind, ThothError};

const USER_AGENT: &str = concat!("thoth/", env!("CARGO_PKG_VERSION"));

/// Client used by every external retriever.
pub(crate) fn build_client(kind: SourceKind, timeout: Duration) -> Result<reqwest::Client, ThothError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| retrieval_error(kind, format!("failed to build HTTP client: {e}")))
}

pub(crate) fn retrieval_error(kind: SourceKind, message: impl Into<String>) -> ThothError {
    ThothError::Retrieval {
        source_kind: kind,
        message: message.into(),
    }
}

/// Fail with a retrieval error unless the response is 2xx.
pub(crate) async fn ensure_success(
    kind: SourceKind,
    response: reqwest::Response,
) -> Result<reqwest::Response, ThothError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(retrieval_error(kind, format!("HTTP {status}: {body}")))
}

/// Cut `text` to at most `max_chars` characters.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
