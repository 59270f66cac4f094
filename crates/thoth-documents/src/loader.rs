// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reads supported document types into plain text.
//!
//! Text and Markdown files are read as UTF-8. PDFs go through
//! [`pdf::extract_text`](crate::pdf::extract_text) on the blocking pool. Word
//! documents are not supported.

use std::path::Path;

use thoth_core::ThothError;

use crate::pdf;

/// Extensions (lowercase, with dot) that ingestion accepts.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".txt", ".md", ".pdf"];

/// A document read from disk, before chunking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    /// Display name recorded in the registry and used as the citation label.
    pub name: String,
    pub text: String,
}

/// Lowercased extension with a leading dot, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Fails with [`ThothError::UnsupportedDocument`] for unknown file types.
pub fn ensure_supported(path: &Path) -> Result<(), ThothError> {
    let extension = extension_of(path);
    if SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(ThothError::UnsupportedDocument { extension })
    }
}

/// Read a document. `display_name` defaults to the file name.
pub async fn load_document(
    path: &Path,
    display_name: Option<&str>,
) -> Result<LoadedDocument, ThothError> {
    ensure_supported(path)?;
    let text = if extension_of(path) == ".pdf" {
        let owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || pdf::extract_text(&owned))
            .await
            .map_err(|e| ThothError::Internal(format!("PDF extraction task failed: {e}")))??
    } else {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ThothError::Document {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
    };
    let name = display_name
        .map(str::to_string)
        .or_else(|| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| path.display().to_string());
    Ok(LoadedDocument { name, text })
}
