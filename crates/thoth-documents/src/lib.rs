// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document ingestion for the Thoth assistant.
//!
//! Plain-text, Markdown and PDF files are split into overlapping chunks and
//! indexed for the [`ContextStore`](thoth_core::ContextStore). A registry of
//! processed names lets repeat ingestion skip files that are already indexed.

pub mod library;
pub mod loader;
pub mod pdf;
pub mod splitter;

pub use library::{DocumentLibrary, IngestOptions, IngestOutcome};
pub use loader::{LoadedDocument, SUPPORTED_EXTENSIONS, load_document};
pub use splitter::RecursiveSplitter;
