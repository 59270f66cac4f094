// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `thoth ingest` and `thoth documents` command implementations.

use std::path::PathBuf;

use colored::Colorize;
use thoth_core::ThothError;
use thoth_documents::{DocumentLibrary, IngestOptions, IngestOutcome, SUPPORTED_EXTENSIONS};

/// Ingests each path in turn. One bad file does not stop the rest; the
/// command fails at the end if any file failed.
pub async fn ingest(
    library: &DocumentLibrary,
    paths: &[PathBuf],
    force: bool,
) -> Result<(), ThothError> {
    let options = IngestOptions {
        force,
        display_name: None,
    };
    let mut failed = 0usize;
    for path in paths {
        match library.ingest(path, &options).await {
            Ok(IngestOutcome::Indexed { name, chunks }) => {
                println!("{} {name} ({chunks} chunks)", "indexed".green());
            }
            Ok(IngestOutcome::Skipped { name }) => {
                println!(
                    "{} {name} (already indexed, use --force to re-index)",
                    "skipped".yellow()
                );
            }
            Ok(IngestOutcome::Empty { name }) => {
                println!("{} {name} (no text content)", "empty".yellow());
            }
            Err(e @ ThothError::UnsupportedDocument { .. }) => {
                failed += 1;
                eprintln!(
                    "{}: {}: {e} (supported: {})",
                    "error".red(),
                    path.display(),
                    SUPPORTED_EXTENSIONS.join(", ")
                );
            }
            Err(e) => {
                failed += 1;
                eprintln!("{}: {}: {e}", "error".red(), path.display());
            }
        }
    }
    if failed > 0 {
        return Err(ThothError::Document {
            path: format!("{failed} of {} file(s)", paths.len()),
            message: "ingestion failed".into(),
        });
    }
    Ok(())
}

pub async fn list(library: &DocumentLibrary) -> Result<(), ThothError> {
    let documents = library.list().await?;
    if documents.is_empty() {
        println!("No documents indexed.");
        return Ok(());
    }
    for doc in documents {
        println!(
            "{}  {} chunks  {}",
            doc.name.bold(),
            doc.chunk_count,
            doc.indexed_at.dimmed()
        );
    }
    Ok(())
}

pub async fn reset(library: &DocumentLibrary) -> Result<(), ThothError> {
    library.reset().await?;
    println!("document index cleared");
    Ok(())
}
