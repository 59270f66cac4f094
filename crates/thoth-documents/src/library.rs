// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ingestion front door: load, chunk, index, and record documents.

use std::path::Path;
use std::sync::Arc;

use thoth_core::types::{DocumentChunk, IndexedDocument};
use thoth_core::{DocumentRegistry, ThothError};
use tracing::{debug, info};

use crate::loader::{ensure_supported, load_document};
use crate::splitter::RecursiveSplitter;

/// Options for a single ingestion.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Re-index documents already recorded in the registry.
    pub force: bool,
    /// Registry and citation name. Defaults to the file name.
    pub display_name: Option<String>,
}

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Indexed { name: String, chunks: usize },
    /// Already in the registry and `force` was not set.
    Skipped { name: String },
    /// The file held no text worth indexing.
    Empty { name: String },
}

/// Documents chunked into the index behind a [`DocumentRegistry`].
#[derive(Clone)]
pub struct DocumentLibrary {
    registry: Arc<dyn DocumentRegistry>,
    splitter: RecursiveSplitter,
}

impl DocumentLibrary {
    pub fn new(registry: Arc<dyn DocumentRegistry>, splitter: RecursiveSplitter) -> Self {
        Self { registry, splitter }
    }

    /// Ingest one file.
    ///
    /// Unsupported file types fail with [`ThothError::UnsupportedDocument`]
    /// before anything is read or written.
    pub async fn ingest(
        &self,
        path: &Path,
        options: &IngestOptions,
    ) -> Result<IngestOutcome, ThothError> {
        ensure_supported(path)?;

        let name = options
            .display_name
            .clone()
            .or_else(|| path.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| path.display().to_string());

        if !options.force && self.registry.is_indexed(&name).await? {
            debug!(document = %name, "skipping already indexed document");
            return Ok(IngestOutcome::Skipped { name });
        }

        let document = load_document(path, Some(&name)).await?;
        let chunks: Vec<DocumentChunk> = self
            .splitter
            .split(&document.text)
            .into_iter()
            .enumerate()
            .map(|(ordinal, text)| DocumentChunk {
                source: name.clone(),
                ordinal,
                text,
            })
            .collect();

        if chunks.is_empty() {
            info!(document = %name, "no text content found");
            return Ok(IngestOutcome::Empty { name });
        }

        let count = chunks.len();
        if self.registry.replace_document(&name, chunks).await? {
            debug!(document = %name, "replaced previously indexed chunks");
        }
        info!(document = %name, chunks = count, "document indexed");
        Ok(IngestOutcome::Indexed {
            name,
            chunks: count,
        })
    }

    pub async fn list(&self) -> Result<Vec<IndexedDocument>, ThothError> {
        self.registry.list_documents().await
    }

    /// Clear the index and the registry.
    pub async fn reset(&self) -> Result<(), ThothError> {
        self.registry.reset_documents().await?;
        info!("document index reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use thoth_config::model::StorageConfig;
    use thoth_core::ContextStore;
    use thoth_storage::SqliteStorage;

    async fn library(dir: &Path, size: usize, overlap: usize) -> (DocumentLibrary, Arc<SqliteStorage>) {
        let storage = Arc::new(
            SqliteStorage::open(StorageConfig {
                database_path: dir.join("docs.db").to_string_lossy().into_owned(),
                wal_mode: true,
            })
            .await
            .unwrap(),
        );
        let lib = DocumentLibrary::new(
            storage.clone(),
            RecursiveSplitter::new(size, overlap).unwrap(),
        );
        (lib, storage)
    }

    #[tokio::test]
    async fn ingest_indexes_and_skips_repeat() {
        let dir = tempdir().unwrap();
        let (lib, storage) = library(dir.path(), 40, 0).await;
        let path = dir.path().join("fusion.md");
        std::fs::write(
            &path,
            "Tokamaks confine plasma magnetically.\n\nStellarators twist the field coils.",
        )
        .unwrap();

        let outcome = lib.ingest(&path, &IngestOptions::default()).await.unwrap();
        assert_eq!(
            outcome,
            IngestOutcome::Indexed {
                name: "fusion.md".into(),
                chunks: 2
            }
        );

        let again = lib.ingest(&path, &IngestOptions::default()).await.unwrap();
        assert_eq!(again, IngestOutcome::Skipped { name: "fusion.md".into() });

        let hits = storage.query("stellarators", 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source, "fusion.md");
    }

    #[tokio::test]
    async fn forced_reingest_replaces_chunks() {
        let dir = tempdir().unwrap();
        let (lib, storage) = library(dir.path(), 4000, 200).await;
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "old content about comets").unwrap();
        lib.ingest(&path, &IngestOptions::default()).await.unwrap();

        std::fs::write(&path, "new content about asteroids").unwrap();
        let forced = IngestOptions {
            force: true,
            ..IngestOptions::default()
        };
        lib.ingest(&path, &forced).await.unwrap();

        assert!(storage.query("comets", 5).await.unwrap().is_empty());
        assert_eq!(storage.query("asteroids", 5).await.unwrap().len(), 1);
        assert_eq!(lib.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unsupported_type_is_rejected_without_side_effects() {
        let dir = tempdir().unwrap();
        let (lib, _storage) = library(dir.path(), 4000, 200).await;
        let path = dir.path().join("report.docx");
        std::fs::write(&path, "PK\x03\x04").unwrap();

        let err = lib.ingest(&path, &IngestOptions::default()).await.unwrap_err();
        assert!(matches!(err, ThothError::UnsupportedDocument { ref extension } if extension == ".docx"));
        assert!(lib.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn pdf_text_is_searchable_after_ingest() {
        let dir = tempdir().unwrap();
        let (lib, storage) = library(dir.path(), 4000, 200).await;
        let path = dir.path().join("cosmology.pdf");
        crate::pdf::write_test_pdf(
            &path,
            &[
                &["The cosmic microwave background is relic radiation."],
                &["Hubble measured galaxies receding from each other."],
            ],
        );

        let outcome = lib.ingest(&path, &IngestOptions::default()).await.unwrap();
        assert_eq!(
            outcome,
            IngestOutcome::Indexed {
                name: "cosmology.pdf".into(),
                chunks: 1
            }
        );

        let hits = storage.query("microwave background", 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source, "cosmology.pdf");
        assert!(hits[0].text.contains("Hubble measured galaxies"));
    }

    #[tokio::test]
    async fn textless_pdf_fails_without_side_effects() {
        let dir = tempdir().unwrap();
        let (lib, _storage) = library(dir.path(), 4000, 200).await;
        let path = dir.path().join("scanned.pdf");
        crate::pdf::write_test_pdf(&path, &[&[]]);

        let err = lib.ingest(&path, &IngestOptions::default()).await.unwrap_err();
        assert!(matches!(err, ThothError::Document { .. }));
        assert!(lib.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_file_is_not_recorded() {
        let dir = tempdir().unwrap();
        let (lib, _storage) = library(dir.path(), 4000, 200).await;
        let path = dir.path().join("blank.txt");
        std::fs::write(&path, "   \n\n ").unwrap();
        let outcome = lib.ingest(&path, &IngestOptions::default()).await.unwrap();
        assert_eq!(outcome, IngestOutcome::Empty { name: "blank.txt".into() });
        assert!(lib.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let dir = tempdir().unwrap();
        let (lib, storage) = library(dir.path(), 4000, 200).await;
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "quasar observations").unwrap();
        lib.ingest(&path, &IngestOptions::default()).await.unwrap();
        lib.reset().await.unwrap();
        assert!(lib.list().await.unwrap().is_empty());
        assert!(storage.query("quasar", 5).await.unwrap().is_empty());
    }
}
