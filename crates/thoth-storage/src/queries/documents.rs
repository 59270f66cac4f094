// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document chunk index (FTS5 with BM25 ranking) and the processed-file registry.

use rusqlite::params;
use thoth_core::ThothError;
use thoth_core::types::{ContextFragment, DocumentChunk, IndexedDocument};

use crate::database::{Database, map_tr_err};

/// Turn free text into an FTS5 query that cannot trip the MATCH syntax.
///
/// Each alphanumeric term is quoted and the terms are OR-joined, so BM25 ranks
/// chunks sharing more (and rarer) terms first. Returns `None` when the text
/// contains no searchable term.
pub fn sanitize_match_query(text: &str) -> Option<String> {
    let terms: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| format!("\"{}\"", t.to_lowercase()))
        .collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

/// Insert chunks in one transaction. FTS rows are maintained by triggers.
pub async fn insert_chunks(db: &Database, chunks: Vec<DocumentChunk>) -> Result<(), ThothError> {
    if chunks.is_empty() {
        return Ok(());
    }
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO document_chunks (source, ordinal, content) VALUES (?1, ?2, ?3)",
                )?;
                for chunk in &chunks {
                    stmt.execute(params![chunk.source, chunk.ordinal as i64, chunk.text])?;
                }
            }
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}

/// Up to `k` chunks ranked by BM25 relevance to `text`.
pub async fn search_chunks(
    db: &Database,
    text: &str,
    k: usize,
) -> Result<Vec<ContextFragment>, ThothError> {
    let Some(query) = sanitize_match_query(text) else {
        return Ok(Vec::new());
    };
    if k == 0 {
        return Ok(Vec::new());
    }
    db.connection()
        .call(move |conn| -> Result<Vec<ContextFragment>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT c.source, c.content FROM document_chunks_fts
                 JOIN document_chunks c ON c.id = document_chunks_fts.rowid
                 WHERE document_chunks_fts MATCH ?1
                 ORDER BY bm25(document_chunks_fts) LIMIT ?2",
            )?;
            let fragments = stmt
                .query_map(params![query, k as i64], |row| {
                    Ok(ContextFragment::new(
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(0)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(fragments)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn is_document_indexed(db: &Database, name: &str) -> Result<bool, ThothError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM documents WHERE name = ?1)",
                params![name],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Swap in `chunks` as the indexed content of `name` and record it, in one
/// transaction. Chunks are stored under `name` whatever their `source` says.
///
/// Returns whether an earlier version was replaced. On error the previous
/// chunks and registry entry are left as they were.
pub async fn replace_document(
    db: &Database,
    name: &str,
    chunks: Vec<DocumentChunk>,
) -> Result<bool, ThothError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction()?;
            let replaced: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM documents WHERE name = ?1)",
                params![name],
                |row| row.get(0),
            )?;
            tx.execute("DELETE FROM document_chunks WHERE source = ?1", params![name])?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO document_chunks (source, ordinal, content) VALUES (?1, ?2, ?3)",
                )?;
                for chunk in &chunks {
                    stmt.execute(params![name, chunk.ordinal as i64, chunk.text])?;
                }
            }
            tx.execute(
                "INSERT INTO documents (name, chunk_count) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET
                    chunk_count = excluded.chunk_count,
                    indexed_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![name, chunks.len() as i64],
            )?;
            tx.commit()?;
            Ok(replaced)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn list_documents(db: &Database) -> Result<Vec<IndexedDocument>, ThothError> {
    db.connection()
        .call(|conn| -> Result<Vec<IndexedDocument>, rusqlite::Error> {
            let mut stmt =
                conn.prepare("SELECT name, chunk_count, indexed_at FROM documents ORDER BY name")?;
            let docs = stmt
                .query_map([], |row| {
                    Ok(IndexedDocument {
                        name: row.get(0)?,
                        chunk_count: row.get::<_, i64>(1)? as usize,
                        indexed_at: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(docs)
        })
        .await
        .map_err(map_tr_err)
}

/// Drop every chunk and registry entry.
pub async fn reset_documents(db: &Database) -> Result<(), ThothError> {
    db.connection()
        .call(|conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            tx.execute_batch(
                "DELETE FROM document_chunks;
                 DELETE FROM documents;
                 INSERT INTO document_chunks_fts(document_chunks_fts) VALUES('rebuild');",
            )?;
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}
