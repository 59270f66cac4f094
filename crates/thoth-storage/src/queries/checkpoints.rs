// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only conversation checkpoints.
//!
//! Snapshots are stored as JSON. Each `put` allocates the next version for its
//! thread inside one transaction, so writes for a thread apply in issue order.

use rusqlite::{OptionalExtension, params};
use thoth_core::{ConversationState, ThothError, ThreadId};

use crate::database::{Database, map_tr_err};

/// Append a snapshot and return its version.
pub async fn put_checkpoint(
    db: &Database,
    thread_id: &ThreadId,
    state: &ConversationState,
) -> Result<u64, ThothError> {
    let payload = serde_json::to_string(state).map_err(ThothError::storage)?;
    let thread_id = thread_id.to_string();
    db.connection()
        .call(move |conn| -> Result<u64, rusqlite::Error> {
            let tx = conn.transaction()?;
            let version: i64 = tx.query_row(
                "SELECT COALESCE(MAX(version), 0) + 1 FROM checkpoints WHERE thread_id = ?1",
                params![thread_id],
                |row| row.get(0),
            )?;
            tx.execute(
                "INSERT INTO checkpoints (thread_id, version, state) VALUES (?1, ?2, ?3)",
                params![thread_id, version, payload],
            )?;
            tx.commit()?;
            Ok(version as u64)
        })
        .await
        .map_err(map_tr_err)
}

/// Raw JSON of the latest snapshot, with its version.
pub async fn latest_checkpoint(
    db: &Database,
    thread_id: &ThreadId,
) -> Result<Option<(u64, String)>, ThothError> {
    let thread_id = thread_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<(u64, String)>, rusqlite::Error> {
            conn.query_row(
                "SELECT version, state FROM checkpoints WHERE thread_id = ?1
                 ORDER BY version DESC LIMIT 1",
                params![thread_id],
                |row| Ok((row.get::<_, i64>(0)? as u64, row.get(1)?)),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Raw JSON of one specific snapshot version.
pub async fn checkpoint_at(
    db: &Database,
    thread_id: &ThreadId,
    version: u64,
) -> Result<Option<String>, ThothError> {
    let thread_id = thread_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
            conn.query_row(
                "SELECT state FROM checkpoints WHERE thread_id = ?1 AND version = ?2",
                params![thread_id, version as i64],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Stored versions for a thread, ascending.
pub async fn list_versions(db: &Database, thread_id: &ThreadId) -> Result<Vec<u64>, ThothError> {
    let thread_id = thread_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<u64>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT version FROM checkpoints WHERE thread_id = ?1 ORDER BY version ASC",
            )?;
            let versions = stmt
                .query_map(params![thread_id], |row| row.get::<_, i64>(0))?
                .map(|v| v.map(|v| v as u64))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(versions)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete every snapshot for a thread. Returns the number of rows removed.
pub async fn purge_checkpoints(db: &Database, thread_id: &ThreadId) -> Result<u64, ThothError> {
    let thread_id = thread_id.to_string();
    db.connection()
        .call(move |conn| -> Result<u64, rusqlite::Error> {
            let removed =
                conn.execute("DELETE FROM checkpoints WHERE thread_id = ?1", params![thread_id])?;
            Ok(removed as u64)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use thoth_core::Message;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn state_with(n: usize) -> ConversationState {
        let mut state = ConversationState::default();
        for i in 0..n {
            state.messages.push(Message::user(format!("q{i}")));
            state.messages.push(Message::assistant(format!("a{i}")));
        }
        state
    }

    #[tokio::test]
    async fn versions_increase_per_thread() {
        let (db, _dir) = setup_db().await;
        let a = ThreadId::new("a");
        let b = ThreadId::new("b");

        assert_eq!(put_checkpoint(&db, &a, &state_with(1)).await.unwrap(), 1);
        assert_eq!(put_checkpoint(&db, &a, &state_with(2)).await.unwrap(), 2);
        assert_eq!(put_checkpoint(&db, &b, &state_with(1)).await.unwrap(), 1);

        assert_eq!(list_versions(&db, &a).await.unwrap(), vec![1, 2]);
        let (version, json) = latest_checkpoint(&db, &a).await.unwrap().unwrap();
        assert_eq!(version, 2);
        let state: ConversationState = serde_json::from_str(&json).unwrap();
        assert_eq!(state.messages.len(), 4);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn point_in_time_read() {
        let (db, _dir) = setup_db().await;
        let id = ThreadId::new("pit");
        put_checkpoint(&db, &id, &state_with(1)).await.unwrap();
        put_checkpoint(&db, &id, &state_with(3)).await.unwrap();

        let first = checkpoint_at(&db, &id, 1).await.unwrap().unwrap();
        let first: ConversationState = serde_json::from_str(&first).unwrap();
        assert_eq!(first.messages.len(), 2);
        assert!(checkpoint_at(&db, &id, 9).await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn purge_removes_only_that_thread() {
        let (db, _dir) = setup_db().await;
        let keep = ThreadId::new("keep");
        let drop = ThreadId::new("drop");
        put_checkpoint(&db, &keep, &state_with(1)).await.unwrap();
        put_checkpoint(&db, &drop, &state_with(1)).await.unwrap();
        put_checkpoint(&db, &drop, &state_with(2)).await.unwrap();

        assert_eq!(purge_checkpoints(&db, &drop).await.unwrap(), 2);
        assert!(latest_checkpoint(&db, &drop).await.unwrap().is_none());
        assert!(latest_checkpoint(&db, &keep).await.unwrap().is_some());
        db.close().await.unwrap();
    }
}
