// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thread ledger CRUD operations.

use rusqlite::params;
use thoth_core::{Thread, ThothError, ThreadId};

use crate::database::{Database, map_tr_err};

const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

/// Next value of the ledger-wide revision counter, used to break `updated_at` ties.
const NEXT_REVISION: &str = "(SELECT COALESCE(MAX(revision), 0) + 1 FROM threads)";

fn row_to_thread(row: &rusqlite::Row<'_>) -> rusqlite::Result<Thread> {
    Ok(Thread {
        id: ThreadId::new(row.get::<_, String>(0)?),
        name: row.get(1)?,
        auto_named: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Create or rename a thread, bumping `updated_at`.
pub async fn upsert_thread(db: &Database, id: &ThreadId, name: &str) -> Result<(), ThothError> {
    let id = id.to_string();
    let name = name.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                &format!(
                    "INSERT INTO threads (id, name, auto_named, revision)
                     VALUES (?1, ?2, 0, {NEXT_REVISION})
                     ON CONFLICT(id) DO UPDATE SET
                        name = excluded.name,
                        auto_named = 0,
                        revision = excluded.revision,
                        updated_at = {NOW}"
                ),
                params![id, name],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a placeholder-named thread unless one already exists, then return it.
pub async fn ensure_thread(
    db: &Database,
    id: &ThreadId,
    placeholder: &str,
) -> Result<Thread, ThothError> {
    let id = id.to_string();
    let placeholder = placeholder.to_string();
    db.connection()
        .call(move |conn| -> Result<Thread, rusqlite::Error> {
            conn.execute(
                &format!(
                    "INSERT INTO threads (id, name, auto_named, revision)
                     VALUES (?1, ?2, 1, {NEXT_REVISION})
                     ON CONFLICT(id) DO NOTHING"
                ),
                params![id, placeholder],
            )?;
            conn.query_row(
                "SELECT id, name, auto_named, created_at, updated_at FROM threads WHERE id = ?1",
                params![id],
                row_to_thread,
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Bump `updated_at` without renaming. Unknown ids are ignored.
pub async fn touch_thread(db: &Database, id: &ThreadId) -> Result<(), ThothError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                &format!(
                    "UPDATE threads SET updated_at = {NOW}, revision = {NEXT_REVISION}
                     WHERE id = ?1"
                ),
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a thread by id.
pub async fn get_thread(db: &Database, id: &ThreadId) -> Result<Option<Thread>, ThothError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Thread>, rusqlite::Error> {
            let result = conn.query_row(
                "SELECT id, name, auto_named, created_at, updated_at FROM threads WHERE id = ?1",
                params![id],
                row_to_thread,
            );
            match result {
                Ok(thread) => Ok(Some(thread)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// All threads, most recently updated first.
pub async fn list_threads(db: &Database) -> Result<Vec<Thread>, ThothError> {
    db.connection()
        .call(|conn| -> Result<Vec<Thread>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, name, auto_named, created_at, updated_at FROM threads
                 ORDER BY updated_at DESC, revision DESC",
            )?;
            let threads = stmt
                .query_map([], row_to_thread)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(threads)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a ledger row. Returns whether it existed.
pub async fn delete_thread(db: &Database, id: &ThreadId) -> Result<bool, ThothError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let removed = conn.execute("DELETE FROM threads WHERE id = ?1", params![id])?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn upsert_is_idempotent() {
        let (db, _dir) = setup_db().await;
        let id = ThreadId::new("abc123def456");

        upsert_thread(&db, &id, "Research").await.unwrap();
        upsert_thread(&db, &id, "Research").await.unwrap();

        let all = list_threads(&db).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Research");
        assert!(!all[0].auto_named);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn upsert_renames_existing_thread() {
        let (db, _dir) = setup_db().await;
        let id = ThreadId::new("t1");
        upsert_thread(&db, &id, "first").await.unwrap();
        upsert_thread(&db, &id, "second").await.unwrap();
        let thread = get_thread(&db, &id).await.unwrap().unwrap();
        assert_eq!(thread.name, "second");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn ensure_never_renames() {
        let (db, _dir) = setup_db().await;
        let id = ThreadId::new("t-ensure");

        let created = ensure_thread(&db, &id, "Thread Jan 01, 10:00").await.unwrap();
        assert!(created.auto_named);
        assert_eq!(created.name, "Thread Jan 01, 10:00");

        upsert_thread(&db, &id, "Named by user").await.unwrap();
        let again = ensure_thread(&db, &id, "Thread Jan 02, 11:00").await.unwrap();
        assert_eq!(again.name, "Named by user");
        assert!(!again.auto_named);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_orders_by_most_recent_update() {
        let (db, _dir) = setup_db().await;
        let a = ThreadId::new("a");
        let b = ThreadId::new("b");
        let c = ThreadId::new("c");
        upsert_thread(&db, &a, "A").await.unwrap();
        upsert_thread(&db, &b, "B").await.unwrap();
        upsert_thread(&db, &c, "C").await.unwrap();
        touch_thread(&db, &a).await.unwrap();

        let ids: Vec<String> = list_threads(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id.to_string())
            .collect();
        assert_eq!(ids, vec!["a", "c", "b"]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let (db, _dir) = setup_db().await;
        let id = ThreadId::new("gone");
        upsert_thread(&db, &id, "Temp").await.unwrap();
        assert!(delete_thread(&db, &id).await.unwrap());
        assert!(!delete_thread(&db, &id).await.unwrap());
        assert!(get_thread(&db, &id).await.unwrap().is_none());
        db.close().await.unwrap();
    }
}
