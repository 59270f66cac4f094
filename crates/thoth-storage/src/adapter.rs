// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage-facing traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use thoth_config::model::StorageConfig;
use thoth_core::types::{ContextFragment, DocumentChunk, IndexedDocument};
use thoth_core::{
    AdapterType, CheckpointStore, ContextStore, ConversationState, DocumentRegistry,
    HealthStatus, PluginAdapter, StorageAdapter, Thread, ThothError, ThreadId, ThreadLedger,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed thread ledger, checkpoint store, and document index.
///
/// The database is opened on the first call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a storage adapter. No file is touched until [`initialize`](StorageAdapter::initialize).
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Create and initialize in one step.
    pub async fn open(config: StorageConfig) -> Result<Self, ThothError> {
        let storage = Self::new(config);
        storage.initialize().await?;
        Ok(storage)
    }

    fn db(&self) -> Result<&Database, ThothError> {
        self.db.get().ok_or_else(|| ThothError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ThothError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("not initialized".to_string()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), ThothError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| ThothError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), ThothError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl ThreadLedger for SqliteStorage {
    async fn upsert(&self, id: &ThreadId, name: &str) -> Result<(), ThothError> {
        queries::threads::upsert_thread(self.db()?, id, name).await
    }

    async fn ensure(&self, id: &ThreadId, placeholder: &str) -> Result<Thread, ThothError> {
        queries::threads::ensure_thread(self.db()?, id, placeholder).await
    }

    async fn touch(&self, id: &ThreadId) -> Result<(), ThothError> {
        queries::threads::touch_thread(self.db()?, id).await
    }

    async fn get(&self, id: &ThreadId) -> Result<Option<Thread>, ThothError> {
        queries::threads::get_thread(self.db()?, id).await
    }

    async fn list(&self) -> Result<Vec<Thread>, ThothError> {
        queries::threads::list_threads(self.db()?).await
    }

    async fn delete(&self, id: &ThreadId) -> Result<bool, ThothError> {
        queries::threads::delete_thread(self.db()?, id).await
    }
}

#[async_trait]
impl CheckpointStore for SqliteStorage {
    async fn get(&self, thread_id: &ThreadId) -> Option<ConversationState> {
        let db = match self.db() {
            Ok(db) => db,
            Err(e) => {
                warn!(thread_id = %thread_id, error = %e, "checkpoint read skipped");
                return None;
            }
        };
        let (version, json) = match queries::checkpoints::latest_checkpoint(db, thread_id).await {
            Ok(Some(row)) => row,
            Ok(None) => return None,
            Err(e) => {
                warn!(thread_id = %thread_id, error = %e, "checkpoint read failed");
                return None;
            }
        };
        match serde_json::from_str(&json) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(thread_id = %thread_id, version, error = %e, "checkpoint is unreadable");
                None
            }
        }
    }

    async fn put(
        &self,
        thread_id: &ThreadId,
        state: &ConversationState,
    ) -> Result<u64, ThothError> {
        let version = queries::checkpoints::put_checkpoint(self.db()?, thread_id, state).await?;
        debug!(thread_id = %thread_id, version, "checkpoint written");
        Ok(version)
    }

    async fn get_version(
        &self,
        thread_id: &ThreadId,
        version: u64,
    ) -> Result<Option<ConversationState>, ThothError> {
        match queries::checkpoints::checkpoint_at(self.db()?, thread_id, version).await? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(ThothError::storage),
            None => Ok(None),
        }
    }

    async fn versions(&self, thread_id: &ThreadId) -> Result<Vec<u64>, ThothError> {
        queries::checkpoints::list_versions(self.db()?, thread_id).await
    }

    async fn purge(&self, thread_id: &ThreadId) -> Result<u64, ThothError> {
        queries::checkpoints::purge_checkpoints(self.db()?, thread_id).await
    }
}

#[async_trait]
impl ContextStore for SqliteStorage {
    async fn query(&self, text: &str, k: usize) -> Result<Vec<ContextFragment>, ThothError> {
        queries::documents::search_chunks(self.db()?, text, k).await
    }

    async fn add(&self, chunks: Vec<DocumentChunk>) -> Result<(), ThothError> {
        queries::documents::insert_chunks(self.db()?, chunks).await
    }
}

#[async_trait]
impl DocumentRegistry for SqliteStorage {
    async fn is_indexed(&self, name: &str) -> Result<bool, ThothError> {
        queries::documents::is_document_indexed(self.db()?, name).await
    }

    async fn replace_document(
        &self,
        name: &str,
        chunks: Vec<DocumentChunk>,
    ) -> Result<bool, ThothError> {
        queries::documents::replace_document(self.db()?, name, chunks).await
    }

    async fn list_documents(&self) -> Result<Vec<IndexedDocument>, ThothError> {
        queries::documents::list_documents(self.db()?).await
    }

    async fn reset_documents(&self) -> Result<(), ThothError> {
        queries::documents::reset_documents(self.db()?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use thoth_core::Message;

    fn make_config(path: &std::path::Path) -> StorageConfig {
        StorageConfig {
            database_path: path.to_str().unwrap().to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn sqlite_storage_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(&dir.path().join("test.db")));
        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
        assert!(matches!(
            storage.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }

    #[tokio::test]
    async fn operations_before_initialize_fail() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(&dir.path().join("test.db")));
        assert!(ThreadLedger::list(&storage).await.is_err());
        assert!(CheckpointStore::get(&storage, &ThreadId::new("x")).await.is_none());
    }

    #[tokio::test]
    async fn double_initialize_is_rejected() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::open(make_config(&dir.path().join("test.db")))
            .await
            .unwrap();
        assert!(storage.initialize().await.is_err());
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn unknown_thread_has_no_state() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::open(make_config(&dir.path().join("test.db")))
            .await
            .unwrap();
        assert!(
            CheckpointStore::get(&storage, &ThreadId::new("never-seen"))
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn corrupt_snapshot_degrades_to_none() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::open(make_config(&dir.path().join("test.db")))
            .await
            .unwrap();
        let id = ThreadId::new("corrupt");
        let raw = id.to_string();
        storage
            .db()
            .unwrap()
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO checkpoints (thread_id, version, state) VALUES (?1, 1, '{not json')",
                    rusqlite::params![raw],
                )?;
                Ok(())
            })
            .await
            .unwrap();
        assert!(CheckpointStore::get(&storage, &id).await.is_none());
        assert!(storage.get_version(&id, 1).await.is_err());
    }

    #[tokio::test]
    async fn state_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("persist.db");
        let id = ThreadId::new("persist");
        {
            let storage = SqliteStorage::open(make_config(&path)).await.unwrap();
            let state = ConversationState {
                messages: vec![Message::user("hi"), Message::assistant("hello")],
                context: vec!["fact (Source: a.txt)".to_string()],
                answer: Some("hello".to_string()),
                ..ConversationState::default()
            };
            storage.put(&id, &state).await.unwrap();
            storage.upsert(&id, "Greeting").await.unwrap();
            storage.close().await.unwrap();
        }
        let storage = SqliteStorage::open(make_config(&path)).await.unwrap();
        let state = CheckpointStore::get(&storage, &id).await.unwrap();
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.context, vec!["fact (Source: a.txt)"]);
        let thread = ThreadLedger::get(&storage, &id).await.unwrap().unwrap();
        assert_eq!(thread.name, "Greeting");
    }
}
