// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage traits: backend lifecycle, the thread ledger, and the checkpoint store.

use async_trait::async_trait;

use crate::error::ThothError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ConversationState, Thread, ThreadId};

/// Adapter for storage and persistence backends.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), ThothError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), ThothError>;
}

/// Durable thread identity -> display name -> timestamps.
///
/// The ledger never touches conversation state.
#[async_trait]
pub trait ThreadLedger: Send + Sync {
    /// Creates or renames a thread and bumps `updated_at`. Idempotent.
    ///
    /// An explicit name clears the `auto_named` marker.
    async fn upsert(&self, id: &ThreadId, name: &str) -> Result<(), ThothError>;

    /// Creates the thread with a placeholder name if it does not exist yet.
    /// An existing row is left untouched.
    async fn ensure(&self, id: &ThreadId, placeholder: &str) -> Result<Thread, ThothError>;

    /// Bumps `updated_at` without renaming.
    async fn touch(&self, id: &ThreadId) -> Result<(), ThothError>;

    async fn get(&self, id: &ThreadId) -> Result<Option<Thread>, ThothError>;

    /// All threads, most recently updated first.
    async fn list(&self) -> Result<Vec<Thread>, ThothError>;

    /// Removes the ledger row. Returns whether a row existed.
    async fn delete(&self, id: &ThreadId) -> Result<bool, ThothError>;
}

/// Durable, append-only snapshots of per-thread conversation state.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Latest snapshot for a thread.
    ///
    /// Missing or unreadable snapshots yield `None`; this never fails the caller.
    async fn get(&self, thread_id: &ThreadId) -> Option<ConversationState>;

    /// Appends a snapshot and returns its version (1-based, per thread).
    async fn put(&self, thread_id: &ThreadId, state: &ConversationState)
        -> Result<u64, ThothError>;

    /// Point-in-time read of a specific snapshot version.
    async fn get_version(
        &self,
        thread_id: &ThreadId,
        version: u64,
    ) -> Result<Option<ConversationState>, ThothError>;

    /// Stored versions for a thread, ascending.
    async fn versions(&self, thread_id: &ThreadId) -> Result<Vec<u64>, ThothError>;

    /// Deletes every snapshot for a thread. Returns the number removed.
    async fn purge(&self, thread_id: &ThreadId) -> Result<u64, ThothError>;
}
