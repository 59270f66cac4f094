// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the pluggable collaborators of the turn engine.
//!
//! All adapters are `Send + Sync` and use `#[async_trait]` for dynamic
//! dispatch compatibility.

pub mod adapter;
pub mod context_store;
pub mod provider;
pub mod retriever;
pub mod storage;

pub use adapter::PluginAdapter;
pub use context_store::{ContextStore, DocumentRegistry};
pub use provider::ProviderAdapter;
pub use retriever::Retriever;
pub use storage::{CheckpointStore, StorageAdapter, ThreadLedger};
