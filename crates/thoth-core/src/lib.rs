// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Thoth retrieval-augmented assistant.
//!
//! This crate provides the trait definitions, error type, and conversation
//! types shared by storage, retrieval, the answer engine, and the turn engine.

pub mod error;
pub mod traits;
pub mod types;

pub use error::ThothError;
pub use types::{
    AdapterType, ContextFragment, ConversationState, HealthStatus, Message, RetrievalFlags, Role,
    SourceKind, Thread, ThreadId,
};

pub use traits::{
    CheckpointStore, ContextStore, DocumentRegistry, PluginAdapter, ProviderAdapter, Retriever,
    StorageAdapter, ThreadLedger,
};
