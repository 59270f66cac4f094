// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wires configuration into storage, the answer engine, retrieval sources,
//! the document library, and the conversation engine.

use std::sync::Arc;

use thoth_agent::ConversationEngine;
use thoth_config::ThothConfig;
use thoth_core::traits::{
    CheckpointStore, ContextStore, DocumentRegistry, PluginAdapter, StorageAdapter, ThreadLedger,
};
use thoth_core::{HealthStatus, ThothError};
use thoth_documents::{DocumentLibrary, RecursiveSplitter};
use thoth_ollama::OllamaProvider;
use thoth_storage::SqliteStorage;
use tracing::{info, warn};

/// Everything a command needs, opened once per process.
pub struct App {
    pub config: ThothConfig,
    pub storage: Arc<SqliteStorage>,
    pub provider: Arc<OllamaProvider>,
    pub engine: Arc<ConversationEngine>,
    pub library: DocumentLibrary,
}

impl App {
    pub async fn open(config: ThothConfig) -> Result<Self, ThothError> {
        let storage = Arc::new(SqliteStorage::open(config.storage.clone()).await?);
        let provider = Arc::new(OllamaProvider::new(&config.ollama)?);

        let store: Arc<dyn ContextStore> = storage.clone();
        let registry: Arc<dyn DocumentRegistry> = storage.clone();
        let splitter = RecursiveSplitter::from_config(&config.documents)?;
        let library = DocumentLibrary::new(registry, splitter);

        let fanout = Arc::new(thoth_retrieval::standard_fanout(&config, store)?);
        let ledger: Arc<dyn ThreadLedger> = storage.clone();
        let checkpoints: Arc<dyn CheckpointStore> = storage.clone();
        let engine = ConversationEngine::new(provider.clone(), ledger, checkpoints, fanout, &config);

        info!(database = %config.storage.database_path, "thoth ready");
        Ok(Self {
            config,
            storage,
            provider,
            engine: Arc::new(engine),
            library,
        })
    }

    /// Warns once when the answer engine is unreachable or missing its model.
    pub async fn check_provider(&self) {
        match self.provider.health_check().await {
            Ok(HealthStatus::Healthy) => {}
            Ok(HealthStatus::Degraded(reason)) | Ok(HealthStatus::Unhealthy(reason)) => {
                warn!(provider = self.provider.name(), %reason, "answer engine not ready");
            }
            Err(e) => warn!(provider = self.provider.name(), error = %e, "health check failed"),
        }
    }

    pub async fn close(self) -> Result<(), ThothError> {
        self.storage.close().await
    }
}
