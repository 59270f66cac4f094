// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end turn testing.
//!
//! `TestHarness` assembles a complete engine with a mock provider, the
//! given mock retrievers, and a temp SQLite database serving as ledger and
//! checkpoint store.

use std::sync::Arc;

use thoth_agent::{ConversationEngine, TurnOptions, TurnOutcome};
use thoth_config::ThothConfig;
use thoth_config::model::StorageConfig;
use thoth_core::traits::{CheckpointStore, Retriever, ThreadLedger};
use thoth_core::types::{RetrievalFlags, ThreadId};
use thoth_core::ThothError;
use thoth_retrieval::RetrievalFanout;
use thoth_storage::SqliteStorage;

use crate::mock_provider::MockProvider;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: Vec<String>,
    retrievers: Vec<Arc<dyn Retriever>>,
    config: ThothConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            retrievers: Vec::new(),
            config: ThothConfig::default(),
        }
    }

    /// Set mock provider replies, consumed in call order.
    pub fn with_mock_responses(mut self, responses: Vec<&str>) -> Self {
        self.responses = responses.into_iter().map(String::from).collect();
        self
    }

    /// Register a retrieval source with the fan-out.
    pub fn with_retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retrievers.push(retriever);
        self
    }

    /// Replace the configuration (storage path is always overridden).
    pub fn with_config(mut self, config: ThothConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, ThothError> {
        let temp_dir = tempfile::TempDir::new().map_err(ThothError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = self.config;
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };

        let storage = Arc::new(SqliteStorage::open(config.storage.clone()).await?);
        let provider = Arc::new(MockProvider::with_responses(self.responses));
        let fanout = Arc::new(RetrievalFanout::new(self.retrievers, None));

        let engine = ConversationEngine::new(
            provider.clone(),
            storage.clone() as Arc<dyn ThreadLedger>,
            storage.clone() as Arc<dyn CheckpointStore>,
            fanout,
            &config,
        );

        Ok(TestHarness {
            engine: Arc::new(engine),
            provider,
            storage,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete engine over a throwaway database.
pub struct TestHarness {
    pub engine: Arc<ConversationEngine>,
    pub provider: Arc<MockProvider>,
    pub storage: Arc<SqliteStorage>,
    pub config: ThothConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Run a turn with every source enabled and the default model.
    pub async fn ask(&self, thread_id: &ThreadId, question: &str) -> Result<TurnOutcome, ThothError> {
        self.engine
            .run_turn(thread_id, question, TurnOptions::default())
            .await
    }

    /// Run a turn with explicit retrieval flags.
    pub async fn ask_with_flags(
        &self,
        thread_id: &ThreadId,
        question: &str,
        flags: RetrievalFlags,
    ) -> Result<TurnOutcome, ThothError> {
        self.engine
            .run_turn(thread_id, question, TurnOptions::with_flags(flags))
            .await
    }
}
