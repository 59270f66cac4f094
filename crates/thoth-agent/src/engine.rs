// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation engine: runs turns against checkpointed thread state.
//!
//! A turn loads the latest snapshot for its thread, walks the
//! [`TurnState`] machine, and writes one new snapshot only when the answer
//! was produced. Turns on the same thread are serialized; turns on
//! different threads run independently.

use std::sync::Arc;

use dashmap::DashMap;
use thoth_config::ThothConfig;
use thoth_core::traits::{CheckpointStore, ProviderAdapter, ThreadLedger};
use thoth_core::types::{
    ConversationState, Message, ProviderRequest, RetrievalFlags, Thread, ThreadId,
};
use thoth_core::ThothError;
use thoth_retrieval::RetrievalFanout;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::compression::compress_context;
use crate::machine::TurnState;
use crate::prompts::{answer_prompt, classify_prompt, parse_affirmative};
use crate::retention::RetentionPolicy;

/// Longest automatic thread name, in characters, before the ellipsis.
const AUTO_NAME_CHARS: usize = 50;

/// Per-turn options supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnOptions {
    pub flags: RetrievalFlags,
    /// Model serving every call of this turn. `None` uses the configured default.
    pub model: Option<String>,
}

impl TurnOptions {
    pub fn with_flags(flags: RetrievalFlags) -> Self {
        Self { flags, model: None }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Result of a completed turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub thread_id: ThreadId,
    pub answer: String,
    /// Model that served the turn.
    pub model: String,
    /// Whether classification asked for new context.
    pub retrieved: bool,
    /// Fragments returned by the fan-out before compression.
    pub fragments: usize,
    /// Checkpoint version written for this turn.
    pub version: u64,
}

/// Placeholder name for a thread created without one.
pub fn placeholder_thread_name() -> String {
    chrono::Local::now().format("Thread %b %d, %H:%M").to_string()
}

/// Name derived from a thread's first question.
pub fn auto_thread_name(question: &str) -> String {
    let question = question.trim();
    let mut name: String = question.chars().take(AUTO_NAME_CHARS).collect();
    name.truncate(name.trim_end().len());
    if question.chars().count() > AUTO_NAME_CHARS {
        name.push('…');
    }
    name
}

/// Runs turns and manages threads.
pub struct ConversationEngine {
    provider: Arc<dyn ProviderAdapter>,
    ledger: Arc<dyn ThreadLedger>,
    checkpoints: Arc<dyn CheckpointStore>,
    fanout: Arc<RetrievalFanout>,
    default_model: String,
    retention: RetentionPolicy,
    locks: DashMap<ThreadId, Arc<Mutex<()>>>,
}

impl ConversationEngine {
    pub fn new(
        provider: Arc<dyn ProviderAdapter>,
        ledger: Arc<dyn ThreadLedger>,
        checkpoints: Arc<dyn CheckpointStore>,
        fanout: Arc<RetrievalFanout>,
        config: &ThothConfig,
    ) -> Self {
        info!(
            provider = provider.name(),
            default_model = %config.ollama.default_model,
            sources = ?fanout.kinds(),
            max_context_chars = config.context.max_context_chars,
            "conversation engine initialized"
        );
        Self {
            provider,
            ledger,
            checkpoints,
            fanout,
            default_model: config.ollama.default_model.clone(),
            retention: RetentionPolicy::from_config(&config.context),
            locks: DashMap::new(),
        }
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn fanout(&self) -> &RetrievalFanout {
        &self.fanout
    }

    fn thread_lock(&self, thread_id: &ThreadId) -> Arc<Mutex<()>> {
        self.locks
            .entry(thread_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drops the map entry once no other task holds or waits on the lock.
    ///
    /// `remove_if` holds the same shard lock as `thread_lock`, so no clone is
    /// handed out between the count check and the removal.
    fn release_lock(&self, thread_id: &ThreadId, lock: Arc<Mutex<()>>) {
        drop(lock);
        self.locks.remove_if(thread_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Threads with a turn or deletion in flight or waiting.
    pub fn active_threads(&self) -> usize {
        self.locks.len()
    }

    fn resolve_model(&self, options: &TurnOptions) -> String {
        options
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.default_model)
            .to_string()
    }

    /// Runs one turn: question in, answer out.
    ///
    /// On success the user message and the answer are checkpointed together
    /// and the ledger is bumped, creating the thread row if needed. On
    /// failure nothing is persisted and the thread's prior state is
    /// untouched.
    pub async fn run_turn(
        &self,
        thread_id: &ThreadId,
        question: &str,
        options: TurnOptions,
    ) -> Result<TurnOutcome, ThothError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ThothError::InvalidInput("question is empty".into()));
        }

        let lock = self.thread_lock(thread_id);
        let outcome = {
            let _guard = lock.lock().await;
            self.locked_turn(thread_id, question, options).await
        };
        self.release_lock(thread_id, lock);
        outcome
    }

    /// Body of [`run_turn`](Self::run_turn). The caller holds the thread lock.
    async fn locked_turn(
        &self,
        thread_id: &ThreadId,
        question: &str,
        options: TurnOptions,
    ) -> Result<TurnOutcome, ThothError> {
        let model = self.resolve_model(&options);
        let thread = self.ledger.get(thread_id).await?;
        let mut state = self.checkpoints.get(thread_id).await.unwrap_or_default();
        debug!(
            thread_id = %thread_id,
            messages = state.messages.len(),
            context_blocks = state.context.len(),
            "thread state loaded"
        );

        state.messages.push(Message::user(question));
        state.flags = options.flags;

        let mut retrieved = false;
        let mut fragments = 0;
        let mut answer = String::new();
        let mut turn = TurnState::initial();
        while !turn.is_terminal() {
            debug!(thread_id = %thread_id, state = %turn, "turn step");
            turn = match turn {
                TurnState::Classify => {
                    retrieved = self.classify(&state, question, &model).await;
                    turn.next(retrieved)
                }
                TurnState::Retrieve => {
                    fragments = self
                        .retrieve(&mut state, question, &options.flags, &model)
                        .await?;
                    turn.next(retrieved)
                }
                TurnState::Generate => {
                    answer = self.generate(&state, question, &model).await?;
                    state.answer = Some(answer.clone());
                    state.messages.push(Message::assistant(answer.clone()));
                    turn.next(retrieved)
                }
                TurnState::Done => TurnState::Done,
            };
        }

        let version = self.checkpoints.put(thread_id, &state).await?;

        // Threads first seen here, or still carrying a placeholder, take
        // their name from this question.
        let bumped = match thread {
            Some(thread) if !thread.auto_named => self.ledger.touch(thread_id).await,
            _ => {
                self.ledger
                    .upsert(thread_id, &auto_thread_name(question))
                    .await
            }
        };
        if let Err(e) = bumped {
            warn!(thread_id = %thread_id, error = %e, "turn saved but ledger update failed");
        }

        info!(
            thread_id = %thread_id,
            model = %model,
            retrieved,
            fragments,
            version,
            answer_chars = answer.chars().count(),
            "turn complete"
        );

        Ok(TurnOutcome {
            thread_id: thread_id.clone(),
            answer,
            model,
            retrieved,
            fragments,
            version,
        })
    }

    /// Asks the model whether new context is needed. Errors count as "no".
    async fn classify(&self, state: &ConversationState, question: &str, model: &str) -> bool {
        let context = state.context_text();
        let request = ProviderRequest {
            model: model.to_string(),
            prompt: classify_prompt(context.as_deref(), question),
        };
        match self.provider.complete(request).await {
            Ok(response) => {
                let needs_context = parse_affirmative(&response.content);
                info!(
                    needs_context,
                    reply = %response.content.trim(),
                    "classification"
                );
                needs_context
            }
            Err(e) => {
                warn!(error = %e, "classification failed, answering without new context");
                false
            }
        }
    }

    /// Fan-out, compression, append, retention. Returns the fragment count.
    async fn retrieve(
        &self,
        state: &mut ConversationState,
        question: &str,
        flags: &RetrievalFlags,
        model: &str,
    ) -> Result<usize, ThothError> {
        let fragments = self.fanout.retrieve(question, flags).await;
        if let Some(compressed) =
            compress_context(self.provider.as_ref(), model, &fragments, question).await?
        {
            state.context.push(compressed);
            self.retention
                .enforce(self.provider.as_ref(), model, &mut state.context)
                .await;
        }
        Ok(fragments.len())
    }

    async fn generate(
        &self,
        state: &ConversationState,
        question: &str,
        model: &str,
    ) -> Result<String, ThothError> {
        let context = state.context_text();
        let request = ProviderRequest {
            model: model.to_string(),
            prompt: answer_prompt(context.as_deref(), question),
        };
        let response = self.provider.complete(request).await?;
        Ok(response.content.trim().to_string())
    }

    /// Creates a thread. Without a name it gets a timestamped placeholder and
    /// is renamed from its first question.
    pub async fn new_thread(&self, name: Option<&str>) -> Result<Thread, ThothError> {
        let id = ThreadId::generate();
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => {
                self.ledger.upsert(&id, name).await?;
                self.ledger
                    .get(&id)
                    .await?
                    .ok_or_else(|| ThothError::Internal(format!("thread {id} vanished after creation")))
            }
            None => self.ledger.ensure(&id, &placeholder_thread_name()).await,
        }
    }

    /// Sets an explicit name. Creates the thread if it does not exist.
    pub async fn rename_thread(&self, thread_id: &ThreadId, name: &str) -> Result<(), ThothError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ThothError::InvalidInput("thread name is empty".into()));
        }
        self.ledger.upsert(thread_id, name).await
    }

    /// Deletes a thread and every checkpoint it owns.
    ///
    /// Returns whether anything was removed.
    pub async fn delete_thread(&self, thread_id: &ThreadId) -> Result<bool, ThothError> {
        let lock = self.thread_lock(thread_id);
        let removed = async {
            let _guard = lock.lock().await;
            let purged = self.checkpoints.purge(thread_id).await?;
            let existed = self.ledger.delete(thread_id).await?;
            info!(thread_id = %thread_id, purged, existed, "thread deleted");
            Ok::<_, ThothError>(existed || purged > 0)
        }
        .await;
        self.release_lock(thread_id, lock);
        removed
    }

    /// All threads, most recently updated first.
    pub async fn list_threads(&self) -> Result<Vec<Thread>, ThothError> {
        self.ledger.list().await
    }

    pub async fn thread(&self, thread_id: &ThreadId) -> Result<Option<Thread>, ThothError> {
        self.ledger.get(thread_id).await
    }

    /// Latest checkpointed state, or `None` for a thread with no turns.
    pub async fn state(&self, thread_id: &ThreadId) -> Option<ConversationState> {
        self.checkpoints.get(thread_id).await
    }

    /// Message history of a thread. Empty when the thread has no turns.
    pub async fn history(&self, thread_id: &ThreadId) -> Vec<Message> {
        self.state(thread_id)
            .await
            .map(|s| s.messages)
            .unwrap_or_default()
    }
}
