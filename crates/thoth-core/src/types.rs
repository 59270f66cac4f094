// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across adapter traits, storage, and the turn engine.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Source label used when a fragment arrives without one.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// Sentinel rendered in prompts when a thread has no accumulated context.
pub const NO_CONTEXT: &str = "No context available";

/// Opaque, immutable identifier of a conversation thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    /// Wraps an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh 12-character hex identifier.
    pub fn generate() -> Self {
        let simple = uuid::Uuid::new_v4().simple().to_string();
        Self(simple[..12].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ThreadId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A row in the thread ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: ThreadId,
    /// User-facing display name.
    pub name: String,
    /// True while the name is a placeholder that the first question may replace.
    pub auto_named: bool,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
    /// ISO 8601 last-update timestamp.
    pub updated_at: String,
}

/// Author of a conversation message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message in a thread's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The retrieval sources a turn can consult.
///
/// Declaration order is the merge order of the fan-out layer.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SourceKind {
    /// The private document index.
    Documents,
    /// Encyclopedic lookup (Wikipedia).
    Encyclopedia,
    /// Academic papers (arXiv).
    Academic,
    /// Web search (Tavily).
    Web,
}

/// Per-turn enablement of each retrieval source. All sources default to on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalFlags {
    pub documents: bool,
    pub encyclopedia: bool,
    pub academic: bool,
    pub web: bool,
}

impl RetrievalFlags {
    /// Every source enabled.
    pub fn all() -> Self {
        Self {
            documents: true,
            encyclopedia: true,
            academic: true,
            web: true,
        }
    }

    /// Every source disabled.
    pub fn none() -> Self {
        Self {
            documents: false,
            encyclopedia: false,
            academic: false,
            web: false,
        }
    }

    pub fn is_enabled(&self, kind: SourceKind) -> bool {
        match kind {
            SourceKind::Documents => self.documents,
            SourceKind::Encyclopedia => self.encyclopedia,
            SourceKind::Academic => self.academic,
            SourceKind::Web => self.web,
        }
    }

    /// Returns a copy with one source switched.
    pub fn with(mut self, kind: SourceKind, enabled: bool) -> Self {
        match kind {
            SourceKind::Documents => self.documents = enabled,
            SourceKind::Encyclopedia => self.encyclopedia = enabled,
            SourceKind::Academic => self.academic = enabled,
            SourceKind::Web => self.web = enabled,
        }
        self
    }

    pub fn any(&self) -> bool {
        self.documents || self.encyclopedia || self.academic || self.web
    }
}

impl Default for RetrievalFlags {
    fn default() -> Self {
        Self::all()
    }
}

/// A unit of retrieved text with the label used to cite it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextFragment {
    pub text: String,
    /// Filename, article URL, paper identifier, or web URL.
    pub source: String,
}

impl ContextFragment {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
        }
    }

    /// The citation label, falling back to [`UNKNOWN_SOURCE`].
    pub fn label(&self) -> &str {
        let trimmed = self.source.trim();
        if trimmed.is_empty() {
            UNKNOWN_SOURCE
        } else {
            trimmed
        }
    }

    /// Renders the fragment in the inline citation convention.
    pub fn render(&self) -> String {
        format!("{} (Source: {})", self.text.trim(), self.label())
    }
}

/// The checkpointed state of one thread.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationState {
    /// Append-only history in conversation order.
    pub messages: Vec<Message>,
    /// Compressed context blocks, oldest first.
    pub context: Vec<String>,
    /// The most recent answer.
    pub answer: Option<String>,
    /// Retrieval flags of the most recent turn.
    pub flags: RetrievalFlags,
}

impl ConversationState {
    /// Accumulated context joined for prompting, or `None` when empty.
    pub fn context_text(&self) -> Option<String> {
        let blocks: Vec<&str> = self
            .context
            .iter()
            .map(|c| c.as_str())
            .filter(|c| !c.trim().is_empty())
            .collect();
        if blocks.is_empty() {
            None
        } else {
            Some(blocks.join("\n\n"))
        }
    }

    /// Total characters held in the context log.
    pub fn context_chars(&self) -> usize {
        self.context.iter().map(|c| c.chars().count()).sum()
    }

    /// Number of user questions answered so far.
    pub fn user_turns(&self) -> usize {
        self.messages.iter().filter(|m| m.role == Role::User).count()
    }
}

/// A request to the answer engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRequest {
    /// Model that serves this call.
    pub model: String,
    pub prompt: String,
}

/// Text produced by the answer engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    pub content: String,
    pub model: String,
}

/// A chunk of an ingested document, ready for the context store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Display name of the source document.
    pub source: String,
    /// Position of the chunk within the document.
    pub ordinal: usize,
    pub text: String,
}

/// A document recorded in the processed-files registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub name: String,
    pub chunk_count: usize,
    pub indexed_at: String,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Retriever,
    Storage,
}
