// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Thoth configuration.
///
/// Every section is optional and defaults to working local values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ThothConfig {
    #[serde(default)]
    pub agent: AgentConfig,

    /// Answer engine (Ollama) settings.
    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// Fan-out settings shared by all sources.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub wikipedia: WikipediaConfig,

    #[serde(default)]
    pub arxiv: ArxivConfig,

    /// Web search (Tavily) settings.
    #[serde(default)]
    pub web: WebSearchConfig,

    /// Accumulated-context retention policy.
    #[serde(default)]
    pub context: ContextConfig,

    /// Document chunking settings.
    #[serde(default)]
    pub documents: DocumentsConfig,
}

/// Assistant identity and logging.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "thoth".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Ollama answer engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server.
    #[serde(default = "default_ollama_url")]
    pub base_url: String,

    /// Model used when a turn does not name one.
    #[serde(default = "default_ollama_model")]
    pub default_model: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_ollama_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            default_model: default_ollama_model(),
            timeout_secs: default_ollama_timeout_secs(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_ollama_model() -> String {
    "qwen3:8b".to_string()
}

fn default_ollama_timeout_secs() -> u64 {
    300
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file holding threads, checkpoints and documents.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("thoth").join("thoth.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("thoth.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Retrieval fan-out configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Number of document chunks fetched from the local index.
    #[serde(default = "default_documents_k")]
    pub documents_k: usize,

    /// Upper bound on a single source lookup. `0` disables the timeout.
    #[serde(default = "default_source_timeout_secs")]
    pub source_timeout_secs: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            documents_k: default_documents_k(),
            source_timeout_secs: default_source_timeout_secs(),
        }
    }
}

fn default_documents_k() -> usize {
    5
}

fn default_source_timeout_secs() -> u64 {
    30
}

/// Wikipedia lookup configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WikipediaConfig {
    /// MediaWiki action API endpoint.
    #[serde(default = "default_wikipedia_url")]
    pub base_url: String,

    /// Number of articles loaded per query.
    #[serde(default = "default_wikipedia_top_k")]
    pub top_k: usize,

    /// Maximum characters kept from each article extract.
    #[serde(default = "default_wikipedia_max_chars")]
    pub max_chars: usize,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            base_url: default_wikipedia_url(),
            top_k: default_wikipedia_top_k(),
            max_chars: default_wikipedia_max_chars(),
        }
    }
}

fn default_wikipedia_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_wikipedia_top_k() -> usize {
    3
}

fn default_wikipedia_max_chars() -> usize {
    4000
}

/// arXiv lookup configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ArxivConfig {
    /// arXiv Atom query endpoint.
    #[serde(default = "default_arxiv_url")]
    pub base_url: String,

    #[serde(default = "default_arxiv_max_results")]
    pub max_results: usize,
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            base_url: default_arxiv_url(),
            max_results: default_arxiv_max_results(),
        }
    }
}

fn default_arxiv_url() -> String {
    "https://export.arxiv.org/api/query".to_string()
}

fn default_arxiv_max_results() -> usize {
    3
}

/// Tavily web search configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebSearchConfig {
    #[serde(default = "default_web_url")]
    pub base_url: String,

    /// Tavily API key. `None` falls back to the `TAVILY_API_KEY` env var.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_web_max_results")]
    pub max_results: usize,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_web_url(),
            api_key: None,
            max_results: default_web_max_results(),
        }
    }
}

impl WebSearchConfig {
    /// The configured key, or the `TAVILY_API_KEY` environment variable.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("TAVILY_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }
}

fn default_web_url() -> String {
    "https://api.tavily.com/search".to_string()
}

fn default_web_max_results() -> usize {
    5
}

/// What happens when the accumulated context exceeds its budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Summarize older fragments into one cited block.
    Summarize,
    /// Drop the oldest fragments.
    Truncate,
}

/// Accumulated-context retention configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    /// Character budget for a thread's context log. `0` means unbounded.
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,

    #[serde(default = "default_overflow")]
    pub overflow: OverflowPolicy,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_context_chars: default_max_context_chars(),
            overflow: default_overflow(),
        }
    }
}

fn default_max_context_chars() -> usize {
    24_000
}

fn default_overflow() -> OverflowPolicy {
    OverflowPolicy::Summarize
}

/// Document chunking configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentsConfig {
    /// Target chunk length in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_chunk_size() -> usize {
    4000
}

fn default_chunk_overlap() -> usize {
    200
}
