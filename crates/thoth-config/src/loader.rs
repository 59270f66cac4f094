// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./thoth.toml` > `~/.config/thoth/thoth.toml` > `/etc/thoth/thoth.toml`
//! with environment variable overrides via `THOTH_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ThothConfig;

/// Top-level sections that accept `THOTH_<SECTION>_<KEY>` overrides.
const SECTIONS: &[&str] = &[
    "agent",
    "ollama",
    "storage",
    "retrieval",
    "wikipedia",
    "arxiv",
    "web",
    "context",
    "documents",
];

/// Candidate config files, lowest precedence first.
pub fn config_file_candidates() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/etc/thoth/thoth.toml"),
        dirs::config_dir()
            .map(|d| d.join("thoth/thoth.toml"))
            .unwrap_or_default(),
        PathBuf::from("thoth.toml"),
    ]
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/thoth/thoth.toml`
/// 3. `~/.config/thoth/thoth.toml`
/// 4. `./thoth.toml`
/// 5. `THOTH_*` environment variables
pub fn load_config() -> Result<ThothConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<ThothConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ThothConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ThothConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ThothConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    config_file_candidates().into_iter().fold(
        Figment::new().merge(Serialized::defaults(ThothConfig::default())),
        |figment, path| figment.merge(Toml::file(path)),
    )
    .merge(env_provider())
}

/// Maps `THOTH_OLLAMA_DEFAULT_MODEL` to `ollama.default_model`.
///
/// Only the leading section is split off, so key names may contain
/// underscores (and even other section names, as in `retrieval.documents_k`).
fn env_provider() -> Env {
    Env::prefixed("THOTH_").map(|key| {
        let key_str = key.as_str();
        SECTIONS
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|field| format!("{section}.{field}"))
            })
            .unwrap_or_else(|| key_str.to_string())
            .into()
    })
}
