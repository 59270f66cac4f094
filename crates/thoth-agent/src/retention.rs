// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounds the growth of a thread's accumulated context.
//!
//! Every retrieving turn appends one compressed block. Once the blocks
//! exceed `context.max_context_chars`, the older ones are either summarized
//! into a single cited block or dropped, oldest first. The newest block
//! always survives.

use thoth_config::OverflowPolicy;
use thoth_config::model::ContextConfig;
use thoth_core::traits::ProviderAdapter;
use thoth_core::types::ProviderRequest;

use crate::prompts::summary_prompt;

fn char_len(blocks: &[String]) -> usize {
    blocks.iter().map(|b| b.chars().count()).sum()
}

/// Retention settings for one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// `0` disables the budget.
    pub max_chars: usize,
    pub overflow: OverflowPolicy,
}

impl RetentionPolicy {
    pub fn from_config(config: &ContextConfig) -> Self {
        Self {
            max_chars: config.max_context_chars,
            overflow: config.overflow,
        }
    }

    pub fn unbounded() -> Self {
        Self {
            max_chars: 0,
            overflow: OverflowPolicy::Truncate,
        }
    }

    pub fn is_over_budget(&self, context: &[String]) -> bool {
        self.max_chars > 0 && char_len(context) > self.max_chars
    }

    /// Drops the oldest blocks until the log fits, keeping at least the
    /// newest one. Returns how many blocks were dropped.
    pub fn truncate(&self, context: &mut Vec<String>) -> usize {
        let mut dropped = 0;
        while context.len() > 1 && self.is_over_budget(context) {
            context.remove(0);
            dropped += 1;
        }
        dropped
    }

    /// Brings `context` back under budget according to the overflow policy.
    ///
    /// Summarization failures fall back to truncation; this never fails the
    /// turn.
    pub async fn enforce(
        &self,
        provider: &dyn ProviderAdapter,
        model: &str,
        context: &mut Vec<String>,
    ) {
        if !self.is_over_budget(context) || context.len() < 2 {
            return;
        }

        if self.overflow == OverflowPolicy::Summarize {
            let split = context.len() - 1;
            let older = context[..split].join("\n\n");
            let request = ProviderRequest {
                model: model.to_string(),
                prompt: summary_prompt(&older),
            };
            match provider.complete(request).await {
                Ok(response) if !response.content.trim().is_empty() => {
                    let summary = response.content.trim().to_string();
                    tracing::info!(
                        summarized_blocks = split,
                        before_chars = older.chars().count(),
                        after_chars = summary.chars().count(),
                        "older context summarized"
                    );
                    context.splice(..split, [summary]);
                }
                Ok(_) => {
                    tracing::warn!("context summary was empty, truncating instead");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "context summary failed, truncating instead");
                }
            }
        }

        let dropped = self.truncate(context);
        if dropped > 0 {
            tracing::info!(
                dropped,
                remaining = context.len(),
                "oldest context blocks dropped"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;

    fn blocks(sizes: &[usize]) -> Vec<String> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, n)| {
                let c = char::from(b'a' + i as u8);
                std::iter::repeat_n(c, *n).collect()
            })
            .collect()
    }

    fn policy(max_chars: usize, overflow: OverflowPolicy) -> RetentionPolicy {
        RetentionPolicy {
            max_chars,
            overflow,
        }
    }

    #[test]
    fn zero_budget_is_unbounded() {
        let p = RetentionPolicy::unbounded();
        assert!(!p.is_over_budget(&blocks(&[1_000_000])));
    }

    #[test]
    fn truncate_drops_oldest_first() {
        let p = policy(25, OverflowPolicy::Truncate);
        let mut ctx = blocks(&[10, 10, 10]);
        assert_eq!(p.truncate(&mut ctx), 1);
        assert_eq!(ctx.len(), 2);
        assert!(ctx[0].starts_with('b'));
        assert!(ctx[1].starts_with('c'));
    }

    #[test]
    fn truncate_keeps_newest_even_when_oversized() {
        let p = policy(5, OverflowPolicy::Truncate);
        let mut ctx = blocks(&[3, 50]);
        p.truncate(&mut ctx);
        assert_eq!(ctx.len(), 1);
        assert!(ctx[0].starts_with('b'));
    }

    #[test]
    fn default_config_summarizes() {
        let p = RetentionPolicy::from_config(&ContextConfig::default());
        assert_eq!(p.overflow, OverflowPolicy::Summarize);
        assert!(p.max_chars > 0);
    }

    #[tokio::test]
    async fn summarize_replaces_older_blocks() {
        let provider = ScriptedProvider::new(vec![Ok("short (Source: a)".into())]);
        let p = policy(30, OverflowPolicy::Summarize);
        let mut ctx = blocks(&[20, 20, 5]);
        p.enforce(&provider, "m", &mut ctx).await;
        assert_eq!(ctx, vec!["short (Source: a)".to_string(), "ccccc".to_string()]);
        assert_eq!(provider.prompts().await.len(), 1);
    }

    #[tokio::test]
    async fn failed_summary_falls_back_to_truncation() {
        let provider = ScriptedProvider::new(vec![Err("down".into())]);
        let p = policy(30, OverflowPolicy::Summarize);
        let mut ctx = blocks(&[20, 20, 5]);
        p.enforce(&provider, "m", &mut ctx).await;
        assert_eq!(ctx.len(), 2);
        assert!(ctx[0].starts_with('b'));
        assert!(ctx[1].starts_with('c'));
    }

    #[tokio::test]
    async fn within_budget_makes_no_calls() {
        let provider = ScriptedProvider::new(vec![]);
        let p = policy(100, OverflowPolicy::Summarize);
        let mut ctx = blocks(&[20, 20]);
        p.enforce(&provider, "m", &mut ctx).await;
        assert_eq!(ctx.len(), 2);
        assert!(provider.prompts().await.is_empty());
    }

    #[tokio::test]
    async fn truncate_policy_never_calls_model() {
        let provider = ScriptedProvider::new(vec![]);
        let p = policy(10, OverflowPolicy::Truncate);
        let mut ctx = blocks(&[8, 8]);
        p.enforce(&provider, "m", &mut ctx).await;
        assert_eq!(ctx.len(), 1);
        assert!(provider.prompts().await.is_empty());
    }
}
