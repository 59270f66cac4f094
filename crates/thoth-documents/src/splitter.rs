// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recursive character splitter.
//!
//! Text is cut on the coarsest separator that occurs in it (paragraphs, then
//! lines, then words, then characters). Pieces that still exceed the chunk
//! size are split again with the finer separators. Adjacent pieces are then
//! packed into chunks of at most `chunk_size` characters, carrying up to
//! `chunk_overlap` characters of trailing context into the next chunk.

use std::collections::VecDeque;

use thoth_config::model::DocumentsConfig;
use thoth_core::ThothError;

/// Separators tried in order. The empty separator splits into characters.
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ThothError> {
        if chunk_size == 0 {
            return Err(ThothError::Config("chunk_size must be at least 1".into()));
        }
        if chunk_overlap >= chunk_size {
            return Err(ThothError::Config(format!(
                "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn from_config(config: &DocumentsConfig) -> Result<Self, ThothError> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Split `text` into trimmed, non-empty chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &DEFAULT_SEPARATORS)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let (index, separator) = separators
            .iter()
            .enumerate()
            .find(|(_, sep)| sep.is_empty() || text.contains(**sep))
            .map(|(i, sep)| (i, *sep))
            .unwrap_or((separators.len(), ""));
        let finer = separators.get(index + 1..).unwrap_or(&[]);

        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|p| !p.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();
        for piece in pieces {
            if char_len(piece) <= self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge(&pending, separator));
                pending.clear();
            }
            if finer.is_empty() {
                chunks.push(piece.trim().to_string());
            } else {
                chunks.extend(self.split_with(piece, finer));
            }
        }
        if !pending.is_empty() {
            chunks.extend(self.merge(&pending, separator));
        }
        chunks.retain(|c| !c.is_empty());
        chunks
    }

    /// Pack small pieces into chunks, sliding a window that keeps the overlap.
    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);
            let joiner = if window.is_empty() { 0 } else { sep_len };
            if total + len + joiner > self.chunk_size && !window.is_empty() {
                push_joined(&mut chunks, &window, separator);
                while total > self.chunk_overlap
                    || (total > 0
                        && total + len + if window.is_empty() { 0 } else { sep_len }
                            > self.chunk_size)
                {
                    let Some(front) = window.pop_front() else {
                        break;
                    };
                    total -= char_len(front) + if window.is_empty() { 0 } else { sep_len };
                }
            }
            let joiner = if window.is_empty() { 0 } else { sep_len };
            window.push_back(piece);
            total += len + joiner;
        }
        push_joined(&mut chunks, &window, separator);
        chunks
    }
}

fn push_joined(chunks: &mut Vec<String>, window: &VecDeque<&str>, separator: &str) {
    let joined = window.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn short_text_is_one_chunk() {
        let splitter = RecursiveSplitter::new(100, 10).unwrap();
        assert_eq!(splitter.split("  hello world  "), vec!["hello world"]);
    }

    #[test]
    fn whitespace_only_yields_nothing() {
        let splitter = RecursiveSplitter::new(100, 10).unwrap();
        assert!(splitter.split(" \n\n \n ").is_empty());
    }

    #[test]
    fn prefers_paragraph_boundaries() {
        let splitter = RecursiveSplitter::new(20, 0).unwrap();
        let text = "first paragraph\n\nsecond paragraph\n\nthird one";
        assert_eq!(
            splitter.split(text),
            vec!["first paragraph", "second paragraph", "third one"]
        );
    }

    #[test]
    fn overlap_repeats_trailing_words() {
        let splitter = RecursiveSplitter::new(10, 4).unwrap();
        let chunks = splitter.split("aaa bbb ccc ddd");
        assert_eq!(chunks, vec!["aaa bbb", "bbb ccc", "ccc ddd"]);
    }

    #[test]
    fn long_word_falls_back_to_characters() {
        let splitter = RecursiveSplitter::new(4, 0).unwrap();
        assert_eq!(splitter.split("abcdefghij"), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        assert!(RecursiveSplitter::new(10, 10).is_err());
        assert!(RecursiveSplitter::new(0, 0).is_err());
    }

    fn squash(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn chunks_respect_size_and_source(
            text in "[a-z \\n]{0,400}",
            size in 5usize..60,
            overlap_pct in 0usize..50,
        ) {
            let overlap = size * overlap_pct / 100;
            let splitter = RecursiveSplitter::new(size, overlap).unwrap();
            let chunks = splitter.split(&text);
            let source = squash(&text);

            prop_assert_eq!(chunks.is_empty(), source.is_empty());
            for chunk in &chunks {
                prop_assert!(!chunk.is_empty());
                prop_assert!(chunk.chars().count() <= size);
                prop_assert!(source.contains(&squash(chunk)));
            }
            if let (Some(first), Some(last)) = (chunks.first(), chunks.last()) {
                prop_assert_eq!(squash(first).chars().next(), source.chars().next());
                prop_assert_eq!(squash(last).chars().last(), source.chars().last());
            }
        }
    }
}
