//! Recursive text chunker
//!
//! Splits a document into overlapping chunks of bounded character length.
//! Boundaries prefer paragraphs, then lines, then sentences, then words; a
//! raw per-character cut is used only for runs with no separator at all.
//!
//! Every chunk is a contiguous byte span of the input, so chunks can be
//! mapped back onto the document and consecutive spans always touch or
//! overlap.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::errors::{RagError, Result};

/// Separator levels, highest priority first
const SEPARATOR_LEVELS: &[&[&str]] = &[
    &["\n\n"],
    &["\n"],
    &[". ", "! ", "? ", "؟ "],
    &[" "],
];

/// Chunker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Maximum chunk length in characters
    pub chunk_size: usize,
    /// Characters carried over between consecutive chunks
    pub chunk_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

impl ChunkerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::Config(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Byte span of one chunk within its document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    pub start: usize,
    pub end: usize,
}

impl ChunkSpan {
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// Smallest unit the merger works with
#[derive(Debug, Clone, Copy)]
struct Piece {
    start: usize,
    end: usize,
    chars: usize,
}

/// Recursive separator-aware chunker
#[derive(Debug, Clone)]
pub struct TextChunker {
    config: ChunkerConfig,
}

impl TextChunker {
    /// Create chunker, rejecting an unusable size/overlap pair
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Split `text` into chunk spans
    pub fn split_spans(&self, text: &str) -> Vec<ChunkSpan> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut pieces = Vec::new();
        self.collect_pieces(text, 0, 0, &mut pieces);
        self.merge(&pieces)
    }

    /// Split `text` into chunk strings
    pub fn split_text<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.split_spans(text)
            .into_iter()
            .map(|span| span.slice(text))
            .collect()
    }

    /// Break `text[offset..]` into pieces no longer than `chunk_size`
    fn collect_pieces(&self, text: &str, offset: usize, level: usize, out: &mut Vec<Piece>) {
        let chars = text.chars().count();
        if chars <= self.config.chunk_size {
            if !text.is_empty() {
                out.push(Piece {
                    start: offset,
                    end: offset + text.len(),
                    chars,
                });
            }
            return;
        }

        let Some(separators) = SEPARATOR_LEVELS.get(level) else {
            // No separator left: raw cut, one piece per character
            for (idx, ch) in text.char_indices() {
                out.push(Piece {
                    start: offset + idx,
                    end: offset + idx + ch.len_utf8(),
                    chars: 1,
                });
            }
            return;
        };

        let parts = split_keeping_separators(text, separators);
        if parts.len() == 1 {
            self.collect_pieces(text, offset, level + 1, out);
            return;
        }

        for (part_start, part_end) in parts {
            self.collect_pieces(&text[part_start..part_end], offset + part_start, level + 1, out);
        }
    }

    /// Greedy merge with trailing-piece overlap
    fn merge(&self, pieces: &[Piece]) -> Vec<ChunkSpan> {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;

        let mut spans = Vec::new();
        let mut window: VecDeque<Piece> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            if total + piece.chars > size {
                if let (Some(first), Some(last)) = (window.front(), window.back()) {
                    spans.push(ChunkSpan {
                        start: first.start,
                        end: last.end,
                    });
                }
                while total > overlap || (total > 0 && total + piece.chars > size) {
                    match window.pop_front() {
                        Some(dropped) => total -= dropped.chars,
                        None => break,
                    }
                }
            }
            window.push_back(*piece);
            total += piece.chars;
        }

        if let (Some(first), Some(last)) = (window.front(), window.back()) {
            spans.push(ChunkSpan {
                start: first.start,
                end: last.end,
            });
        }

        spans
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            config: ChunkerConfig::default(),
        }
    }
}

/// Split at any of `separators`, each separator staying on the piece it ends.
/// Returns byte ranges relative to `text`.
fn split_keeping_separators(text: &str, separators: &[&str]) -> Vec<(usize, usize)> {
    let mut parts = Vec::new();
    let mut part_start = 0;
    let mut idx = 0;

    while idx < text.len() {
        let rest = &text[idx..];
        if let Some(sep) = separators.iter().find(|sep| rest.starts_with(**sep)) {
            let part_end = idx + sep.len();
            parts.push((part_start, part_end));
            part_start = part_end;
            idx = part_end;
        } else {
            idx += rest.chars().next().map(char::len_utf8).unwrap_or(1);
        }
    }

    if part_start < text.len() {
        parts.push((part_start, text.len()));
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn chunker(size: usize, overlap: usize) -> TextChunker {
        TextChunker::new(ChunkerConfig {
            chunk_size: size,
            chunk_overlap: overlap,
        })
        .unwrap()
    }

    /// Spans start at 0, end at len, and never leave a gap
    fn assert_covers(text: &str, spans: &[ChunkSpan]) {
        assert_eq!(spans.first().map(|s| s.start), Some(0));
        assert_eq!(spans.last().map(|s| s.end), Some(text.len()));
        for pair in spans.windows(2) {
            assert!(pair[1].start <= pair[0].end, "gap between {:?}", pair);
            assert!(pair[1].start > pair[0].start, "no progress at {:?}", pair);
        }
    }

    /// Concatenate chunks, dropping each chunk's overlap with its predecessor
    fn reconstruct(text: &str, spans: &[ChunkSpan]) -> String {
        let mut out = String::new();
        let mut covered = 0;
        for span in spans {
            let from = span.start.max(covered);
            out.push_str(&text[from..span.end]);
            covered = span.end;
        }
        out
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let chunker = TextChunker::default();
        assert!(chunker.split_text("").is_empty());
        assert!(chunker.split_text("   \n\n ").is_empty());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunker = TextChunker::default();
        let text = "The quick brown fox jumps over the lazy dog. Fox is an animal.";
        assert_eq!(chunker.split_text(text), vec![text]);
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let chunker = chunker(30, 0);
        let text = "First paragraph here.\n\nSecond paragraph here.";
        let chunks = chunker.split_text(text);
        assert_eq!(chunks, vec!["First paragraph here.\n\n", "Second paragraph here."]);
    }

    #[test]
    fn test_sentence_boundaries_before_words() {
        let chunker = chunker(40, 0);
        let text = "One short sentence. Another short sentence. A third one.";
        let chunks = chunker.split_text(text);
        assert_eq!(chunks[0], "One short sentence. ");
        assert!(chunks.iter().all(|c| c.chars().count() <= 40));
    }

    #[test]
    fn test_raw_cut_when_no_separator() {
        let chunker = chunker(10, 2);
        let text = "abcdefghijklmnopqrstuvwxyz";
        let spans = chunker.split_spans(text);
        assert!(spans.iter().all(|s| s.slice(text).chars().count() <= 10));
        assert_covers(text, &spans);
        assert_eq!(reconstruct(text, &spans), text);
    }

    #[test]
    fn test_overlap_between_consecutive_chunks() {
        let chunker = chunker(20, 6);
        let text = "aa bb cc dd ee ff gg hh ii jj kk ll mm nn";
        let spans = chunker.split_spans(text);
        assert!(spans.len() > 1);
        for pair in spans.windows(2) {
            let shared = pair[0].end.saturating_sub(pair[1].start);
            assert!(shared > 0 && shared <= 6, "overlap {} in {:?}", shared, pair);
        }
    }

    #[test]
    fn test_arabic_text_respects_char_budget() {
        let chunker = chunker(12, 3);
        let text = "القط السريع البني يقفز فوق الكلب الكسول. الكلب حيوان.";
        let spans = chunker.split_spans(text);
        assert!(spans.len() > 1);
        for span in &spans {
            assert!(span.slice(text).chars().count() <= 12);
        }
        assert_eq!(reconstruct(text, &spans), text);
    }

    #[test]
    fn test_splitting_is_pure() {
        let chunker = chunker(25, 5);
        let text = "Lorem ipsum dolor sit amet.\nConsectetur adipiscing elit.\n\nSed do eiusmod.";
        assert_eq!(chunker.split_spans(text), chunker.split_spans(text));
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(TextChunker::new(ChunkerConfig {
            chunk_size: 0,
            chunk_overlap: 0
        })
        .is_err());
        assert!(TextChunker::new(ChunkerConfig {
            chunk_size: 10,
            chunk_overlap: 10
        })
        .is_err());
    }

    #[quickcheck]
    fn prop_chunks_cover_document(text: String, size: u8, overlap: u8) -> bool {
        let size = (size as usize % 64) + 2;
        let overlap = overlap as usize % size;
        let chunker = chunker(size, overlap);
        let spans = chunker.split_spans(&text);

        if text.trim().is_empty() {
            return spans.is_empty();
        }

        let bounded = spans
            .iter()
            .all(|s| s.slice(&text).chars().count() <= size);
        bounded && reconstruct(&text, &spans) == text
    }
}
