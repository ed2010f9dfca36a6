//! Overlapping, boundary-aware text splitter.

use serde::{Deserialize, Serialize};

use super::{estimate_tokens, normalize_text};
use crate::{DEFAULT_CHUNK_OVERLAP, DEFAULT_MAX_CHUNK_SIZE, DEFAULT_MIN_CHUNK_SIZE};

/// Configuration for a single split operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitterConfig {
    /// Minimum chunk size in bytes of normalized text
    pub min_size: usize,

    /// Maximum chunk size in bytes of normalized text
    pub max_size: usize,

    /// Overlap carried into the next chunk, in bytes
    pub overlap: usize,

    /// Cap on emitted chunks; `None` means unbounded
    pub max_chunks: Option<usize>,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_CHUNK_SIZE,
            max_size: DEFAULT_MAX_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
            max_chunks: None,
        }
    }
}

impl SplitterConfig {
    /// Create a config with explicit bounds.
    pub fn new(min_size: usize, max_size: usize, overlap: usize) -> Self {
        Self {
            min_size,
            max_size,
            overlap,
            max_chunks: None,
        }
    }

    /// Cap the number of emitted chunks.
    pub fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = Some(max_chunks);
        self
    }
}

/// A segment produced by [`split_text`], carrying its emission order and
/// estimated token count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Trimmed text content of the segment
    pub content: String,

    /// Zero-based emission order
    pub index: usize,

    /// Estimated token count of the content
    pub token_count: usize,
}

/// Split text into overlapping, boundary-aware segments.
///
/// The input is normalized first; empty input produces no segments, and
/// input no longer than `min_size` produces exactly one segment covering
/// the whole text. Longer input is cut preferentially at paragraph
/// breaks, then at sentence terminators, and at the raw `max_size` limit
/// when neither boundary lands far enough past `min_size`. Each cut
/// starts `overlap` bytes before the previous cut so adjacent segments
/// share context; when that would not move the cursor strictly forward,
/// the cursor jumps to the cut instead, so the loop always terminates.
pub fn split_text(text: &str, config: &SplitterConfig) -> Vec<Segment> {
    let text = normalize_text(text);
    if text.is_empty() {
        return Vec::new();
    }

    if text.len() <= config.min_size {
        let token_count = estimate_tokens(&text);
        return vec![Segment {
            content: text,
            index: 0,
            token_count,
        }];
    }

    let len = text.len();
    let mut segments = Vec::new();
    let mut cursor = 0usize;
    let mut index = 0usize;

    while cursor < len {
        let mut end = floor_char_boundary(&text, (cursor + config.max_size).min(len));
        if end <= cursor {
            // max_size shorter than one character: take the next full one
            end = ceil_char_boundary(&text, cursor + 1);
        }

        if end < len {
            let window = &text[cursor..end];
            let min_cut = cursor + config.min_size;

            let paragraph_cut = window
                .rfind("\n\n")
                .map(|p| cursor + p)
                .filter(|p| *p > min_cut);
            let sentence_cut = rfind_sentence_end(window)
                .map(|p| cursor + p)
                .filter(|p| *p > min_cut);

            if let Some(pos) = paragraph_cut {
                end = pos + 2;
            } else if let Some(pos) = sentence_cut {
                end = pos + 2;
            }
            // no qualifying boundary: cut at the raw limit
        }

        let slice = text[cursor..end].trim();
        if !slice.is_empty() {
            segments.push(Segment {
                content: slice.to_string(),
                index,
                token_count: estimate_tokens(slice),
            });
            index += 1;

            if let Some(max) = config.max_chunks {
                if segments.len() >= max {
                    break;
                }
            }
        }

        if end >= len {
            break;
        }

        // the cursor must strictly advance past its previous value
        let next = ceil_char_boundary(&text, end.saturating_sub(config.overlap));
        cursor = if next > cursor { next } else { end };
    }

    segments
}

/// Byte position of the sentence terminator nearest the window's end.
fn rfind_sentence_end(window: &str) -> Option<usize> {
    const TERMINATORS: [&str; 4] = [". ", ".\n", "! ", "? "];
    TERMINATORS.iter().filter_map(|t| window.rfind(t)).max()
}

fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentences(count: usize) -> String {
        (0..count)
            .map(|i| format!("This is numbered sentence {i:04} in the corpus."))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn empty_input_produces_no_segments() {
        assert!(split_text("", &SplitterConfig::default()).is_empty());
        assert!(split_text("   \n\n  ", &SplitterConfig::default()).is_empty());
    }

    #[test]
    fn short_input_produces_single_whole_segment() {
        let config = SplitterConfig::default();
        let text = "A short note.";
        let segments = split_text(text, &config);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].content, "A short note.");
        assert_eq!(segments[0].index, 0);
        assert_eq!(segments[0].token_count, estimate_tokens("A short note."));
    }

    #[test]
    fn splits_at_sentence_boundaries_with_overlap() {
        let config = SplitterConfig::new(10, 20, 5);
        let segments = split_text("Sentence one. Sentence two. Sentence three.", &config);

        assert!(segments.len() > 1, "expected multiple segments");
        for seg in &segments {
            assert!(
                seg.content.len() <= 20,
                "segment exceeds max size: {:?}",
                seg.content
            );
        }
        // adjacent segments share trailing/leading text
        let first = &segments[0].content;
        let second = &segments[1].content;
        let tail = &first[first.len().saturating_sub(5)..];
        assert!(
            second.starts_with(tail.trim_start()),
            "no overlap between {first:?} and {second:?}"
        );
    }

    #[test]
    fn prefers_paragraph_breaks() {
        let config = SplitterConfig::new(10, 60, 0);
        let text = "First paragraph with some words.\n\nSecond paragraph follows here. More text to push past the limit.";
        let segments = split_text(text, &config);
        assert!(segments.len() > 1);
        // the first cut lands after the blank line, not mid-paragraph
        assert_eq!(segments[0].content, "First paragraph with some words.");
    }

    #[test]
    fn indices_are_contiguous_from_zero() {
        let config = SplitterConfig::new(30, 50, 10);
        let segments = split_text(&sentences(40), &config);
        assert!(segments.len() > 2);
        for (expected, seg) in segments.iter().enumerate() {
            assert_eq!(seg.index, expected);
        }
    }

    #[test]
    fn covers_all_content_without_gaps() {
        let config = SplitterConfig::new(30, 50, 10);
        let text = normalize_text(&sentences(40));
        let segments = split_text(&text, &config);

        // march each segment to its position; consecutive spans may only
        // leave trimmed whitespace between them
        let mut search_from = 0usize;
        let mut covered_to = 0usize;
        for seg in &segments {
            let start = text[search_from..]
                .find(&seg.content)
                .map(|p| p + search_from)
                .expect("segment content not found in source");
            let gap = &text[covered_to.min(start)..start];
            assert!(
                gap.trim().is_empty(),
                "gap of non-whitespace content before segment {}: {gap:?}",
                seg.index
            );
            covered_to = covered_to.max(start + seg.content.len());
            search_from = start + 1;
        }
        assert!(text[covered_to..].trim().is_empty(), "tail left uncovered");
    }

    #[test]
    fn terminates_when_overlap_exceeds_max_size() {
        let config = SplitterConfig::new(10, 20, 50);
        let segments = split_text(&sentences(10), &config);
        assert!(!segments.is_empty());
        // forced advance means no segment repeats its predecessor
        for pair in segments.windows(2) {
            assert_ne!(pair[0].content, pair[1].content);
        }
    }

    #[test]
    fn terminates_when_min_size_exceeds_max_size() {
        let config = SplitterConfig::new(100, 20, 5);
        let segments = split_text(&sentences(10), &config);
        assert!(!segments.is_empty());
        for seg in &segments {
            assert!(seg.content.len() <= 20);
        }
    }

    #[test]
    fn max_chunks_truncates_output() {
        let config = SplitterConfig::new(30, 50, 10).with_max_chunks(3);
        let segments = split_text(&sentences(40), &config);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[2].index, 2);
    }

    #[test]
    fn never_splits_multibyte_characters() {
        let config = SplitterConfig::new(4, 7, 2);
        let text = "\u{3042}\u{3044}\u{3046}\u{3048}\u{304a}\u{304b}\u{304d}\u{304f}\u{3051}\u{3053}";
        let segments = split_text(text, &config);
        assert!(!segments.is_empty());
        for seg in &segments {
            assert!(seg.content.chars().count() >= 1);
        }
    }
}
