//! Recursive character text splitting.
//!
//! Splits on the coarsest separator present (`"\n\n"`, then `"\n"`, then
//! `" "`, then individual characters), greedily merges small pieces back up
//! to `chunk_size` characters, and carries up to `chunk_overlap` characters
//! of trailing pieces into the next chunk. Separators stay attached to the
//! start of the piece that follows them. Lengths are counted in `char`s.

use std::collections::VecDeque;

use crate::error::IngestError;
use crate::store::Document;

/// Separators tried in order, coarsest first.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Recursive character splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// Creates a splitter.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::InvalidChunking`] if `chunk_overlap` exceeds
    /// `chunk_size`.
    pub const fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, IngestError> {
        if chunk_overlap > chunk_size {
            return Err(IngestError::InvalidChunking {
                chunk_size,
                chunk_overlap,
            });
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Splits `text` into trimmed, non-empty chunks.
    #[must_use]
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &SEPARATORS)
    }

    /// Splits every document, copying its metadata onto each chunk.
    #[must_use]
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        documents
            .iter()
            .flat_map(|doc| {
                self.split_text(&doc.content)
                    .into_iter()
                    .map(|chunk| Document::with_metadata(chunk, doc.metadata.clone()))
            })
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let (separator, remaining) = pick_separator(text, separators);
        let pieces = split_keep_separator(text, separator);

        let mut chunks = Vec::new();
        let mut small: Vec<String> = Vec::new();
        for piece in pieces {
            if char_len(&piece) < self.chunk_size {
                small.push(piece);
                continue;
            }
            if !small.is_empty() {
                chunks.extend(self.merge(&small));
                small.clear();
            }
            if remaining.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_string());
                }
            } else {
                chunks.extend(self.split_recursive(&piece, remaining));
            }
        }
        if !small.is_empty() {
            chunks.extend(self.merge(&small));
        }
        chunks
    }

    /// Greedily joins consecutive pieces into chunks, keeping a tail of up
    /// to `chunk_overlap` characters as the start of the next chunk.
    fn merge(&self, pieces: &[String]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !window.is_empty() {
                push_trimmed(&mut chunks, &window);
                while total > self.chunk_overlap
                    || (total > 0 && total + len > self.chunk_size)
                {
                    match window.pop_front() {
                        Some((_, front)) => total -= front,
                        None => break,
                    }
                }
            }
            window.push_back((piece.as_str(), len));
            total += len;
        }
        push_trimmed(&mut chunks, &window);
        chunks
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn push_trimmed(chunks: &mut Vec<String>, window: &VecDeque<(&str, usize)>) {
    let joined: String = window.iter().map(|(s, _)| *s).collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// Returns the first separator present in `text` and the finer ones after it.
fn pick_separator<'a>(text: &str, separators: &'a [&'a str]) -> (&'a str, &'a [&'a str]) {
    for (i, &sep) in separators.iter().enumerate() {
        if sep.is_empty() {
            return (sep, &[]);
        }
        if text.contains(sep) {
            return (sep, &separators[i + 1..]);
        }
    }
    ("", &[])
}

/// Splits on `separator`, prefixing every piece after the first with it.
/// The empty separator splits into single characters.
fn split_keep_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }
    let mut parts = text.split(separator);
    let mut pieces: Vec<String> = parts.next().map(str::to_string).into_iter().collect();
    pieces.extend(parts.map(|p| format!("{separator}{p}")));
    pieces.retain(|p| !p.is_empty());
    pieces
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{Map, json};

    fn splitter(size: usize, overlap: usize) -> TextSplitter {
        TextSplitter::new(size, overlap).unwrap_or_else(|e| panic!("invalid splitter: {e}"))
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(splitter(100, 10).split_text("  hello world  "), vec!["hello world"]);
    }

    #[test]
    fn test_paragraphs_are_preferred_boundaries() {
        let text = "First paragraph here.\n\nSecond paragraph here.";
        let chunks = splitter(25, 0).split_text(text);
        assert_eq!(chunks, vec!["First paragraph here.", "Second paragraph here."]);
    }

    #[test]
    fn test_overlap_carries_trailing_words() {
        let chunks = splitter(10, 4).split_text("aaa bbb ccc ddd");
        assert_eq!(chunks, vec!["aaa bbb", "bbb ccc", "ccc ddd"]);
    }

    #[test]
    fn test_long_word_falls_back_to_characters() {
        let chunks = splitter(4, 0).split_text("abcdefghij");
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_multibyte_lengths_are_chars() {
        let chunks = splitter(3, 0).split_text("äöüß");
        assert_eq!(chunks, vec!["äöü", "ß"]);
    }

    #[test]
    fn test_empty_and_whitespace_yield_nothing() {
        assert!(splitter(10, 0).split_text("").is_empty());
        assert!(splitter(10, 0).split_text(" \n\n \n").is_empty());
    }

    #[test]
    fn test_overlap_larger_than_size_rejected() {
        assert!(matches!(
            TextSplitter::new(10, 11),
            Err(IngestError::InvalidChunking { .. })
        ));
    }

    #[test]
    fn test_split_documents_copies_metadata() {
        let mut meta = Map::new();
        meta.insert("source".to_string(), json!("notes.txt"));
        let docs = vec![Document::with_metadata("one two three four", meta)];

        let chunks = splitter(13, 0).split_documents(&docs);
        assert_eq!(chunks.len(), 2);
        for chunk in &chunks {
            assert_eq!(chunk.metadata["source"], "notes.txt");
        }
    }

    proptest! {
        #[test]
        fn prop_chunks_never_exceed_size(
            text in "[a-z \\n]{0,400}",
            size in 1usize..60,
            overlap_pct in 0usize..100,
        ) {
            let overlap = size * overlap_pct / 100;
            let chunks = splitter(size, overlap).split_text(&text);
            for chunk in &chunks {
                prop_assert!(char_len(chunk) <= size, "{chunk:?} longer than {size}");
                prop_assert!(!chunk.is_empty());
            }
        }

        #[test]
        fn prop_no_overlap_preserves_words(words in proptest::collection::vec("[a-z]{1,8}", 0..40)) {
            let text = words.join(" ");
            let chunks = splitter(20, 0).split_text(&text);
            let rejoined: Vec<String> = chunks
                .iter()
                .flat_map(|c| c.split_whitespace().map(str::to_string))
                .collect();
            prop_assert_eq!(rejoined, words);
        }
    }
}
