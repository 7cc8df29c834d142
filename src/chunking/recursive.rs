//! Recursive boundary splitting with overlap, for rulings, interpretations
//! and any text without a dedicated policy.
//!
//! Separators are tried coarsest first (paragraph, line, sentence, word);
//! pieces still too large are split again with the next separator, and a
//! hard character cut is the last resort. Pieces are then merged back up to
//! the chunk size, carrying a tail of up to `overlap` characters into the
//! next chunk.

use std::collections::VecDeque;

use super::{ChunkOutput, ChunkingConfig, char_len};

pub fn chunk_recursive(text: &str, config: &ChunkingConfig) -> ChunkOutput {
    let separators: Vec<&str> = config.separators.iter().map(String::as_str).collect();
    let chunks = split_text(
        text,
        &separators,
        config.recursive_chunk_chars,
        config.recursive_overlap_chars,
    );
    ChunkOutput::segmented(chunks)
}

fn split_text(text: &str, separators: &[&str], chunk_size: usize, overlap: usize) -> Vec<String> {
    // First separator that occurs in the text; the rest are kept for pieces
    // that are still too large.
    let position = separators.iter().position(|sep| text.contains(sep));
    let (pieces, remaining): (Vec<&str>, &[&str]) = match position {
        Some(i) => (text.split_inclusive(separators[i]).collect(), &separators[i + 1..]),
        None => (split_chars(text), &separators[..0]),
    };

    let mut chunks = Vec::new();
    let mut fitting: Vec<&str> = Vec::new();

    for piece in pieces {
        if char_len(piece) <= chunk_size {
            fitting.push(piece);
            continue;
        }
        if !fitting.is_empty() {
            chunks.extend(merge_pieces(&fitting, chunk_size, overlap));
            fitting.clear();
        }
        // Single characters always fit, so this recursion bottoms out at the
        // hard character cut.
        chunks.extend(split_text(piece, remaining, chunk_size, overlap));
    }

    if !fitting.is_empty() {
        chunks.extend(merge_pieces(&fitting, chunk_size, overlap));
    }

    chunks.retain(|c| !c.is_empty());
    chunks
}

fn split_chars(text: &str) -> Vec<&str> {
    text.char_indices()
        .map(|(i, c)| &text[i..i + c.len_utf8()])
        .collect()
}

/// Greedily merge pieces into chunks of at most `chunk_size` characters,
/// keeping up to `overlap` trailing characters of one chunk at the head of
/// the next.
fn merge_pieces(pieces: &[&str], chunk_size: usize, overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut window: VecDeque<(&str, usize)> = VecDeque::new();
    let mut total = 0;

    for &piece in pieces {
        let len = char_len(piece);
        if total + len > chunk_size && !window.is_empty() {
            push_chunk(&mut chunks, &window);
            while total > overlap || (total + len > chunk_size && total > 0) {
                match window.pop_front() {
                    Some((_, front_len)) => total -= front_len,
                    None => break,
                }
            }
        }
        window.push_back((piece, len));
        total += len;
    }

    if !window.is_empty() {
        push_chunk(&mut chunks, &window);
    }
    chunks
}

fn push_chunk(chunks: &mut Vec<String>, window: &VecDeque<(&str, usize)>) {
    let text: String = window.iter().map(|(piece, _)| *piece).collect();
    let text = text.trim();
    if !text.is_empty() && chunks.last().is_none_or(|last| last != text) {
        chunks.push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(chunk: usize, overlap: usize) -> ChunkingConfig {
        ChunkingConfig {
            recursive_chunk_chars: chunk,
            recursive_overlap_chars: overlap,
            ..Default::default()
        }
    }

    #[test]
    fn test_short_text_single_chunk() {
        let out = chunk_recursive("A short ruling.", &ChunkingConfig::default());
        assert_eq!(out.chunks, vec!["A short ruling."]);
        assert!(!out.degraded);
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let text = "First paragraph here.\n\nSecond paragraph here.";
        let out = chunk_recursive(text, &config(25, 0));
        assert_eq!(out.chunks, vec!["First paragraph here.", "Second paragraph here."]);
    }

    #[test]
    fn test_chunks_respect_size() {
        let text = "lorem ipsum dolor sit amet ".repeat(60);
        let out = chunk_recursive(&text, &config(100, 10));
        assert!(out.chunks.len() > 1);
        for chunk in &out.chunks {
            assert!(chunk.chars().count() <= 100, "chunk too long: {}", chunk.len());
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let words: Vec<String> = (0..80).map(|i| format!("w{i:02}")).collect();
        let text = words.join(" ");
        let out = chunk_recursive(&text, &config(60, 12));
        assert!(out.chunks.len() > 2);
        for pair in out.chunks.windows(2) {
            let last_word = pair[0].split_whitespace().last().unwrap();
            assert!(
                pair[1].contains(last_word),
                "expected '{last_word}' to carry over into '{}'",
                pair[1]
            );
        }
    }

    #[test]
    fn test_hard_cut_without_separators() {
        let text = "가".repeat(250);
        let out = chunk_recursive(&text, &config(100, 10));
        assert!(out.chunks.len() >= 3);
        assert!(out.chunks.iter().all(|c| c.chars().count() <= 100));
    }
}
