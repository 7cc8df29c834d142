//! Sentence packing for court decisions.
//!
//! Precedent text is sequential narrative, so chunks never overlap. A chunk
//! always ends on a sentence boundary; a single sentence longer than the
//! target is kept whole.

use lazy_static::lazy_static;
use regex::Regex;

use super::{ChunkOutput, ChunkingConfig, char_len};

lazy_static! {
    // Terminal punctuation, optional closing quotes/brackets, then whitespace or end.
    static ref SENTENCE_END: Regex =
        Regex::new(r#"[.!?。]+["'”’)\]]*(?:\s+|$)"#).unwrap();
}

/// Split `text` into trimmed sentences.
///
/// The second value reports whether any boundary was found before the end of
/// the text.
pub fn split_sentences(text: &str) -> (Vec<&str>, bool) {
    let text = text.trim();
    let mut sentences = Vec::new();
    let mut last_end = 0;
    let mut found_boundary = false;

    for mat in SENTENCE_END.find_iter(text) {
        if mat.end() < text.len() {
            found_boundary = true;
        }
        let sentence = text[last_end..mat.end()].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        last_end = mat.end();
    }

    if last_end < text.len() {
        let tail = text[last_end..].trim();
        if !tail.is_empty() {
            sentences.push(tail);
        }
    }

    (sentences, found_boundary)
}

/// Chunk a precedent by packing whole sentences up to the target size.
pub fn chunk_precedent(text: &str, config: &ChunkingConfig) -> ChunkOutput {
    let target = config.precedent_target_chars;
    let (sentences, found_boundary) = split_sentences(text);

    if !found_boundary && char_len(text.trim()) > target {
        return ChunkOutput::degraded(text);
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in sentences {
        let len = char_len(sentence);
        if !current.is_empty() && current_len + 1 + len > target {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(sentence);
        current_len += len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    ChunkOutput::segmented(chunks)
}
