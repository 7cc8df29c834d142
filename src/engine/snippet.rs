//! Snippet extraction for result display.

use aho_corasick::AhoCorasick;

/// Marker appended or prepended where text was cut.
pub const ELLIPSIS: char = '…';

/// Share of the window placed before the matched term.
const LEAD_FRACTION: usize = 4;

/// Snippet centred on the first occurrence of the highest-priority term.
///
/// `terms` are ordered by priority. Matching is ASCII case-insensitive. Falls
/// back to [`prefix_snippet`] when no term occurs in `text`.
pub fn term_snippet(text: &str, terms: &[String], max_chars: usize) -> String {
    match find_term(text, terms) {
        Some(byte_offset) => {
            let match_char = text[..byte_offset].chars().count();
            let lead = max_chars / LEAD_FRACTION;
            window(text, match_char.saturating_sub(lead), max_chars)
        }
        None => prefix_snippet(text, max_chars),
    }
}

/// The first `max_chars` characters of `text`.
pub fn prefix_snippet(text: &str, max_chars: usize) -> String {
    window(text, 0, max_chars)
}

/// Byte offset of the best match: lowest pattern index first, then earliest.
fn find_term(text: &str, terms: &[String]) -> Option<usize> {
    let patterns: Vec<&str> = terms
        .iter()
        .map(String::as_str)
        .filter(|t| !t.is_empty())
        .collect();
    if patterns.is_empty() {
        return None;
    }
    let matcher = AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(&patterns)
        .ok()?;
    matcher
        .find_overlapping_iter(text)
        .min_by_key(|m| (m.pattern().as_usize(), m.start()))
        .map(|m| m.start())
}

/// `max_chars` characters starting at character `start`, shifted left if the
/// window would run past the end. Whitespace runs collapse to one space.
fn window(text: &str, start: usize, max_chars: usize) -> String {
    let total = text.chars().count();
    let end = (start + max_chars).min(total);
    let start = end.saturating_sub(max_chars).min(start);

    let byte_at = |char_idx: usize| {
        text.char_indices()
            .nth(char_idx)
            .map_or(text.len(), |(i, _)| i)
    };
    let body = text[byte_at(start)..byte_at(end)]
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let mut snippet = String::with_capacity(body.len() + 8);
    if start > 0 {
        snippet.push(ELLIPSIS);
    }
    snippet.push_str(&body);
    if end < total {
        snippet.push(ELLIPSIS);
    }
    snippet
}
