//! Article-preserving segmentation for statutes.
//!
//! Every chunk starts at an article marker and runs to the next one, so a
//! chunk holds exactly one article. Articles are never split, whatever their
//! length: a partial article has no legal meaning.

use lazy_static::lazy_static;
use regex::Regex;

use super::{ChunkOutput, ChunkingConfig};

lazy_static! {
    /// Article markers at the start of a line: `제329조`, `제10조의2`,
    /// `Article 329`, `Art. 5`. A match is only a candidate; see
    /// [`article_headings`].
    pub static ref ARTICLE_MARKER: Regex = Regex::new(
        r"(?m)^[ \t]*(?:제\s*\d+\s*조(?:\s*의\s*\d+)?|Article\s+\d+[A-Za-z]?\b|Art\.\s*\d+[A-Za-z]?\b)"
    )
    .unwrap();

    /// Text right after a marker that makes it a cross reference:
    /// `제329조 내지 제331조`, `제330조의 장소`, `Article 9 under`.
    static ref CONTINUATION: Regex = Regex::new(
        r"^[ \t]*(?:의\s|에|내지|및|또는|부터|까지|와\s|과\s|을\s|를\s|(?:under|of|and|or|to|through|in)\b)"
    )
    .unwrap();

    /// Part, chapter and section headings that may directly precede an
    /// article.
    static ref STRUCTURAL_HEADING: Regex = Regex::new(
        r"^[ \t]*(?:제\s*\d+\s*(?:편|장|절|관)|(?:Part|Chapter|Section|Title)\s+[0-9IVXLC]+)\b"
    )
    .unwrap();
}

/// Byte offsets of the article headings in `text`.
///
/// A marker followed by a parenthesised title is always a heading. Otherwise
/// it must not read as a cross reference, and the line before it must close
/// a sentence or be a structural heading; a marker at the start of a wrapped
/// line stays inside the article it belongs to.
pub fn article_headings(text: &str) -> Vec<usize> {
    ARTICLE_MARKER
        .find_iter(text)
        .filter(|m| {
            let rest = &text[m.end()..];
            if rest.trim_start_matches([' ', '\t']).starts_with(['(', '（']) {
                return true;
            }
            !CONTINUATION.is_match(rest) && closes_previous_line(&text[..m.start()])
        })
        .map(|m| m.start())
        .collect()
}

fn closes_previous_line(before: &str) -> bool {
    let before = before.trim_end();
    let Some(last) = before.chars().last() else {
        return true;
    };
    if matches!(last, '.' | '。' | '다' | ')' | '）' | ':' | ';') {
        return true;
    }
    let line = before.rsplit('\n').next().unwrap_or(before);
    STRUCTURAL_HEADING.is_match(line)
}

/// Chunk a statute into one chunk per article.
///
/// Text before the first article (title, chapter heading) becomes its own
/// chunk. Without any heading the statute is stored whole and flagged
/// degraded.
pub fn chunk_statute(text: &str, _config: &ChunkingConfig) -> ChunkOutput {
    let starts = article_headings(text);
    if starts.is_empty() {
        return ChunkOutput::degraded(text);
    }

    let mut chunks = Vec::with_capacity(starts.len() + 1);
    let preamble = text[..starts[0]].trim();
    if !preamble.is_empty() {
        chunks.push(preamble.to_string());
    }

    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        let article = text[start..end].trim();
        if !article.is_empty() {
            chunks.push(article.to_string());
        }
    }

    ChunkOutput::segmented(chunks)
}

/// Number of article headings in `chunk`, and whether the chunk begins with one.
pub fn article_markers(chunk: &str) -> (usize, bool) {
    let headings = article_headings(chunk);
    let at_start = headings
        .first()
        .is_some_and(|&start| chunk[..start].trim().is_empty());
    (headings.len(), at_start)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CRIMINAL_ACT: &str = "형법\n제1장 총칙\n\
        제329조(절도) 타인의 재물을 절취한 자는 6년 이하의 징역에 처한다.\n\
        제330조(야간주거침입절도) 야간에 사람의 주거에 침입하여 타인의 재물을 절취한 자는\n\
        10년 이하의 징역에 처한다.\n\
        제331조의2(자동차등 불법사용) 권리자의 동의없이 자동차를 일시 사용한 자는 처벌한다.";

    #[test]
    fn test_one_article_per_chunk() {
        let out = chunk_statute(CRIMINAL_ACT, &ChunkingConfig::default());
        assert!(!out.degraded);
        assert_eq!(out.chunks.len(), 4);
        assert_eq!(out.chunks[0], "형법\n제1장 총칙");
        assert!(out.chunks[1].starts_with("제329조"));
        assert!(out.chunks[2].contains("10년 이하의 징역"));
        assert!(out.chunks[3].starts_with("제331조의2"));

        for chunk in &out.chunks[1..] {
            assert_eq!(article_markers(chunk), (1, true));
        }
    }

    #[test]
    fn test_inline_reference_does_not_split() {
        let text = "Article 10 Penalties under Article 9 apply.\nArticle 11 Repealed.";
        let out = chunk_statute(text, &ChunkingConfig::default());
        assert_eq!(
            out.chunks,
            vec!["Article 10 Penalties under Article 9 apply.", "Article 11 Repealed."]
        );
    }

    #[test]
    fn test_long_article_is_not_split() {
        let body = "조문 내용이 길다. ".repeat(300);
        let text = format!("제1조(목적) {body}\n제2조(정의) 짧다.");
        let out = chunk_statute(&text, &ChunkingConfig::default());
        assert_eq!(out.chunks.len(), 2);
        assert!(out.chunks[0].chars().count() > 1500);
    }

    #[test]
    fn test_no_marker_is_degraded() {
        let out = chunk_statute("부칙 이 법은 공포한 날부터 시행한다.", &ChunkingConfig::default());
        assert!(out.degraded);
        assert_eq!(out.chunks.len(), 1);
    }

    #[test]
    fn test_wrapped_cross_reference_stays_in_article() {
        let text = "제332조(상습범) 상습으로\n\
            제329조 내지 제331조의2의 죄를 범한 자는 가중한다.\n\
            제333조(강도) 폭행으로 타인의 재물을 강취한 자는 처벌한다.";
        let out = chunk_statute(text, &ChunkingConfig::default());
        assert_eq!(out.chunks.len(), 2);
        assert!(out.chunks[0].contains("제329조 내지"));
        assert!(out.chunks[1].starts_with("제333조"));
        for chunk in &out.chunks {
            assert_eq!(article_markers(chunk), (1, true));
        }
    }

    #[test]
    fn test_wrapped_english_reference_stays_in_article() {
        let text = "Article 10 Penalties imposed under\n\
            Article 9 apply to repeat offenders.\n\
            Article 11 Repealed.";
        let out = chunk_statute(text, &ChunkingConfig::default());
        assert_eq!(
            out.chunks,
            vec![
                "Article 10 Penalties imposed under\nArticle 9 apply to repeat offenders.",
                "Article 11 Repealed."
            ]
        );
    }

    #[test]
    fn test_heading_after_chapter_line() {
        let text = "Chapter 2 Offences\nArticle 5 Theft is punished.";
        let out = chunk_statute(text, &ChunkingConfig::default());
        assert_eq!(out.chunks, vec!["Chapter 2 Offences", "Article 5 Theft is punished."]);
    }
}
