//! Unicode-aware default analyzer.

use std::collections::HashSet;

use lazy_static::lazy_static;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::Analyzer;
use crate::error::Result;

lazy_static! {
    static ref ENGLISH_STOP_WORDS: HashSet<&'static str> = [
        "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "can", "could", "did",
        "do", "does", "for", "from", "had", "has", "have", "how", "if", "in", "into", "is", "it",
        "its", "may", "of", "on", "or", "shall", "should", "such", "that", "the", "their",
        "then", "there", "these", "they", "this", "to", "was", "were", "what", "when", "where",
        "which", "who", "why", "will", "with", "would",
    ]
    .into_iter()
    .collect();
}

/// NFKC normalization, UAX #29 word segmentation, lowercasing and English
/// stop-word removal.
///
/// Hangul syllables and digits inside one word stay together, so a Korean
/// citation such as `제329조` is a single term.
#[derive(Debug, Clone)]
pub struct StandardAnalyzer {
    stop_words: bool,
}

impl StandardAnalyzer {
    pub fn new() -> Self {
        Self { stop_words: true }
    }

    /// Keep stop words in the output.
    pub fn without_stop_words(mut self) -> Self {
        self.stop_words = false;
        self
    }
}

impl Default for StandardAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for StandardAnalyzer {
    fn analyze(&self, text: &str) -> Result<Vec<String>> {
        let normalized: String = text.nfkc().collect();
        let tokens = normalized
            .unicode_words()
            .filter(|word| word.chars().any(char::is_alphanumeric))
            .map(str::to_lowercase)
            .filter(|word| !(self.stop_words && ENGLISH_STOP_WORDS.contains(word.as_str())))
            .collect();
        Ok(tokens)
    }

    fn name(&self) -> &'static str {
        "standard"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_and_stop_words() {
        let analyzer = StandardAnalyzer::new();
        let tokens = analyzer.analyze("Theft requires INTENT to deprive").unwrap();
        assert_eq!(tokens, vec!["theft", "requires", "intent", "deprive"]);
    }

    #[test]
    fn test_keeps_stop_words_when_disabled() {
        let analyzer = StandardAnalyzer::new().without_stop_words();
        let tokens = analyzer.analyze("the law").unwrap();
        assert_eq!(tokens, vec!["the", "law"]);
    }

    #[test]
    fn test_citation_tokens() {
        let analyzer = StandardAnalyzer::new();
        assert_eq!(analyzer.analyze("Article 329").unwrap(), vec!["article", "329"]);
        assert_eq!(analyzer.analyze("형법 제329조").unwrap(), vec!["형법", "제329조"]);
    }

    #[test]
    fn test_punctuation_only_yields_nothing() {
        let analyzer = StandardAnalyzer::new();
        assert!(analyzer.analyze("???").unwrap().is_empty());
        assert!(analyzer.analyze("  ... !!").unwrap().is_empty());
    }

    #[test]
    fn test_fullwidth_is_normalized() {
        let analyzer = StandardAnalyzer::new();
        assert_eq!(analyzer.analyze("ＡＢＣ１２３").unwrap(), vec!["abc123"]);
    }
}
