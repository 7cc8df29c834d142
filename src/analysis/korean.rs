//! Morphological analyzer for Korean legal text, backed by lindera and the
//! embedded ko-dic dictionary.

use std::fmt;

use lindera::dictionary::load_dictionary;
use lindera::mode::Mode;
use lindera::segmenter::Segmenter;
use lindera::tokenizer::Tokenizer;

use crate::analysis::Analyzer;
use crate::error::{JurisError, Result};

/// ko-dic part-of-speech prefixes that carry no retrieval value:
/// particles (J*), endings (E*), symbols (S*) and affixes (X*).
const DROPPED_POS_PREFIXES: [char; 4] = ['J', 'E', 'S', 'X'];

pub struct KoreanAnalyzer {
    tokenizer: Tokenizer,
}

impl KoreanAnalyzer {
    pub fn new() -> Result<Self> {
        let dictionary = load_dictionary("embedded://ko-dic")
            .map_err(|e| JurisError::analysis(format!("failed to load ko-dic: {e}")))?;
        let segmenter = Segmenter::new(Mode::Normal, dictionary, None);
        Ok(Self {
            tokenizer: Tokenizer::new(segmenter),
        })
    }
}

impl fmt::Debug for KoreanAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KoreanAnalyzer").finish_non_exhaustive()
    }
}

impl Analyzer for KoreanAnalyzer {
    fn analyze(&self, text: &str) -> Result<Vec<String>> {
        let tokens = self
            .tokenizer
            .tokenize(text)
            .map_err(|e| JurisError::analysis(format!("tokenization failed: {e}")))?;

        let mut terms = Vec::with_capacity(tokens.len());
        for mut token in tokens {
            let keep = token
                .details()
                .first()
                .and_then(|pos| pos.chars().next())
                .is_none_or(|c| !DROPPED_POS_PREFIXES.contains(&c));
            let surface = token.surface.trim();
            if keep && surface.chars().any(char::is_alphanumeric) {
                terms.push(surface.to_lowercase());
            }
        }
        Ok(terms)
    }

    fn name(&self) -> &'static str {
        "korean"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particles_are_dropped() {
        let analyzer = KoreanAnalyzer::new().unwrap();
        let terms = analyzer.analyze("절도죄의 성립에는 불법영득의사가 필요하다").unwrap();
        assert!(terms.iter().any(|t| t.contains("절도")));
        assert!(!terms.iter().any(|t| t == "의" || t == "에는"));
    }
}
