//! Query intent classification.
//!
//! Decides, from the raw query text alone, whether the user is pointing at a
//! specific provision or case (an article reference) or asking a conceptual
//! question, and picks fusion weights accordingly. Classification is pure:
//! no I/O, and the same text always yields the same result.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{JurisError, Result};

lazy_static! {
    static ref CITATION_PATTERNS: Vec<Regex> = [
        // 제329조, 제10조의2, 제1항, 제2호
        r"제\s*\d+\s*(?:조(?:\s*의\s*\d+)?|항|호)",
        // Article 329, Art. 5, Section 12, Sec. 3
        r"(?i)\b(?:article|art\.|section|sec\.)\s*\d+",
        // § 12, §§ 3
        r"§+\s*\d+",
        // Korean case numbers: 2019도1234, 2020다12345, 2017헌바123
        r"(?:19|20)\d{2}[가-힣&&[^년월일]]{1,3}\d{1,7}",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();
}

/// The two query intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    /// The query cites a specific article, section, or case.
    ArticleReference,
    /// Anything else: a conceptual or natural-language question.
    SemanticQuestion,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::ArticleReference => "article_reference",
            QueryType::SemanticQuestion => "semantic_question",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relative weight of the lexical and semantic lists in rank fusion.
///
/// Both components are in `[0, 1]` and sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    pub lexical: f32,
    pub semantic: f32,
}

impl FusionWeights {
    /// Exact-term matching dominates for citation lookups.
    pub const ARTICLE_REFERENCE: FusionWeights = FusionWeights {
        lexical: 0.8,
        semantic: 0.2,
    };

    /// Meaning dominates for conceptual questions.
    pub const SEMANTIC_QUESTION: FusionWeights = FusionWeights {
        lexical: 0.3,
        semantic: 0.7,
    };

    /// Build weights from the lexical share; the semantic share is the rest.
    pub fn from_lexical(lexical: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&lexical) {
            return Err(JurisError::invalid_argument(format!(
                "lexical weight must be in [0, 1], got {lexical}"
            )));
        }
        Ok(Self {
            lexical,
            semantic: 1.0 - lexical,
        })
    }
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self::SEMANTIC_QUESTION
    }
}

/// Classifier settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Lexical share for article-reference queries.
    pub article_reference_lexical_weight: f32,
    /// Lexical share for semantic questions.
    pub semantic_question_lexical_weight: f32,
    /// Additional citation regexes, checked after the built-in set.
    pub extra_patterns: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            article_reference_lexical_weight: FusionWeights::ARTICLE_REFERENCE.lexical,
            semantic_question_lexical_weight: FusionWeights::SEMANTIC_QUESTION.lexical,
            extra_patterns: Vec::new(),
        }
    }
}

/// Outcome of classifying one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub query_type: QueryType,
    pub weights: FusionWeights,
    /// The citation text that triggered an article-reference decision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,
}

#[derive(Debug, Clone)]
pub struct QueryClassifier {
    extra_patterns: Vec<Regex>,
    article_reference: FusionWeights,
    semantic_question: FusionWeights,
}

impl QueryClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let article_reference =
            FusionWeights::from_lexical(config.article_reference_lexical_weight)
                .map_err(|e| JurisError::invalid_config(e.to_string()))?;
        let semantic_question =
            FusionWeights::from_lexical(config.semantic_question_lexical_weight)
                .map_err(|e| JurisError::invalid_config(e.to_string()))?;
        let extra_patterns = config
            .extra_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    JurisError::invalid_config(format!("invalid citation pattern '{p}': {e}"))
                })
            })
            .collect::<Result<_>>()?;

        Ok(Self {
            extra_patterns,
            article_reference,
            semantic_question,
        })
    }

    pub fn classify(&self, query: &str) -> Classification {
        let matched = CITATION_PATTERNS
            .iter()
            .chain(self.extra_patterns.iter())
            .find_map(|re| re.find(query))
            .map(|m| m.as_str().to_string());

        match matched {
            Some(citation) => Classification {
                query_type: QueryType::ArticleReference,
                weights: self.article_reference,
                matched: Some(citation),
            },
            None => Classification {
                query_type: QueryType::SemanticQuestion,
                weights: self.semantic_question,
                matched: None,
            },
        }
    }
}

impl Default for QueryClassifier {
    fn default() -> Self {
        Self {
            extra_patterns: Vec::new(),
            article_reference: FusionWeights::ARTICLE_REFERENCE,
            semantic_question: FusionWeights::SEMANTIC_QUESTION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(query: &str) -> Classification {
        QueryClassifier::default().classify(query)
    }

    #[test]
    fn test_citations_are_article_references() {
        for query in [
            "Article 329",
            "what does art. 5 say",
            "Section 12 of the act",
            "§ 1983 claims",
            "형법 제329조",
            "제10조의2 적용 범위",
            "제1항 해석",
            "2019도1234 판결",
            "대법원 2020다12345",
        ] {
            let c = classify(query);
            assert_eq!(c.query_type, QueryType::ArticleReference, "{query}");
            assert!(c.weights.lexical >= c.weights.semantic);
        }
    }

    #[test]
    fn test_questions_are_semantic() {
        for query in [
            "What are the elements of theft?",
            "절도죄의 성립요건은 무엇인가",
            "2019년 3월 판결",
            "articles of incorporation",
            "???",
            "",
        ] {
            let c = classify(query);
            assert_eq!(c.query_type, QueryType::SemanticQuestion, "{query}");
            assert_eq!(c.weights, FusionWeights::SEMANTIC_QUESTION);
            assert!(c.matched.is_none());
        }
    }

    #[test]
    fn test_matched_citation_is_reported() {
        assert_eq!(classify("형법 제329조 절도").matched.as_deref(), Some("제329조"));
    }

    #[test]
    fn test_weights_sum_to_one() {
        for lexical in [0.0, 0.1, 0.25, 0.3, 0.5, 0.8, 1.0] {
            let w = FusionWeights::from_lexical(lexical).unwrap();
            assert!((w.lexical + w.semantic - 1.0).abs() < 1e-6);
        }
        for w in [FusionWeights::ARTICLE_REFERENCE, FusionWeights::SEMANTIC_QUESTION] {
            assert!((w.lexical + w.semantic - 1.0).abs() < 1e-6);
        }
        assert!(FusionWeights::from_lexical(1.5).is_err());
        assert!(FusionWeights::from_lexical(f32::NAN).is_err());
    }

    #[test]
    fn test_config_overrides() {
        let classifier = QueryClassifier::new(&ClassifierConfig {
            article_reference_lexical_weight: 0.9,
            semantic_question_lexical_weight: 0.5,
            extra_patterns: vec![r"(?i)\bU\.S\.C\.".to_string()],
        })
        .unwrap();
        let c = classifier.classify("18 U.S.C. 1030");
        assert_eq!(c.query_type, QueryType::ArticleReference);
        assert_eq!(c.weights.lexical, 0.9);
        assert_eq!(
            classifier.classify("duty of care").weights,
            FusionWeights::from_lexical(0.5).unwrap()
        );
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let result = QueryClassifier::new(&ClassifierConfig {
            extra_patterns: vec!["(unclosed".to_string()],
            ..ClassifierConfig::default()
        });
        assert!(matches!(result, Err(JurisError::InvalidConfig(_))));
    }
}
