//! Search request and response types.

use serde::{Deserialize, Serialize};

use crate::classifier::{FusionWeights, QueryType};
use crate::data::{DocumentType, Metadata};
use crate::engine::filter::SearchFilter;

/// Default number of results.
pub const DEFAULT_TOP_K: usize = 10;

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

/// A hybrid search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Raw query text.
    pub query: String,

    /// Maximum number of results to return.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Restricts the candidate documents of both branches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<SearchFilter>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: DEFAULT_TOP_K,
            filter: None,
        }
    }

    pub fn builder(query: impl Into<String>) -> SearchRequestBuilder {
        SearchRequestBuilder::new(query)
    }
}

/// Builder for [`SearchRequest`].
#[derive(Debug, Clone)]
pub struct SearchRequestBuilder {
    request: SearchRequest,
}

impl SearchRequestBuilder {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            request: SearchRequest::new(query),
        }
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.request.top_k = top_k;
        self
    }

    pub fn filter(mut self, filter: SearchFilter) -> Self {
        self.request.filter = Some(filter);
        self
    }

    pub fn build(self) -> SearchRequest {
        self.request
    }
}

/// Ranks of a result in each source list (1-based).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRanks {
    pub lexical_rank: Option<usize>,
    pub semantic_rank: Option<usize>,
}

/// One fused result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub document_id: String,
    /// Id of the raw document the chunk came from.
    pub source_id: String,
    pub doc_type: DocumentType,
    /// 1-based position in the response.
    pub rank: usize,
    pub fused_score: f32,
    pub snippet: String,
    pub source: SourceRanks,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Response of a hybrid search.
///
/// `semantic_degraded` is set when the embedding service failed or timed out
/// and ranking fell back to lexical results only. `lexical_degraded` is set
/// when query analysis failed and only semantic results were used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<RankedResult>,
    pub classified_type: QueryType,
    pub weights: FusionWeights,
    pub semantic_degraded: bool,
    pub lexical_degraded: bool,
}

impl SearchResponse {
    pub(crate) fn empty(classified_type: QueryType, weights: FusionWeights) -> Self {
        Self {
            results: Vec::new(),
            classified_type,
            weights,
            semantic_degraded: false,
            lexical_degraded: false,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.semantic_degraded || self.lexical_degraded
    }

    pub fn ids(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.document_id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_from_json() {
        let request: SearchRequest = serde_json::from_str(r#"{"query": "절도죄 성립요건"}"#).unwrap();
        assert_eq!(request.top_k, DEFAULT_TOP_K);
        assert!(request.filter.is_none());
    }

    #[test]
    fn test_builder() {
        let request = SearchRequest::builder("Article 329")
            .top_k(3)
            .filter(SearchFilter::new().doc_type(DocumentType::Statute))
            .build();
        assert_eq!(request.query, "Article 329");
        assert_eq!(request.top_k, 3);
        assert_eq!(
            request.filter.map(|f| f.doc_types),
            Some(vec![DocumentType::Statute])
        );
    }
}
