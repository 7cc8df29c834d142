//! Hybrid retrieval.
//!
//! The [`Retriever`] serves queries against the current [`IndexSnapshot`].
//! Each query is classified, run through the lexical and semantic branches
//! concurrently, and the two candidate lists are merged with weighted rank
//! fusion. A failing embedding service never fails a query: the response is
//! flagged `semantic_degraded` and ranked from lexical results alone.

pub mod builder;
pub mod config;
pub mod filter;
pub mod fusion;
pub mod search;
pub mod snapshot;
pub mod snippet;

use std::sync::Arc;

use bit_vec::BitVec;
use log::{debug, error, info, warn};
use parking_lot::RwLock;

use crate::classifier::{Classification, QueryClassifier};
use crate::data::RawDocument;
use crate::embedding::Embedder;
use crate::error::{JurisError, Result};
use crate::lexical::LexicalSearchRequest;

use self::builder::IndexBuilder;
use self::config::{EngineConfig, RetrieverConfig};
use self::fusion::{FusedHit, fuse};
use self::search::{RankedResult, SearchRequest, SearchResponse, SourceRanks};
use self::snapshot::{IndexSnapshot, SnapshotStats};
use self::snippet::{prefix_snippet, term_snippet};

/// Query front end over an atomically swappable index snapshot.
///
/// Readers clone the snapshot `Arc` and keep using it for the whole query,
/// so a concurrent rebuild never exposes a partial index.
#[derive(Debug)]
pub struct Retriever {
    snapshot: RwLock<Arc<IndexSnapshot>>,
    embedder: Arc<dyn Embedder>,
    classifier: QueryClassifier,
    config: RetrieverConfig,
}

impl Retriever {
    /// Create a retriever with the default classifier and settings.
    pub fn new(snapshot: IndexSnapshot, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(snapshot)),
            embedder,
            classifier: QueryClassifier::default(),
            config: RetrieverConfig::default(),
        }
    }

    pub fn with_config(
        snapshot: IndexSnapshot,
        embedder: Arc<dyn Embedder>,
        config: &EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            snapshot: RwLock::new(Arc::new(snapshot)),
            embedder,
            classifier: QueryClassifier::new(&config.classifier)?,
            config: config.retriever.clone(),
        })
    }

    /// Build a snapshot from `raw_documents` and serve it.
    pub async fn from_documents(
        builder: &IndexBuilder,
        raw_documents: Vec<RawDocument>,
        config: &EngineConfig,
    ) -> Result<Self> {
        let snapshot = builder.build(raw_documents).await?;
        Self::with_config(snapshot, Arc::clone(builder.embedder()), config)
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// The snapshot currently served.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.snapshot.read().clone()
    }

    pub fn stats(&self) -> SnapshotStats {
        self.snapshot().stats()
    }

    /// Replace the served snapshot and return the previous one.
    pub fn swap_snapshot(&self, snapshot: IndexSnapshot) -> Arc<IndexSnapshot> {
        let next = Arc::new(snapshot);
        std::mem::replace(&mut *self.snapshot.write(), next)
    }

    /// Build a new snapshot and swap it in.
    ///
    /// On failure the current snapshot keeps serving and the error is
    /// returned.
    pub async fn rebuild(
        &self,
        builder: &IndexBuilder,
        raw_documents: Vec<RawDocument>,
    ) -> Result<SnapshotStats> {
        match builder.build(raw_documents).await {
            Ok(snapshot) => {
                let stats = snapshot.stats();
                let previous = self.swap_snapshot(snapshot);
                info!("swapped snapshot {} -> {}", previous.id(), stats.id);
                Ok(stats)
            }
            Err(e) => {
                error!(
                    "rebuild failed, still serving snapshot {}: {e}",
                    self.snapshot().id()
                );
                Err(e)
            }
        }
    }

    pub fn classify(&self, query: &str) -> Classification {
        self.classifier.classify(query)
    }

    pub async fn search_text(&self, query: &str, top_k: usize) -> Result<SearchResponse> {
        self.search(SearchRequest::builder(query).top_k(top_k).build())
            .await
    }

    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        let top_k = request.top_k;
        if top_k == 0 || top_k > self.config.max_top_k {
            return Err(JurisError::invalid_argument(format!(
                "top_k must be between 1 and {}, got {top_k}",
                self.config.max_top_k
            )));
        }

        let classification = self.classifier.classify(&request.query);
        let mut response =
            SearchResponse::empty(classification.query_type, classification.weights);

        let snapshot = self.snapshot();
        if snapshot.is_empty() {
            debug!("search on empty snapshot {}", snapshot.id());
            return Ok(response);
        }

        let terms = match snapshot.analyzer().analyze(&request.query) {
            Ok(terms) if terms.is_empty() => {
                debug!("query {:?} has no searchable terms", request.query);
                return Ok(response);
            }
            Ok(terms) => Some(terms),
            Err(e) => {
                warn!("query analysis failed, ranking by semantic results only: {e}");
                None
            }
        };
        response.lexical_degraded = terms.is_none();

        let allowed: Option<BitVec> = request
            .filter
            .as_ref()
            .filter(|f| !f.is_empty())
            .map(|f| f.allowed_ordinals(snapshot.store()));
        let pool = self.config.candidate_pool.max(top_k);

        let lexical_branch = async {
            let Some(terms) = terms.as_deref() else {
                return Vec::new();
            };
            let request = LexicalSearchRequest::new(terms, pool).allowed(allowed.as_ref());
            snapshot
                .lexical()
                .search(&request, snapshot.store().id_ranks())
                .into_iter()
                .map(|hit| (hit.ordinal, hit.score))
                .collect::<Vec<_>>()
        };
        let semantic_branch =
            self.semantic_candidates(&snapshot, &request.query, pool, allowed.as_ref());

        let (semantic, lexical) = tokio::join!(semantic_branch, lexical_branch);
        let semantic = semantic.unwrap_or_else(|e| {
            warn!("semantic search unavailable, ranking by lexical results only: {e}");
            response.semantic_degraded = true;
            Vec::new()
        });

        debug!(
            "query {:?}: {} ({:?}), {} lexical / {} semantic candidates",
            request.query,
            classification.query_type,
            classification.weights,
            lexical.len(),
            semantic.len()
        );

        let fused = fuse(
            &lexical,
            &semantic,
            classification.weights,
            self.config.fusion,
            snapshot.store().id_ranks(),
            top_k,
        );
        let snippet_terms = terms
            .as_deref()
            .map(|terms| snippet_terms(&snapshot, terms))
            .unwrap_or_default();
        response.results = self.assemble(&snapshot, fused, &snippet_terms);
        Ok(response)
    }

    async fn semantic_candidates(
        &self,
        snapshot: &IndexSnapshot,
        query: &str,
        limit: usize,
        allowed: Option<&BitVec>,
    ) -> Result<Vec<(u32, f32)>> {
        let vectors = snapshot.vectors();
        if vectors.embedded_count() == 0 {
            return Err(JurisError::embedding("snapshot holds no embeddings"));
        }
        if snapshot.embedder_name() != self.embedder.name()
            || vectors.dimension() != self.embedder.dimension()
        {
            return Err(JurisError::embedding(format!(
                "query embedder {} ({}d) does not match index embedder {} ({}d)",
                self.embedder.name(),
                self.embedder.dimension(),
                snapshot.embedder_name(),
                vectors.dimension()
            )));
        }

        let timeout = self.config.embed_timeout();
        let query_vector = tokio::time::timeout(timeout, self.embedder.embed_query(query))
            .await
            .map_err(|_| JurisError::EmbeddingTimeout(timeout))??;

        let hits = vectors.search(&query_vector, limit, allowed, snapshot.store().id_ranks())?;
        Ok(hits
            .into_iter()
            .map(|hit| (hit.ordinal, hit.similarity))
            .collect())
    }

    fn assemble(
        &self,
        snapshot: &IndexSnapshot,
        fused: Vec<FusedHit>,
        snippet_terms: &[String],
    ) -> Vec<RankedResult> {
        let max_chars = self.config.snippet_chars;
        fused
            .into_iter()
            .filter_map(|hit| {
                let doc = snapshot.store().get(hit.ordinal)?;
                let snippet = if hit.lexical_dominant() {
                    term_snippet(&doc.text, snippet_terms, max_chars)
                } else {
                    prefix_snippet(&doc.text, max_chars)
                };
                Some((hit, doc, snippet))
            })
            .enumerate()
            .map(|(i, (hit, doc, snippet))| RankedResult {
                document_id: doc.id.clone(),
                source_id: doc.source_id.clone(),
                doc_type: doc.doc_type,
                rank: i + 1,
                fused_score: hit.score as f32,
                snippet,
                source: SourceRanks {
                    lexical_rank: hit.lexical_rank,
                    semantic_rank: hit.semantic_rank,
                },
                metadata: doc.metadata.clone(),
            })
            .collect()
    }
}

/// Distinct query terms present in the index, highest IDF first.
fn snippet_terms(snapshot: &IndexSnapshot, terms: &[String]) -> Vec<String> {
    let lexical = snapshot.lexical();
    let mut distinct: Vec<(f32, &String)> = terms
        .iter()
        .filter(|t| lexical.doc_freq(t) > 0)
        .map(|t| (lexical.idf(t), t))
        .collect();
    distinct.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    distinct.dedup_by(|a, b| a.1 == b.1);
    distinct.into_iter().map(|(_, t)| t.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StandardAnalyzer;
    use crate::data::DocumentType;
    use crate::embedding::HashingEmbedder;

    async fn retriever(docs: Vec<RawDocument>) -> Retriever {
        let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(256).unwrap());
        let builder = IndexBuilder::new(Arc::new(StandardAnalyzer::new()), embedder);
        Retriever::from_documents(&builder, docs, &EngineConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_top_k_validation() {
        let retriever = retriever(vec![RawDocument::new(
            "a",
            DocumentType::Precedent,
            "Theft.",
        )])
        .await;
        for top_k in [0, 51] {
            let err = retriever.search_text("theft", top_k).await.unwrap_err();
            assert!(matches!(err, JurisError::InvalidArgument(_)));
        }
        assert!(retriever.search_text("theft", 50).await.is_ok());
    }

    #[tokio::test]
    async fn test_empty_snapshot_returns_nothing() {
        let retriever = retriever(Vec::new()).await;
        let response = retriever.search_text("theft", 5).await.unwrap();
        assert!(response.results.is_empty());
        assert!(!response.is_degraded());
    }

    #[tokio::test]
    async fn test_swap_snapshot() {
        let retriever = retriever(vec![RawDocument::new(
            "a",
            DocumentType::Precedent,
            "Theft.",
        )])
        .await;
        let before = retriever.snapshot().id();
        let empty = IndexSnapshot::empty(Arc::new(StandardAnalyzer::new()), 256, "none");
        let previous = retriever.swap_snapshot(empty);
        assert_eq!(previous.id(), before);
        assert!(retriever.snapshot().is_empty());
    }

    #[test]
    fn test_snippet_terms_by_idf() {
        let store = crate::store::DocumentStore::from_raw(
            vec![
                RawDocument::new("a", DocumentType::Precedent, "theft intent"),
                RawDocument::new("b", DocumentType::Precedent, "intent"),
            ],
            &StandardAnalyzer::new(),
            &crate::chunking::ChunkingConfig::default(),
        )
        .unwrap();
        let lexical = crate::lexical::LexicalIndex::build(&store, Default::default());
        let vectors = crate::vector::VectorIndex::empty(4, store.len());
        let snapshot = IndexSnapshot::new(
            store,
            lexical,
            vectors,
            Arc::new(StandardAnalyzer::new()),
            "none",
        );
        let terms: Vec<String> = ["intent", "arson", "theft", "intent"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(snippet_terms(&snapshot, &terms), vec!["theft", "intent"]);
    }
}
