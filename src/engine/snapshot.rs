//! Immutable, fully built index state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::Analyzer;
use crate::lexical::{Bm25Params, LexicalIndex};
use crate::store::DocumentStore;
use crate::vector::VectorIndex;

/// Document store plus both indexes, built together and served together.
///
/// Every ordinal in the store has a slot in the vector index; the lexical
/// index and the analyzer that produced its terms travel with it.
#[derive(Debug)]
pub struct IndexSnapshot {
    id: Uuid,
    built_at: DateTime<Utc>,
    store: DocumentStore,
    lexical: LexicalIndex,
    vectors: VectorIndex,
    analyzer: Arc<dyn Analyzer>,
    embedder_name: String,
}

impl IndexSnapshot {
    pub(crate) fn new(
        store: DocumentStore,
        lexical: LexicalIndex,
        vectors: VectorIndex,
        analyzer: Arc<dyn Analyzer>,
        embedder_name: impl Into<String>,
    ) -> Self {
        debug_assert_eq!(store.len(), vectors.len());
        Self {
            id: Uuid::new_v4(),
            built_at: Utc::now(),
            store,
            lexical,
            vectors,
            analyzer,
            embedder_name: embedder_name.into(),
        }
    }

    /// Snapshot with no documents; every search returns nothing.
    pub fn empty(analyzer: Arc<dyn Analyzer>, dimension: usize, embedder_name: &str) -> Self {
        let store = DocumentStore::new();
        let lexical = LexicalIndex::build(&store, Bm25Params::default());
        Self::new(
            store,
            lexical,
            VectorIndex::empty(dimension, 0),
            analyzer,
            embedder_name,
        )
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn lexical(&self) -> &LexicalIndex {
        &self.lexical
    }

    pub fn vectors(&self) -> &VectorIndex {
        &self.vectors
    }

    pub fn analyzer(&self) -> &Arc<dyn Analyzer> {
        &self.analyzer
    }

    pub fn embedder_name(&self) -> &str {
        &self.embedder_name
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            id: self.id,
            built_at: self.built_at,
            sources: self.store.source_count(),
            documents: self.store.len(),
            terms: self.lexical.term_count(),
            avg_doc_length: self.lexical.avg_doc_length(),
            embedded: self.vectors.embedded_count(),
            missing_embeddings: self.vectors.len() - self.vectors.embedded_count(),
            degraded_chunks: self
                .store
                .documents()
                .iter()
                .filter(|doc| doc.is_degraded_chunking())
                .count(),
            analyzer: self.analyzer.name().to_string(),
            embedder: self.embedder_name.clone(),
            dimension: self.vectors.dimension(),
        }
    }
}

/// Summary of a snapshot, for logs and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotStats {
    pub id: Uuid,
    pub built_at: DateTime<Utc>,
    /// Raw documents indexed.
    pub sources: usize,
    /// Chunks indexed.
    pub documents: usize,
    pub terms: usize,
    pub avg_doc_length: f32,
    pub embedded: usize,
    pub missing_embeddings: usize,
    pub degraded_chunks: usize,
    pub analyzer: String,
    pub embedder: String,
    pub dimension: usize,
}
