//! Index construction.
//!
//! Turns a batch of raw documents into an [`IndexSnapshot`]: chunking and
//! BM25 indexing run on the blocking pool, embeddings are requested in
//! batches with bounded concurrency, and unchanged chunks reuse vectors from
//! the [`EmbeddingCache`].

use std::collections::HashSet;
use std::path::Path;
use std::pin::pin;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::analysis::Analyzer;
use crate::chunking::ChunkingConfig;
use crate::data::RawDocument;
use crate::embedding::Embedder;
use crate::engine::config::{BuildConfig, EmbeddingFailurePolicy, EngineConfig};
use crate::engine::snapshot::IndexSnapshot;
use crate::error::{JurisError, Result};
use crate::lexical::{Bm25Params, LexicalIndex};
use crate::store::DocumentStore;
use crate::vector::{EmbeddingCache, VectorIndex};

/// Counters from one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub documents: usize,
    /// Chunks sent to the embedder.
    pub embedded: usize,
    /// Chunks whose vector came from the cache.
    pub reused: usize,
    /// Chunks left without a vector after an embedding failure.
    pub skipped: usize,
    pub elapsed_ms: u64,
}

/// Builds index snapshots with a fixed analyzer and embedder.
///
/// The builder owns the embedding cache, so consecutive builds from the same
/// builder only embed new or changed chunks.
#[derive(Debug)]
pub struct IndexBuilder {
    analyzer: Arc<dyn Analyzer>,
    embedder: Arc<dyn Embedder>,
    chunking: ChunkingConfig,
    bm25: Bm25Params,
    build: BuildConfig,
    cache: Mutex<EmbeddingCache>,
}

impl IndexBuilder {
    pub fn new(analyzer: Arc<dyn Analyzer>, embedder: Arc<dyn Embedder>) -> Self {
        let cache = EmbeddingCache::new(embedder.name(), embedder.dimension());
        Self {
            analyzer,
            embedder,
            chunking: ChunkingConfig::default(),
            bm25: Bm25Params::default(),
            build: BuildConfig::default(),
            cache: Mutex::new(cache),
        }
    }

    pub fn from_config(
        analyzer: Arc<dyn Analyzer>,
        embedder: Arc<dyn Embedder>,
        config: &EngineConfig,
    ) -> Self {
        Self::new(analyzer, embedder)
            .chunking(config.chunking.clone())
            .bm25(config.bm25)
            .build_config(config.build.clone())
    }

    pub fn chunking(mut self, chunking: ChunkingConfig) -> Self {
        self.chunking = chunking;
        self
    }

    pub fn bm25(mut self, bm25: Bm25Params) -> Self {
        self.bm25 = bm25;
        self
    }

    pub fn build_config(mut self, build: BuildConfig) -> Self {
        self.build = build;
        self
    }

    /// Seed the embedding cache. A cache from another model is discarded.
    pub fn with_cache(self, cache: EmbeddingCache) -> Self {
        if cache.is_compatible(self.embedder.name(), self.embedder.dimension()) {
            *self.cache.lock() = cache;
        } else {
            warn!(
                "ignoring embedding cache for {} ({}d); embedder is {} ({}d)",
                cache.model(),
                cache.dimension(),
                self.embedder.name(),
                self.embedder.dimension()
            );
        }
        self
    }

    pub fn analyzer(&self) -> &Arc<dyn Analyzer> {
        &self.analyzer
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    pub fn cached_embeddings(&self) -> usize {
        self.cache.lock().len()
    }

    /// Persist the embedding cache.
    pub fn save_cache(&self, path: &Path) -> Result<()> {
        self.cache.lock().save(path)
    }

    pub async fn build(&self, raw_documents: Vec<RawDocument>) -> Result<IndexSnapshot> {
        Ok(self.build_with_report(raw_documents).await?.0)
    }

    pub async fn build_with_report(
        &self,
        raw_documents: Vec<RawDocument>,
    ) -> Result<(IndexSnapshot, BuildReport)> {
        let start = Instant::now();
        self.chunking.validate()?;
        self.bm25.validate()?;
        self.build.validate()?;

        let analyzer = Arc::clone(&self.analyzer);
        let chunking = self.chunking.clone();
        let bm25 = self.bm25;
        let (store, lexical) = tokio::task::spawn_blocking(move || -> Result<_> {
            let store = DocumentStore::from_raw(raw_documents, analyzer.as_ref(), &chunking)?;
            let lexical = LexicalIndex::build(&store, bm25);
            Ok((store, lexical))
        })
        .await
        .map_err(|e| JurisError::internal(format!("index build task failed: {e}")))??;

        let mut report = BuildReport {
            documents: store.len(),
            ..BuildReport::default()
        };
        let vectors = self.embed_store(&store, &mut report).await?;

        let snapshot = IndexSnapshot::new(
            store,
            lexical,
            vectors,
            Arc::clone(&self.analyzer),
            self.embedder.name(),
        );
        report.elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            "built snapshot {}: {} chunks, {} embedded, {} reused, {} skipped in {}ms",
            snapshot.id(),
            report.documents,
            report.embedded,
            report.reused,
            report.skipped,
            report.elapsed_ms
        );
        Ok((snapshot, report))
    }

    async fn embed_store(
        &self,
        store: &DocumentStore,
        report: &mut BuildReport,
    ) -> Result<VectorIndex> {
        let dimension = self.embedder.dimension();
        let mut slots: Vec<Option<Vec<f32>>> = vec![None; store.len()];
        let mut pending: Vec<u32> = Vec::new();
        {
            let cache = self.cache.lock();
            for (ordinal, doc) in store.iter() {
                match cache.get(&doc.id, &doc.content_hash) {
                    Some(vector) => slots[ordinal as usize] = Some(vector.to_vec()),
                    None => pending.push(ordinal),
                }
            }
        }
        report.reused = store.len() - pending.len();

        let embedder = &self.embedder;
        let mut batches = pin!(stream::iter(
            pending.chunks(self.build.batch_size).map(<[u32]>::to_vec),
        )
        .map(|batch| {
            let texts: Vec<String> = batch
                .iter()
                .filter_map(|&ordinal| store.get(ordinal).map(|doc| doc.text.clone()))
                .collect();
            async move {
                let result = embedder.embed(&texts).await;
                (batch, result)
            }
        })
        .buffered(self.build.embed_concurrency));

        // Returning early drops the stream, so no further batch is sent.
        while let Some((batch, result)) = batches.next().await {
            let vectors =
                match result.and_then(|vectors| check_batch(vectors, batch.len(), dimension)) {
                    Ok(vectors) => vectors,
                    Err(e) => match self.build.on_embedding_failure {
                        EmbeddingFailurePolicy::Abort => {
                            return Err(JurisError::index_build(format!(
                                "embedding {} chunks failed: {e}",
                                batch.len()
                            )));
                        }
                        EmbeddingFailurePolicy::SkipDocument => {
                            warn!(
                                "embedding {} chunks failed, indexing them lexically only: {e}",
                                batch.len()
                            );
                            report.skipped += batch.len();
                            continue;
                        }
                    },
                };

            let mut cache = self.cache.lock();
            for (ordinal, vector) in batch.into_iter().zip(vectors) {
                if let Some(doc) = store.get(ordinal) {
                    cache.insert(doc.id.clone(), doc.content_hash.clone(), vector.clone());
                }
                slots[ordinal as usize] = Some(vector);
                report.embedded += 1;
            }
        }

        let live: HashSet<&str> = store.iter().map(|(_, doc)| doc.id.as_str()).collect();
        let pruned = self.cache.lock().retain_ids(&live);
        if pruned > 0 {
            debug!("dropped {pruned} stale cache entries");
        }

        VectorIndex::from_slots(dimension, slots)
    }
}

fn check_batch(vectors: Vec<Vec<f32>>, expected: usize, dimension: usize) -> Result<Vec<Vec<f32>>> {
    if vectors.len() != expected {
        return Err(JurisError::embedding(format!(
            "expected {expected} vectors, got {}",
            vectors.len()
        )));
    }
    if let Some(bad) = vectors
        .iter()
        .find(|v| v.len() != dimension || v.iter().any(|x| !x.is_finite()))
    {
        return Err(JurisError::embedding(format!(
            "malformed vector of dimension {} (expected {dimension})",
            bad.len()
        )));
    }
    Ok(vectors)
}
