//! # Juris
//!
//! Hybrid lexical and semantic retrieval for legal text corpora.
//!
//! ## Features
//!
//! - Document-type aware chunking (precedents, statutes, rulings)
//! - BM25 lexical search
//! - Embedding-based semantic search with a pluggable embedder
//! - Citation-aware query classification
//! - Weighted Reciprocal Rank Fusion
//! - Lexical-only fallback when the embedding service is unavailable
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use juris::{
//!     DocumentType, EngineConfig, HashingEmbedder, IndexBuilder, RawDocument, Retriever,
//!     StandardAnalyzer,
//! };
//!
//! # async fn run() -> juris::Result<()> {
//! let embedder = Arc::new(HashingEmbedder::new(256)?);
//! let builder = IndexBuilder::new(Arc::new(StandardAnalyzer::new()), embedder);
//! let docs = vec![RawDocument::new(
//!     "prec-1",
//!     DocumentType::Precedent,
//!     "Theft requires intent to permanently deprive the owner.",
//! )];
//! let retriever = Retriever::from_documents(&builder, docs, &EngineConfig::default()).await?;
//!
//! let response = retriever.search_text("What are the elements of theft?", 5).await?;
//! for result in &response.results {
//!     println!("{} {} {}", result.rank, result.document_id, result.snippet);
//! }
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod chunking;
pub mod classifier;
mod data;
pub mod embedding;
mod engine;
mod error;
pub mod lexical;
pub mod store;
pub mod vector;

// Re-exports for the public API
pub use analysis::{Analyzer, StandardAnalyzer};
#[cfg(feature = "lang-ko")]
pub use analysis::KoreanAnalyzer;
pub use chunking::{ChunkOutput, ChunkingConfig, chunk_document};
pub use classifier::{
    Classification, ClassifierConfig, FusionWeights, QueryClassifier, QueryType,
};
pub use data::{
    DECISION_DATE_KEY, DEGRADED_CHUNKING_KEY, Document, DocumentType, Metadata, MetadataValue,
    RawDocument, content_hash,
};
pub use embedding::{Embedder, HashingEmbedder};
#[cfg(feature = "embeddings-openai")]
pub use embedding::OpenAIEmbedder;
pub use engine::Retriever;
pub use engine::builder::{BuildReport, IndexBuilder};
pub use engine::config::{BuildConfig, EmbeddingFailurePolicy, EngineConfig, RetrieverConfig};
pub use engine::filter::SearchFilter;
pub use engine::fusion::{DEFAULT_RRF_K, FusionAlgorithm};
pub use engine::search::{
    DEFAULT_TOP_K, RankedResult, SearchRequest, SearchRequestBuilder, SearchResponse, SourceRanks,
};
pub use engine::snapshot::{IndexSnapshot, SnapshotStats};
pub use error::{JurisError, Result};
pub use store::DocumentStore;
pub use vector::EmbeddingCache;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
