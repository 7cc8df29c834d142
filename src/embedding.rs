//! Text embedding.
//!
//! The retrieval core treats the embedding model as an opaque
//! `text -> vector` function behind the [`Embedder`] trait. Calls are async
//! and batched; any failure is reported as
//! [`JurisError::EmbeddingUnavailable`] so the retriever can degrade to
//! lexical-only ranking.

pub mod hashing;
#[cfg(feature = "embeddings-openai")]
pub mod openai;

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::{JurisError, Result};

pub use self::hashing::HashingEmbedder;
#[cfg(feature = "embeddings-openai")]
pub use self::openai::OpenAIEmbedder;

/// Maps texts to fixed-dimension vectors.
#[async_trait]
pub trait Embedder: Send + Sync + Debug {
    /// Embed a batch of texts. The output has one vector per input, in order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query text.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| JurisError::embedding(format!("{} returned no vector", self.name())))
    }

    /// Output dimension.
    fn dimension(&self) -> usize;

    /// Model identifier, recorded in snapshots and embedding caches.
    fn name(&self) -> &str;
}
