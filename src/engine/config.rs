use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chunking::ChunkingConfig;
use crate::classifier::ClassifierConfig;
use crate::engine::fusion::FusionAlgorithm;
use crate::error::{JurisError, Result};
use crate::lexical::Bm25Params;

/// Complete engine configuration.
///
/// Every section has defaults, so a configuration file only needs the values
/// it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub chunking: ChunkingConfig,
    pub bm25: Bm25Params,
    pub classifier: ClassifierConfig,
    pub build: BuildConfig,
    pub retriever: RetrieverConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        self.bm25.validate()?;
        self.build.validate()?;
        self.retriever.validate()
    }
}

/// What a build does when the embedder fails on a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingFailurePolicy {
    /// Fail the build; the previous snapshot keeps serving.
    #[default]
    Abort,
    /// Leave the affected documents without an embedding. They remain
    /// searchable lexically.
    SkipDocument,
}

/// Index build settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Texts per embedder call.
    pub batch_size: usize,
    /// Embedder calls in flight at once.
    pub embed_concurrency: usize,
    pub on_embedding_failure: EmbeddingFailurePolicy,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            embed_concurrency: 4,
            on_embedding_failure: EmbeddingFailurePolicy::Abort,
        }
    }
}

impl BuildConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(JurisError::invalid_config("build.batch_size must be > 0"));
        }
        if self.embed_concurrency == 0 {
            return Err(JurisError::invalid_config(
                "build.embed_concurrency must be > 0",
            ));
        }
        Ok(())
    }
}

/// Query-time settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    pub fusion: FusionAlgorithm,
    /// Candidates taken from each branch before fusion. Raised to `top_k`
    /// when a request asks for more.
    pub candidate_pool: usize,
    /// Largest accepted `top_k`.
    pub max_top_k: usize,
    /// Deadline for embedding the query.
    pub embed_timeout_ms: u64,
    /// Maximum snippet length in characters.
    pub snippet_chars: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            fusion: FusionAlgorithm::default(),
            candidate_pool: 20,
            max_top_k: 50,
            embed_timeout_ms: 3_000,
            snippet_chars: 200,
        }
    }
}

impl RetrieverConfig {
    pub fn embed_timeout(&self) -> Duration {
        Duration::from_millis(self.embed_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.candidate_pool == 0 {
            return Err(JurisError::invalid_config(
                "retriever.candidate_pool must be > 0",
            ));
        }
        if self.max_top_k == 0 {
            return Err(JurisError::invalid_config("retriever.max_top_k must be > 0"));
        }
        if self.embed_timeout_ms == 0 {
            return Err(JurisError::invalid_config(
                "retriever.embed_timeout_ms must be > 0",
            ));
        }
        if let FusionAlgorithm::RRF { k } = self.fusion
            && !(k.is_finite() && k > 0.0)
        {
            return Err(JurisError::invalid_config(format!(
                "retriever.fusion.k must be a positive number, got {k}"
            )));
        }
        Ok(())
    }
}
