use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use juris::{
    Analyzer, Embedder, EmbeddingCache, EngineConfig, HashingEmbedder, IndexBuilder, RawDocument,
    Retriever, StandardAnalyzer,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::corpus;

/// Configuration file contents: the engine sections plus the CLI's choice of
/// analyzer and embedder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    #[serde(flatten)]
    pub engine: EngineConfig,
    pub analyzer: AnalyzerKind,
    pub embedder: EmbedderConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerKind {
    #[default]
    Standard,
    Korean,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedderKind {
    #[default]
    Hashing,
    #[serde(rename = "openai")]
    OpenAI,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedderConfig {
    pub kind: EmbedderKind,
    pub dimension: usize,
    /// Model name for remote embedders.
    pub model: String,
    /// Base URL of an OpenAI-compatible endpoint.
    pub base_url: Option<String>,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            kind: EmbedderKind::Hashing,
            dimension: 384,
            model: "text-embedding-3-small".to_string(),
            base_url: None,
        }
    }
}

/// Load the configuration file, or defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<CliConfig> {
    let Some(path) = path else {
        return Ok(CliConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: CliConfig = toml::from_str(&content).context("Failed to parse config TOML")?;
    config.engine.validate()?;
    Ok(config)
}

pub fn create_analyzer(kind: AnalyzerKind) -> Result<Arc<dyn Analyzer>> {
    match kind {
        AnalyzerKind::Standard => Ok(Arc::new(StandardAnalyzer::new())),
        #[cfg(feature = "lang-ko")]
        AnalyzerKind::Korean => Ok(Arc::new(juris::KoreanAnalyzer::new()?)),
        #[cfg(not(feature = "lang-ko"))]
        AnalyzerKind::Korean => bail!("the Korean analyzer requires the 'lang-ko' feature"),
    }
}

pub fn create_embedder(config: &EmbedderConfig) -> Result<Arc<dyn Embedder>> {
    match config.kind {
        EmbedderKind::Hashing => Ok(Arc::new(HashingEmbedder::new(config.dimension)?)),
        #[cfg(feature = "embeddings-openai")]
        EmbedderKind::OpenAI => {
            let mut embedder = juris::OpenAIEmbedder::new(&config.model, config.dimension)?;
            if let Some(base_url) = &config.base_url {
                embedder = embedder.base_url(base_url);
            }
            match std::env::var("OPENAI_API_KEY") {
                Ok(key) => embedder = embedder.api_key(key),
                Err(_) => {
                    tracing::warn!("OPENAI_API_KEY is not set; sending unauthenticated requests")
                }
            }
            Ok(Arc::new(embedder))
        }
        #[cfg(not(feature = "embeddings-openai"))]
        EmbedderKind::OpenAI => {
            bail!("the OpenAI embedder requires the 'embeddings-openai' feature")
        }
    }
}

/// Create an index builder, seeded from `cache` if the file exists.
pub fn create_builder(config: &CliConfig, cache: Option<&Path>) -> Result<IndexBuilder> {
    let analyzer = create_analyzer(config.analyzer)?;
    let embedder = create_embedder(&config.embedder)?;
    let mut builder = IndexBuilder::from_config(analyzer, embedder, &config.engine);
    if let Some(path) = cache {
        let embedder = builder.embedder();
        let cache = EmbeddingCache::load_or_new(path, embedder.name(), embedder.dimension())
            .with_context(|| format!("Failed to load embedding cache {}", path.display()))?;
        info!("loaded {} cached embeddings from {}", cache.len(), path.display());
        builder = builder.with_cache(cache);
    }
    Ok(builder)
}

/// Read a corpus and build a retriever over it.
pub async fn open_retriever(
    config: &CliConfig,
    corpus_path: &Path,
    cache: Option<&Path>,
) -> Result<Retriever> {
    let documents = read_corpus(corpus_path)?;
    let builder = create_builder(config, cache)?;
    let retriever = Retriever::from_documents(&builder, documents, &config.engine).await?;
    if let Some(path) = cache {
        builder.save_cache(path)?;
    }
    Ok(retriever)
}

pub fn read_corpus(path: &Path) -> Result<Vec<RawDocument>> {
    let documents = corpus::read(path)?;
    if documents.is_empty() {
        warn!("corpus {} contains no documents; every search will be empty", path.display());
        return Ok(documents);
    }
    info!("read {} documents from {}", documents.len(), path.display());
    Ok(documents)
}
