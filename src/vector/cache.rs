//! Embedding cache.
//!
//! Maps a document id to the content hash its vector was computed from. A
//! rebuild reuses the vector when the hash is unchanged, so only new or edited
//! chunks go to the embedder. The cache is tagged with the embedder name and
//! dimension; vectors from a different model are never reused.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;

const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CacheEntry {
    content_hash: String,
    vector: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingCache {
    version: u32,
    model: String,
    dimension: usize,
    entries: HashMap<String, CacheEntry>,
}

impl EmbeddingCache {
    pub fn new(model: impl Into<String>, dimension: usize) -> Self {
        Self {
            version: CACHE_VERSION,
            model: model.into(),
            dimension,
            entries: HashMap::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if vectors in this cache came from the given model.
    pub fn is_compatible(&self, model: &str, dimension: usize) -> bool {
        self.model == model && self.dimension == dimension
    }

    /// Cached vector for `id`, if it was computed from `content_hash`.
    pub fn get(&self, id: &str, content_hash: &str) -> Option<&[f32]> {
        self.entries
            .get(id)
            .filter(|entry| entry.content_hash == content_hash)
            .map(|entry| entry.vector.as_slice())
    }

    pub fn insert(
        &mut self,
        id: impl Into<String>,
        content_hash: impl Into<String>,
        vector: Vec<f32>,
    ) {
        self.entries.insert(
            id.into(),
            CacheEntry {
                content_hash: content_hash.into(),
                vector,
            },
        );
    }

    /// Drop entries whose id is not in `live_ids`. Returns the number removed.
    pub fn retain_ids(&mut self, live_ids: &HashSet<&str>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, _| live_ids.contains(id.as_str()));
        before - self.entries.len()
    }

    /// Load a cache file, or start empty when it is missing or belongs to
    /// another model.
    pub fn load_or_new(path: &Path, model: &str, dimension: usize) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new(model, dimension));
        }
        let cache = Self::load(path)?;
        if cache.version != CACHE_VERSION || !cache.is_compatible(model, dimension) {
            warn!(
                "embedding cache {} was built by {} ({}d, v{}); starting empty",
                path.display(),
                cache.model,
                cache.dimension,
                cache.version
            );
            return Ok(Self::new(model, dimension));
        }
        info!("loaded {} cached embeddings from {}", cache.len(), path.display());
        Ok(cache)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Write the cache atomically through a temporary sibling file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            serde_json::to_writer(&mut writer, self)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp_path, path)?;
        debug!("saved {} embeddings to {}", self.len(), path.display());
        Ok(())
    }
}
