//! Normalized document storage.
//!
//! The [`DocumentStore`] owns every indexed chunk and addresses it by a dense
//! `u32` ordinal. Both indexes refer to documents by that ordinal, so the
//! lexical and semantic sides always agree on which document is which.

use std::collections::HashSet;

use ahash::AHashMap;
use log::{debug, warn};
use rayon::prelude::*;

use crate::analysis::Analyzer;
use crate::chunking::{ChunkingConfig, chunk_document};
use crate::data::{DEGRADED_CHUNKING_KEY, Document, MetadataValue, RawDocument, content_hash};
use crate::error::{JurisError, Result};

/// Separator between a raw document id and its chunk index.
pub const CHUNK_ID_SEPARATOR: char = '#';

/// Immutable, ordinal-addressed collection of indexed chunks.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: Vec<Document>,
    ordinals: AHashMap<String, u32>,
    /// Position of each document's id in lexicographic id order; used as the
    /// final deterministic tie-break.
    id_ranks: Vec<u32>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chunk and analyze raw documents into a store.
    ///
    /// Raw ids must be unique and must not contain [`CHUNK_ID_SEPARATOR`].
    /// A raw document that yields one chunk keeps its id; otherwise chunks
    /// are named `{id}#{n}`. Blank documents are skipped.
    pub fn from_raw(
        raw_documents: Vec<RawDocument>,
        analyzer: &dyn Analyzer,
        config: &ChunkingConfig,
    ) -> Result<Self> {
        let mut seen = HashSet::with_capacity(raw_documents.len());
        for raw in &raw_documents {
            if raw.id.contains(CHUNK_ID_SEPARATOR) {
                return Err(JurisError::invalid_argument(format!(
                    "document id '{}' contains '{CHUNK_ID_SEPARATOR}', which is reserved for chunk ids",
                    raw.id
                )));
            }
            if !seen.insert(raw.id.as_str()) {
                return Err(JurisError::invalid_argument(format!(
                    "duplicate document id '{}'",
                    raw.id
                )));
            }
        }

        let per_source: Vec<Vec<Document>> = raw_documents
            .par_iter()
            .map(|raw| Self::chunk_raw(raw, analyzer, config))
            .collect::<Result<_>>()?;

        Self::from_documents(per_source.into_iter().flatten().collect())
    }

    /// Build a store from already chunked documents.
    pub fn from_documents(documents: Vec<Document>) -> Result<Self> {
        if documents.len() > u32::MAX as usize {
            return Err(JurisError::invalid_argument(format!(
                "{} documents exceed the ordinal range",
                documents.len()
            )));
        }

        let mut ordinals = AHashMap::with_capacity(documents.len());
        for (ordinal, doc) in documents.iter().enumerate() {
            if ordinals.insert(doc.id.clone(), ordinal as u32).is_some() {
                return Err(JurisError::invalid_argument(format!(
                    "duplicate chunk id '{}'",
                    doc.id
                )));
            }
        }

        let mut by_id: Vec<u32> = (0..documents.len() as u32).collect();
        by_id.sort_by(|&a, &b| documents[a as usize].id.cmp(&documents[b as usize].id));
        let mut id_ranks = vec![0u32; documents.len()];
        for (rank, ordinal) in by_id.into_iter().enumerate() {
            id_ranks[ordinal as usize] = rank as u32;
        }

        Ok(Self {
            documents,
            ordinals,
            id_ranks,
        })
    }

    fn chunk_raw(
        raw: &RawDocument,
        analyzer: &dyn Analyzer,
        config: &ChunkingConfig,
    ) -> Result<Vec<Document>> {
        let output = chunk_document(raw.doc_type, &raw.text, config);
        if output.chunks.is_empty() {
            warn!("document '{}' has no text; skipped", raw.id);
            return Ok(Vec::new());
        }
        if output.degraded {
            warn!(
                "document '{}' ({}) could not be segmented; stored as a single chunk",
                raw.id, raw.doc_type
            );
        }

        let single = output.chunks.len() == 1;
        let mut documents = Vec::with_capacity(output.chunks.len());
        for (chunk_index, text) in output.chunks.into_iter().enumerate() {
            let tokens = analyzer.analyze(&text)?;
            let mut metadata = raw.metadata.clone();
            if output.degraded {
                metadata.insert(DEGRADED_CHUNKING_KEY.to_string(), MetadataValue::Bool(true));
            }
            let id = if single {
                raw.id.clone()
            } else {
                format!("{}{CHUNK_ID_SEPARATOR}{}", raw.id, chunk_index)
            };
            documents.push(Document {
                id,
                source_id: raw.id.clone(),
                chunk_index,
                doc_type: raw.doc_type,
                content_hash: content_hash(&text),
                text,
                tokens,
                metadata,
            });
        }
        debug!("document '{}' -> {} chunk(s)", raw.id, documents.len());
        Ok(documents)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, ordinal: u32) -> Option<&Document> {
        self.documents.get(ordinal as usize)
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Document> {
        self.ordinal_of(id).and_then(|ordinal| self.get(ordinal))
    }

    pub fn ordinal_of(&self, id: &str) -> Option<u32> {
        self.ordinals.get(id).copied()
    }

    pub fn id_ranks(&self) -> &[u32] {
        &self.id_ranks
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Iterate over `(ordinal, document)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Document)> {
        self.documents
            .iter()
            .enumerate()
            .map(|(ordinal, doc)| (ordinal as u32, doc))
    }

    /// Number of distinct raw documents in the store.
    pub fn source_count(&self) -> usize {
        self.documents
            .iter()
            .map(|doc| doc.source_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}
