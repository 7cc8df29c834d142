//! Type-dependent segmentation of raw documents into retrieval chunks.
//!
//! Each [`DocumentType`] maps to one pure chunking function:
//!
//! - **precedent**: sentence packing without overlap ([`sentence`])
//! - **statute**: one chunk per article, never split ([`article`])
//! - **administrative ruling / interpretation**: recursive boundary splitting
//!   with overlap ([`recursive`])
//!
//! A document that cannot be segmented under its rule comes back as a single
//! chunk with [`ChunkOutput::degraded`] set.

pub mod article;
pub mod recursive;
pub mod sentence;

use serde::{Deserialize, Serialize};

use crate::data::DocumentType;
use crate::error::{JurisError, Result};

/// Chunking parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target size of a precedent chunk, in characters.
    pub precedent_target_chars: usize,
    /// Maximum size of a recursively split chunk, in characters.
    pub recursive_chunk_chars: usize,
    /// Characters shared between consecutive recursive chunks.
    pub recursive_overlap_chars: usize,
    /// Boundaries the recursive splitter tries, coarsest first. A hard
    /// character cut is used once these are exhausted.
    pub separators: Vec<String>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            precedent_target_chars: 500,
            recursive_chunk_chars: 500,
            recursive_overlap_chars: 50,
            separators: vec!["\n\n".into(), "\n".into(), ". ".into(), " ".into()],
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.precedent_target_chars == 0 || self.recursive_chunk_chars == 0 {
            return Err(JurisError::invalid_config("chunk sizes must be greater than zero"));
        }
        if self.recursive_overlap_chars >= self.recursive_chunk_chars {
            return Err(JurisError::invalid_config(format!(
                "recursive overlap ({}) must be smaller than the chunk size ({})",
                self.recursive_overlap_chars, self.recursive_chunk_chars
            )));
        }
        if self.separators.iter().any(String::is_empty) {
            return Err(JurisError::invalid_config("separators must not be empty strings"));
        }
        Ok(())
    }
}

/// Result of chunking one document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChunkOutput {
    /// Chunk texts in document order.
    pub chunks: Vec<String>,
    /// The type rule could not be applied; `chunks` holds the whole text.
    pub degraded: bool,
}

impl ChunkOutput {
    pub(crate) fn segmented(chunks: Vec<String>) -> Self {
        Self {
            chunks,
            degraded: false,
        }
    }

    pub(crate) fn degraded(text: &str) -> Self {
        Self {
            chunks: vec![text.trim().to_string()],
            degraded: true,
        }
    }
}

/// A pure chunking function.
pub type ChunkFn = fn(&str, &ChunkingConfig) -> ChunkOutput;

/// Returns the chunking function for a document type.
pub fn chunker_for(doc_type: DocumentType) -> ChunkFn {
    match doc_type {
        DocumentType::Precedent => sentence::chunk_precedent,
        DocumentType::Statute => article::chunk_statute,
        DocumentType::AdministrativeRuling | DocumentType::Interpretation => {
            recursive::chunk_recursive
        }
    }
}

/// Chunk `text` according to the policy of `doc_type`.
///
/// Blank input yields no chunks.
pub fn chunk_document(doc_type: DocumentType, text: &str, config: &ChunkingConfig) -> ChunkOutput {
    if text.trim().is_empty() {
        return ChunkOutput::default();
    }
    chunker_for(doc_type)(text, config)
}

pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_has_no_chunks() {
        let config = ChunkingConfig::default();
        for doc_type in DocumentType::ALL {
            let out = chunk_document(doc_type, "  \n\t ", &config);
            assert!(out.chunks.is_empty());
            assert!(!out.degraded);
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(ChunkingConfig::default().validate().is_ok());

        let config = ChunkingConfig {
            recursive_overlap_chars: 500,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ChunkingConfig {
            precedent_target_chars: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dispatch_by_type() {
        let config = ChunkingConfig::default();
        let statute = "제1조(목적) 이 법은 목적을 정한다.\n제2조(정의) 용어의 뜻은 다음과 같다.";
        let out = chunk_document(DocumentType::Statute, statute, &config);
        assert_eq!(out.chunks.len(), 2);

        let out = chunk_document(DocumentType::Interpretation, statute, &config);
        assert_eq!(out.chunks.len(), 1);
    }
}
