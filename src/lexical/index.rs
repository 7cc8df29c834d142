//! BM25 inverted index.

use ahash::AHashMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{JurisError, Result};
use crate::store::DocumentStore;

/// BM25 free parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    /// Term-frequency saturation.
    pub k1: f32,
    /// Length normalization strength, in `[0, 1]`.
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

impl Bm25Params {
    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(JurisError::invalid_config(format!(
                "bm25.k1 must be a non-negative number, got {}",
                self.k1
            )));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(JurisError::invalid_config(format!(
                "bm25.b must be in [0, 1], got {}",
                self.b
            )));
        }
        Ok(())
    }
}

/// One entry of a posting list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub ordinal: u32,
    pub term_freq: u32,
}

/// Read-only BM25 index over the tokens cached in a document store.
///
/// Posting lists are sorted by ordinal. Document frequency of a term is the
/// length of its posting list.
#[derive(Debug, Default)]
pub struct LexicalIndex {
    params: Bm25Params,
    postings: AHashMap<String, Vec<Posting>>,
    doc_lengths: Vec<u32>,
    avg_doc_length: f32,
}

impl LexicalIndex {
    pub fn build(store: &DocumentStore, params: Bm25Params) -> Self {
        let mut postings: AHashMap<String, Vec<Posting>> = AHashMap::new();
        let mut doc_lengths = Vec::with_capacity(store.len());
        let mut total_tokens: u64 = 0;

        for (ordinal, doc) in store.iter() {
            let mut term_freqs: AHashMap<&str, u32> = AHashMap::new();
            for token in &doc.tokens {
                *term_freqs.entry(token.as_str()).or_default() += 1;
            }
            for (term, term_freq) in term_freqs {
                postings
                    .entry(term.to_string())
                    .or_default()
                    .push(Posting { ordinal, term_freq });
            }
            doc_lengths.push(doc.tokens.len() as u32);
            total_tokens += doc.tokens.len() as u64;
        }

        let avg_doc_length = if doc_lengths.is_empty() {
            0.0
        } else {
            (total_tokens as f64 / doc_lengths.len() as f64) as f32
        };

        debug!(
            "lexical index: {} documents, {} terms, avgdl {:.1}",
            doc_lengths.len(),
            postings.len(),
            avg_doc_length
        );

        Self {
            params,
            postings,
            doc_lengths,
            avg_doc_length,
        }
    }

    pub fn params(&self) -> Bm25Params {
        self.params
    }

    pub fn doc_count(&self) -> usize {
        self.doc_lengths.len()
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    pub fn avg_doc_length(&self) -> f32 {
        self.avg_doc_length
    }

    pub fn doc_length(&self, ordinal: u32) -> Option<u32> {
        self.doc_lengths.get(ordinal as usize).copied()
    }

    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        self.postings.get(term).map(Vec::as_slice)
    }

    pub fn doc_freq(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, Vec::len)
    }

    /// Inverse document frequency, `ln(1 + (N - df + 0.5) / (df + 0.5))`.
    ///
    /// Always non-negative; zero for unknown terms.
    pub fn idf(&self, term: &str) -> f32 {
        let df = self.doc_freq(term);
        if df == 0 {
            return 0.0;
        }
        let n = self.doc_count() as f32;
        let df = df as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// BM25 contribution of one term occurrence count to one document.
    pub(crate) fn term_score(&self, idf: f32, term_freq: u32, doc_length: u32) -> f32 {
        let Bm25Params { k1, b } = self.params;
        let tf = term_freq as f32;
        let norm = if self.avg_doc_length > 0.0 {
            1.0 - b + b * doc_length as f32 / self.avg_doc_length
        } else {
            1.0
        };
        idf * (tf * (k1 + 1.0)) / (tf + k1 * norm)
    }
}
