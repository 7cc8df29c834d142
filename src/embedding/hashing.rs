//! Feature-hashing embedder.

use std::sync::Arc;

use async_trait::async_trait;

use crate::analysis::{Analyzer, StandardAnalyzer};
use crate::embedding::Embedder;
use crate::error::{JurisError, Result};
use crate::vector::normalize;

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x00000100000001B3;

/// Deterministic embedder that hashes analyzer terms into signed buckets.
///
/// Similarity reduces to weighted term overlap, so it needs no model files
/// and no network. Useful as an offline baseline and in tests.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
    analyzer: Arc<dyn Analyzer>,
    name: String,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Result<Self> {
        Self::with_analyzer(dimension, Arc::new(StandardAnalyzer::new()))
    }

    pub fn with_analyzer(dimension: usize, analyzer: Arc<dyn Analyzer>) -> Result<Self> {
        if dimension == 0 {
            return Err(JurisError::invalid_config("embedding dimension must be > 0"));
        }
        Ok(Self {
            dimension,
            name: format!("fnv1a-hash-{}-{}", analyzer.name(), dimension),
            analyzer,
        })
    }

    fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];
        for term in self.analyzer.analyze(text)? {
            let h = fnv1a(term.as_bytes());
            let bucket = (h % self.dimension as u64) as usize;
            let sign = if (h >> 32) & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        normalize(&mut vector);
        Ok(vector)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed_text(text)).collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::dot;

    #[tokio::test]
    async fn test_deterministic_and_normalized() {
        let embedder = HashingEmbedder::new(64).unwrap();
        let texts = vec!["theft requires intent".to_string()];
        let a = embedder.embed(&texts).await.unwrap();
        let b = embedder.embed(&texts).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].len(), 64);
        assert!((dot(&a[0], &a[0]) - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_overlap_scores_higher() {
        let embedder = HashingEmbedder::new(1024).unwrap();
        let query = embedder.embed_query("elements of theft").await.unwrap();
        let related = embedder.embed_query("theft requires intent").await.unwrap();
        let unrelated = embedder.embed_query("contract formation offer").await.unwrap();
        assert!(dot(&query, &related) > dot(&query, &unrelated));
    }

    #[tokio::test]
    async fn test_no_terms_gives_zero_vector() {
        let embedder = HashingEmbedder::new(8).unwrap();
        let v = embedder.embed_query("???").await.unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(HashingEmbedder::new(0).is_err());
    }
}
