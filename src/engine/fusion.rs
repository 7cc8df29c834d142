//! Rank fusion of the lexical and semantic candidate lists.

use std::cmp::Ordering;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::classifier::FusionWeights;

/// Default RRF constant.
pub const DEFAULT_RRF_K: f64 = 60.0;

/// Algorithm used to combine lexical and semantic results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum FusionAlgorithm {
    /// Weighted Reciprocal Rank Fusion: `w / (k + rank)` per list.
    /// Only ranks matter, so BM25 and cosine scales never need reconciling.
    #[serde(rename = "rrf")]
    RRF {
        /// Smoothing constant (default 60).
        k: f64,
    },

    /// Min-max normalized raw scores, weighted per list.
    WeightedSum,
}

impl Default for FusionAlgorithm {
    fn default() -> Self {
        FusionAlgorithm::RRF { k: DEFAULT_RRF_K }
    }
}

/// A fused candidate with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedHit {
    pub ordinal: u32,
    pub score: f64,
    /// 1-based rank in the lexical list.
    pub lexical_rank: Option<usize>,
    /// 1-based rank in the semantic list.
    pub semantic_rank: Option<usize>,
    pub lexical_contribution: f64,
    pub semantic_contribution: f64,
}

impl FusedHit {
    fn new(ordinal: u32) -> Self {
        Self {
            ordinal,
            score: 0.0,
            lexical_rank: None,
            semantic_rank: None,
            lexical_contribution: 0.0,
            semantic_contribution: 0.0,
        }
    }

    /// True when the lexical list contributed at least as much as the
    /// semantic one.
    pub fn lexical_dominant(&self) -> bool {
        self.lexical_rank.is_some() && self.lexical_contribution >= self.semantic_contribution
    }

    fn best_rank(&self) -> usize {
        match (self.lexical_rank, self.semantic_rank) {
            (Some(l), Some(s)) => l.min(s),
            (Some(r), None) | (None, Some(r)) => r,
            (None, None) => usize::MAX,
        }
    }
}

/// Fuse two ranked lists of `(ordinal, raw score)`, each already sorted best
/// first.
///
/// Only documents with a positive fused score are kept, so a list with zero
/// weight adds nothing and a weighted-sum floor of zero drops out.
/// Results are ordered by fused score, then by the better source rank, then by
/// `id_ranks`, and truncated to `limit`.
pub fn fuse(
    lexical: &[(u32, f32)],
    semantic: &[(u32, f32)],
    weights: FusionWeights,
    algorithm: FusionAlgorithm,
    id_ranks: &[u32],
    limit: usize,
) -> Vec<FusedHit> {
    let mut fused: AHashMap<u32, FusedHit> = AHashMap::new();
    let lexical_weight = weights.lexical as f64;
    let semantic_weight = weights.semantic as f64;

    let lexical_scores = contributions(lexical, lexical_weight, algorithm);
    for (rank, (&(ordinal, _), contribution)) in lexical.iter().zip(lexical_scores).enumerate() {
        let hit = fused.entry(ordinal).or_insert_with(|| FusedHit::new(ordinal));
        hit.lexical_rank = Some(rank + 1);
        hit.lexical_contribution = contribution;
    }

    let semantic_scores = contributions(semantic, semantic_weight, algorithm);
    for (rank, (&(ordinal, _), contribution)) in semantic.iter().zip(semantic_scores).enumerate() {
        let hit = fused.entry(ordinal).or_insert_with(|| FusedHit::new(ordinal));
        hit.semantic_rank = Some(rank + 1);
        hit.semantic_contribution = contribution;
    }

    let mut results: Vec<FusedHit> = fused
        .into_values()
        .map(|mut hit| {
            hit.score = hit.lexical_contribution + hit.semantic_contribution;
            hit
        })
        .filter(|hit| hit.score > 0.0)
        .collect();

    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.best_rank().cmp(&b.best_rank()))
            .then_with(|| id_ranks[a.ordinal as usize].cmp(&id_ranks[b.ordinal as usize]))
    });
    results.truncate(limit);
    results
}

/// Per-position contribution of one list.
fn contributions(list: &[(u32, f32)], weight: f64, algorithm: FusionAlgorithm) -> Vec<f64> {
    match algorithm {
        FusionAlgorithm::RRF { k } => (0..list.len())
            .map(|rank| weight / (k + (rank + 1) as f64))
            .collect(),
        FusionAlgorithm::WeightedSum => {
            let min = list.iter().map(|(_, s)| *s).fold(f32::INFINITY, f32::min);
            let max = list.iter().map(|(_, s)| *s).fold(f32::NEG_INFINITY, f32::max);
            list.iter()
                .map(|(_, score)| {
                    let normalized = if max > min {
                        ((score - min) / (max - min)) as f64
                    } else {
                        1.0
                    };
                    normalized * weight
                })
                .collect()
        }
    }
}
