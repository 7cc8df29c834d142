//! Flat cosine-similarity index.
//!
//! Vectors are normalized on insertion, so cosine similarity is a plain dot
//! product. Slots are addressed by the document store ordinal; a slot without
//! an embedding never matches.

use std::cmp::Ordering;

use bit_vec::BitVec;
use rayon::prelude::*;
use wide::f32x8;

use crate::error::{JurisError, Result};

/// A scored semantic match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorHit {
    pub ordinal: u32,
    pub similarity: f32,
}

#[derive(Debug, Default)]
pub struct VectorIndex {
    dimension: usize,
    slots: Vec<Option<Vec<f32>>>,
    embedded: usize,
}

impl VectorIndex {
    /// Create an index with `len` empty slots.
    pub fn empty(dimension: usize, len: usize) -> Self {
        Self {
            dimension,
            slots: vec![None; len],
            embedded: 0,
        }
    }

    /// Create an index from one optional vector per ordinal.
    ///
    /// Every present vector must have `dimension` finite components. Zero
    /// vectors are stored as empty slots.
    pub fn from_slots(dimension: usize, slots: Vec<Option<Vec<f32>>>) -> Result<Self> {
        if dimension == 0 {
            return Err(JurisError::invalid_config("vector dimension must be > 0"));
        }

        let mut normalized = Vec::with_capacity(slots.len());
        let mut embedded = 0;
        for (ordinal, slot) in slots.into_iter().enumerate() {
            let slot = match slot {
                Some(mut vector) => {
                    check_vector(&vector, dimension)
                        .map_err(|e| JurisError::index_build(format!("ordinal {ordinal}: {e}")))?;
                    if normalize(&mut vector) > 0.0 {
                        embedded += 1;
                        Some(vector)
                    } else {
                        None
                    }
                }
                None => None,
            };
            normalized.push(slot);
        }

        Ok(Self {
            dimension,
            slots: normalized,
            embedded,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of slots, embedded or not.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots holding an embedding.
    pub fn embedded_count(&self) -> usize {
        self.embedded
    }

    pub fn vector(&self, ordinal: u32) -> Option<&[f32]> {
        self.slots.get(ordinal as usize)?.as_deref()
    }

    /// Top `limit` slots by cosine similarity to `query`, ties broken by
    /// `id_ranks`.
    ///
    /// Only positive similarities count as matches. A zero-norm query matches
    /// nothing.
    pub fn search(
        &self,
        query: &[f32],
        limit: usize,
        allowed: Option<&BitVec>,
        id_ranks: &[u32],
    ) -> Result<Vec<VectorHit>> {
        check_vector(query, self.dimension).map_err(JurisError::embedding)?;

        let mut query = query.to_vec();
        if normalize(&mut query) == 0.0 || limit == 0 {
            return Ok(Vec::new());
        }

        let mut hits: Vec<VectorHit> = self
            .slots
            .par_iter()
            .enumerate()
            .filter_map(|(ordinal, slot)| {
                let vector = slot.as_deref()?;
                if let Some(allowed) = allowed
                    && !allowed.get(ordinal).unwrap_or(false)
                {
                    return None;
                }
                let similarity = dot(&query, vector);
                (similarity > 0.0).then_some(VectorHit {
                    ordinal: ordinal as u32,
                    similarity,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| id_ranks[a.ordinal as usize].cmp(&id_ranks[b.ordinal as usize]))
        });
        hits.truncate(limit);
        Ok(hits)
    }
}

fn check_vector(vector: &[f32], dimension: usize) -> std::result::Result<(), String> {
    if vector.len() != dimension {
        return Err(format!(
            "vector has dimension {}, expected {dimension}",
            vector.len()
        ));
    }
    if vector.iter().any(|v| !v.is_finite()) {
        return Err("vector contains a non-finite component".to_string());
    }
    Ok(())
}

/// Dot product, eight lanes at a time.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let a_chunks = a.chunks_exact(8);
    let b_chunks = b.chunks_exact(8);
    let tail: f32 = a_chunks
        .remainder()
        .iter()
        .zip(b_chunks.remainder())
        .map(|(x, y)| x * y)
        .sum();

    let mut acc = f32x8::ZERO;
    for (x, y) in a_chunks.zip(b_chunks) {
        let mut xs = [0.0f32; 8];
        let mut ys = [0.0f32; 8];
        xs.copy_from_slice(x);
        ys.copy_from_slice(y);
        acc = acc + f32x8::from(xs) * f32x8::from(ys);
    }
    acc.reduce_add() + tail
}

/// Scale `vector` to unit length in place and return its original norm.
///
/// A zero vector is left untouched.
pub fn normalize(vector: &mut [f32]) -> f32 {
    let norm = dot(vector, vector).sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
    norm
}
