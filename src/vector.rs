//! Semantic (embedding) search.
//!
//! # Module Structure
//!
//! - `index`: flat cosine-similarity index over L2-normalized vectors
//! - `cache`: embedding cache keyed by document id and content hash

pub mod cache;
pub mod index;

pub use cache::EmbeddingCache;
pub use index::{VectorHit, VectorIndex, dot, normalize};
