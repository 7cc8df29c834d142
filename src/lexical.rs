//! Lexical search using an in-memory BM25 inverted index.
//!
//! # Module Structure
//!
//! - `index`: BM25 parameters and the inverted index built from a
//!   [`DocumentStore`](crate::store::DocumentStore)
//! - `search`: term-at-a-time query evaluation and top-N selection

pub mod index;
pub mod search;

pub use index::{Bm25Params, LexicalIndex, Posting};
pub use search::{LexicalHit, LexicalSearchRequest};
