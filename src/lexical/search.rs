//! BM25 query evaluation.

use std::cmp::Ordering;

use ahash::AHashMap;
use bit_vec::BitVec;

use super::index::LexicalIndex;

/// A lexical query over already analyzed terms.
#[derive(Debug, Clone)]
pub struct LexicalSearchRequest<'a> {
    /// Analyzed query tokens; repeated tokens count once per occurrence.
    pub terms: &'a [String],
    /// Maximum number of hits.
    pub limit: usize,
    /// Ordinals allowed to match; `None` allows all.
    pub allowed: Option<&'a BitVec>,
}

impl<'a> LexicalSearchRequest<'a> {
    pub fn new(terms: &'a [String], limit: usize) -> Self {
        Self {
            terms,
            limit,
            allowed: None,
        }
    }

    pub fn allowed(mut self, allowed: Option<&'a BitVec>) -> Self {
        self.allowed = allowed;
        self
    }
}

/// A scored lexical match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LexicalHit {
    pub ordinal: u32,
    pub score: f32,
}

impl LexicalIndex {
    /// Score every document containing a query term and return the best
    /// `limit`, by descending score with ties broken by `id_ranks`.
    pub fn search(&self, request: &LexicalSearchRequest<'_>, id_ranks: &[u32]) -> Vec<LexicalHit> {
        if request.terms.is_empty() || request.limit == 0 || self.doc_count() == 0 {
            return Vec::new();
        }

        let mut query_freqs: AHashMap<&str, u32> = AHashMap::new();
        for term in request.terms {
            *query_freqs.entry(term.as_str()).or_default() += 1;
        }

        let mut scores: AHashMap<u32, f32> = AHashMap::new();
        for (term, query_freq) in query_freqs {
            let Some(postings) = self.postings(term) else {
                continue;
            };
            let idf = self.idf(term);
            for posting in postings {
                if let Some(allowed) = request.allowed
                    && !allowed.get(posting.ordinal as usize).unwrap_or(false)
                {
                    continue;
                }
                let doc_length = self.doc_length(posting.ordinal).unwrap_or(0);
                *scores.entry(posting.ordinal).or_default() +=
                    query_freq as f32 * self.term_score(idf, posting.term_freq, doc_length);
            }
        }

        let mut hits: Vec<LexicalHit> = scores
            .into_iter()
            .filter(|&(_, score)| score > 0.0)
            .map(|(ordinal, score)| LexicalHit { ordinal, score })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| id_ranks[a.ordinal as usize].cmp(&id_ranks[b.ordinal as usize]))
        });
        hits.truncate(request.limit);
        hits
    }
}
