//! Metadata filters applied before ranking.

use std::collections::BTreeMap;

use bit_vec::BitVec;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::{Document, DocumentType, MetadataValue};
use crate::store::DocumentStore;

/// Restricts which documents may appear in results.
///
/// All conditions must hold. Date bounds are inclusive and compare against
/// the `decision_date` metadata field; documents without one never pass a
/// date bound.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilter {
    /// Allowed document types; empty allows all.
    pub doc_types: Vec<DocumentType>,
    /// Metadata fields that must equal the given value.
    pub equals: BTreeMap<String, MetadataValue>,
    /// Earliest decision date.
    pub decided_after: Option<NaiveDate>,
    /// Latest decision date.
    pub decided_before: Option<NaiveDate>,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn doc_type(mut self, doc_type: DocumentType) -> Self {
        self.doc_types.push(doc_type);
        self
    }

    pub fn equals(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.equals.insert(key.into(), value.into());
        self
    }

    pub fn decided_after(mut self, date: NaiveDate) -> Self {
        self.decided_after = Some(date);
        self
    }

    pub fn decided_before(mut self, date: NaiveDate) -> Self {
        self.decided_before = Some(date);
        self
    }

    /// True if the filter accepts every document.
    pub fn is_empty(&self) -> bool {
        self.doc_types.is_empty()
            && self.equals.is_empty()
            && self.decided_after.is_none()
            && self.decided_before.is_none()
    }

    pub fn matches(&self, doc: &Document) -> bool {
        if !self.doc_types.is_empty() && !self.doc_types.contains(&doc.doc_type) {
            return false;
        }
        if !self
            .equals
            .iter()
            .all(|(key, value)| doc.metadata.get(key) == Some(value))
        {
            return false;
        }
        if self.decided_after.is_some() || self.decided_before.is_some() {
            let Some(date) = doc.decision_date() else {
                return false;
            };
            if self.decided_after.is_some_and(|after| date < after) {
                return false;
            }
            if self.decided_before.is_some_and(|before| date > before) {
                return false;
            }
        }
        true
    }

    /// Evaluate the filter over the whole store into an ordinal allow-list.
    pub fn allowed_ordinals(&self, store: &DocumentStore) -> BitVec {
        let mut allowed = BitVec::from_elem(store.len(), false);
        for (ordinal, doc) in store.iter() {
            if self.matches(doc) {
                allowed.set(ordinal as usize, true);
            }
        }
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StandardAnalyzer;
    use crate::chunking::ChunkingConfig;
    use crate::data::{DECISION_DATE_KEY, RawDocument};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store() -> DocumentStore {
        let raw = vec![
            RawDocument::new("p1", DocumentType::Precedent, "Theft.")
                .with_metadata("court", "대법원")
                .with_metadata(DECISION_DATE_KEY, date(2019, 3, 14)),
            RawDocument::new("p2", DocumentType::Precedent, "Fraud.")
                .with_metadata("court", "서울고등법원")
                .with_metadata(DECISION_DATE_KEY, date(2021, 7, 1)),
            RawDocument::new("s1", DocumentType::Statute, "Article 329 Theft."),
        ];
        DocumentStore::from_raw(raw, &StandardAnalyzer::new(), &ChunkingConfig::default()).unwrap()
    }

    fn allowed_ids(filter: &SearchFilter, store: &DocumentStore) -> Vec<String> {
        let allowed = filter.allowed_ordinals(store);
        store
            .iter()
            .filter(|(ordinal, _)| allowed[*ordinal as usize])
            .map(|(_, doc)| doc.id.clone())
            .collect()
    }

    #[test]
    fn test_empty_filter_allows_all() {
        let store = store();
        assert!(SearchFilter::new().is_empty());
        assert_eq!(allowed_ids(&SearchFilter::new(), &store), vec!["p1", "p2", "s1"]);
    }

    #[test]
    fn test_doc_type_and_equals() {
        let store = store();
        let filter = SearchFilter::new().doc_type(DocumentType::Statute);
        assert_eq!(allowed_ids(&filter, &store), vec!["s1"]);

        let filter = SearchFilter::new().equals("court", "대법원");
        assert_eq!(allowed_ids(&filter, &store), vec!["p1"]);
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let store = store();
        let filter = SearchFilter::new().decided_after(date(2019, 3, 14));
        assert_eq!(allowed_ids(&filter, &store), vec!["p1", "p2"]);

        let filter = SearchFilter::new()
            .decided_after(date(2020, 1, 1))
            .decided_before(date(2021, 7, 1));
        assert_eq!(allowed_ids(&filter, &store), vec!["p2"]);
    }

    #[test]
    fn test_filter_from_json() {
        let filter: SearchFilter = serde_json::from_str(
            r#"{"doc_types": ["precedent"], "decided_before": "2020-01-01"}"#,
        )
        .unwrap();
        assert_eq!(allowed_ids(&filter, &store()), vec!["p1"]);
    }
}
