use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{JurisError, Result};

/// Metadata key set by chunking when a document could not be segmented
/// under its type's rule.
pub const DEGRADED_CHUNKING_KEY: &str = "degraded_chunking";

/// Metadata key holding the decision (or promulgation) date.
pub const DECISION_DATE_KEY: &str = "decision_date";

/// Display metadata attached to a document.
///
/// A `BTreeMap` keeps serialized output stable across runs.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// The kind of legal source a document comes from.
///
/// The set is closed; chunking policy is chosen by matching on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Court decision.
    #[serde(alias = "판례")]
    Precedent,
    /// Statute or regulation text.
    #[serde(alias = "법령")]
    Statute,
    /// Ruling issued by an administrative body.
    #[serde(alias = "행정해석")]
    AdministrativeRuling,
    /// Official interpretation of a statute.
    #[serde(alias = "해석례")]
    Interpretation,
}

impl DocumentType {
    pub const ALL: [DocumentType; 4] = [
        DocumentType::Precedent,
        DocumentType::Statute,
        DocumentType::AdministrativeRuling,
        DocumentType::Interpretation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Precedent => "precedent",
            DocumentType::Statute => "statute",
            DocumentType::AdministrativeRuling => "administrative_ruling",
            DocumentType::Interpretation => "interpretation",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = JurisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "precedent" | "판례" => Ok(DocumentType::Precedent),
            "statute" | "법령" => Ok(DocumentType::Statute),
            "administrative_ruling" | "행정해석" => Ok(DocumentType::AdministrativeRuling),
            "interpretation" | "해석례" => Ok(DocumentType::Interpretation),
            other => Err(JurisError::invalid_argument(format!(
                "unknown document type '{other}'"
            ))),
        }
    }
}

/// A metadata field value.
///
/// Deserialization is untagged, so plain JSON scalars map onto the closest
/// variant and ISO dates (`2019-03-14`) become [`MetadataValue::Date`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
    Date(NaiveDate),
    String(String),
}

impl MetadataValue {
    /// Returns the text value if this is a String variant.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetadataValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer value if this is an Int variant.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            MetadataValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the boolean value if this is a Bool variant.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            MetadataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the date if this is a Date variant.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            MetadataValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Int(i) => write!(f, "{i}"),
            MetadataValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            MetadataValue::String(s) => f.write_str(s),
        }
    }
}

// --- Conversions ---

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        MetadataValue::String(v)
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        MetadataValue::String(v.to_string())
    }
}

impl From<i64> for MetadataValue {
    fn from(v: i64) -> Self {
        MetadataValue::Int(v)
    }
}

impl From<i32> for MetadataValue {
    fn from(v: i32) -> Self {
        MetadataValue::Int(v as i64)
    }
}

impl From<bool> for MetadataValue {
    fn from(v: bool) -> Self {
        MetadataValue::Bool(v)
    }
}

impl From<NaiveDate> for MetadataValue {
    fn from(d: NaiveDate) -> Self {
        MetadataValue::Date(d)
    }
}

/// A document as supplied by ingestion, before chunking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    /// Stable identifier from the source system (e.g. `prec-2019도1234`).
    pub id: String,
    /// Source kind; drives the chunking policy.
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    /// Clean, extracted text.
    pub text: String,
    /// Display fields (court, decision date, case number, citation).
    #[serde(default)]
    pub metadata: Metadata,
}

impl RawDocument {
    pub fn new(id: impl Into<String>, doc_type: DocumentType, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            doc_type,
            text: text.into(),
            metadata: Metadata::new(),
        }
    }

    /// Add a metadata field.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// An indexed retrieval unit: one chunk of a [`RawDocument`].
///
/// Documents are immutable once a snapshot is built. Embeddings are owned by
/// the semantic index, keyed by the same ordinal as the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique chunk id, stable across rebuilds.
    pub id: String,
    /// Id of the raw document this chunk came from.
    pub source_id: String,
    /// 0-based position of this chunk in its source.
    pub chunk_index: usize,
    pub doc_type: DocumentType,
    /// Normalized chunk text used for display and snippets.
    pub text: String,
    /// Analyzer output, in order, duplicates kept.
    pub tokens: Vec<String>,
    /// Hash of `text`, used as the embedding cache key.
    pub content_hash: String,
    pub metadata: Metadata,
}

impl Document {
    /// Returns true if chunking fell back to a single unsegmented chunk.
    pub fn is_degraded_chunking(&self) -> bool {
        self.metadata
            .get(DEGRADED_CHUNKING_KEY)
            .and_then(MetadataValue::as_boolean)
            .unwrap_or(false)
    }

    /// Returns the decision date, if the source supplied one.
    pub fn decision_date(&self) -> Option<NaiveDate> {
        self.metadata
            .get(DECISION_DATE_KEY)
            .and_then(MetadataValue::as_date)
    }
}

/// Compute the content hash for a chunk text.
///
/// CRC32 plus byte length; collisions would also need equal length and the
/// same document id to matter.
pub fn content_hash(text: &str) -> String {
    format!("{:08x}-{}", crc32fast::hash(text.as_bytes()), text.len())
}
