//! Corpus file readers.
//!
//! The format follows the file extension: `.jsonl` / `.ndjson` hold one
//! `RawDocument` JSON object per line, `.csv` has `id`, `type` and `text`
//! columns with every other column kept as metadata.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result, bail};
use juris::{DECISION_DATE_KEY, DocumentType, MetadataValue, RawDocument};

pub fn read(path: &Path) -> Result<Vec<RawDocument>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open corpus {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("jsonl") | Some("ndjson") => read_jsonl(BufReader::new(file)),
        Some("csv") => read_csv(file),
        _ => bail!(
            "Unsupported corpus format for {}; expected .jsonl or .csv",
            path.display()
        ),
    }
}

fn read_jsonl<R: BufRead>(reader: R) -> Result<Vec<RawDocument>> {
    let mut documents = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: RawDocument = serde_json::from_str(&line)
            .with_context(|| format!("Failed to parse document on line {}", i + 1))?;
        documents.push(doc);
    }
    Ok(documents)
}

fn read_csv<R: Read>(reader: R) -> Result<Vec<RawDocument>> {
    let mut reader = csv::ReaderBuilder::new().flexible(false).from_reader(reader);
    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .with_context(|| format!("CSV corpus is missing the '{name}' column"))
    };
    let (id_col, type_col, text_col) = (column("id")?, column("type")?, column("text")?);

    let mut documents = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 2;
        let field = |col: usize| record.get(col).unwrap_or_default();
        let doc_type: DocumentType = field(type_col)
            .parse()
            .with_context(|| format!("Invalid document type on row {row}"))?;
        let mut doc = RawDocument::new(field(id_col).trim(), doc_type, field(text_col));

        for (col, header) in headers.iter().enumerate() {
            let value = field(col).trim();
            if col == id_col || col == type_col || col == text_col || value.is_empty() {
                continue;
            }
            doc = doc.with_metadata(header.trim(), metadata_value(header.trim(), value));
        }
        documents.push(doc);
    }
    Ok(documents)
}

/// Metadata from CSV is text, except the decision date, which is parsed so
/// date filters apply to it.
fn metadata_value(key: &str, value: &str) -> MetadataValue {
    if key == DECISION_DATE_KEY {
        let json = serde_json::Value::String(value.to_string());
        if let Ok(MetadataValue::Date(date)) = serde_json::from_value(json) {
            return MetadataValue::Date(date);
        }
    }
    MetadataValue::from(value)
}
