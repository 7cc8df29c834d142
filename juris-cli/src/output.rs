use clap::ValueEnum;
use juris::{BuildReport, Classification, Document, SearchResponse, SnapshotStats};
use serde::Serialize;
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    Table,
    /// JSON output.
    Json,
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize output: {e}"),
    }
}

fn print_table<T: Tabled>(rows: &[T]) {
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
}

/// Print a search response.
pub fn print_search_response(response: &SearchResponse, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(response),
        OutputFormat::Table => {
            println!(
                "Query type: {} (lexical {:.2} / semantic {:.2})",
                response.classified_type, response.weights.lexical, response.weights.semantic
            );
            if response.semantic_degraded {
                println!("Semantic ranking unavailable; results are lexical only.");
            }
            if response.lexical_degraded {
                println!("Lexical ranking unavailable; results are semantic only.");
            }
            if response.results.is_empty() {
                println!("No results found.");
                return;
            }

            let rows: Vec<SearchResultRow> = response
                .results
                .iter()
                .map(|r| SearchResultRow {
                    rank: r.rank,
                    id: r.document_id.clone(),
                    doc_type: r.doc_type.to_string(),
                    score: format!("{:.4}", r.fused_score),
                    sources: format!(
                        "{} / {}",
                        format_rank(r.source.lexical_rank),
                        format_rank(r.source.semantic_rank)
                    ),
                    snippet: r.snippet.clone(),
                })
                .collect();
            print_table(&rows);
        }
    }
}

/// Print a query classification.
pub fn print_classification(query: &str, classification: &Classification, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&json!({
            "query": query,
            "classification": classification,
        })),
        OutputFormat::Table => {
            let row = ClassificationRow {
                query: query.to_string(),
                query_type: classification.query_type.to_string(),
                lexical: format!("{:.2}", classification.weights.lexical),
                semantic: format!("{:.2}", classification.weights.semantic),
                matched: classification.matched.clone().unwrap_or_default(),
            };
            print_table(&[row]);
        }
    }
}

/// Print the chunks of a corpus.
pub fn print_chunks(documents: &[Document], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let chunks: Vec<serde_json::Value> = documents
                .iter()
                .map(|doc| {
                    json!({
                        "id": doc.id,
                        "source_id": doc.source_id,
                        "type": doc.doc_type,
                        "chars": doc.text.chars().count(),
                        "tokens": doc.tokens.len(),
                        "degraded": doc.is_degraded_chunking(),
                    })
                })
                .collect();
            print_json(&chunks);
        }
        OutputFormat::Table => {
            if documents.is_empty() {
                println!("No chunks produced.");
                return;
            }
            let rows: Vec<ChunkRow> = documents
                .iter()
                .map(|doc| ChunkRow {
                    id: doc.id.clone(),
                    doc_type: doc.doc_type.to_string(),
                    chars: doc.text.chars().count(),
                    tokens: doc.tokens.len(),
                    degraded: if doc.is_degraded_chunking() { "yes" } else { "" }.to_string(),
                    preview: truncate(&doc.text, 60),
                })
                .collect();
            print_table(&rows);
        }
    }
}

/// Print snapshot statistics, with the build report when there is one.
pub fn print_stats(stats: &SnapshotStats, report: Option<&BuildReport>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&json!({
            "snapshot": stats,
            "build": report,
        })),
        OutputFormat::Table => {
            let mut rows = vec![
                StatRow::new("Snapshot", stats.id),
                StatRow::new("Built at", stats.built_at.to_rfc3339()),
                StatRow::new("Sources", stats.sources),
                StatRow::new("Chunks", stats.documents),
                StatRow::new("Terms", stats.terms),
                StatRow::new("Avg. chunk length", format!("{:.1}", stats.avg_doc_length)),
                StatRow::new("Embedded", stats.embedded),
                StatRow::new("Missing embeddings", stats.missing_embeddings),
                StatRow::new("Degraded chunks", stats.degraded_chunks),
                StatRow::new("Analyzer", &stats.analyzer),
                StatRow::new("Embedder", format!("{} ({}d)", stats.embedder, stats.dimension)),
            ];
            if let Some(report) = report {
                rows.push(StatRow::new("Newly embedded", report.embedded));
                rows.push(StatRow::new("Reused from cache", report.reused));
                rows.push(StatRow::new("Skipped", report.skipped));
                rows.push(StatRow::new("Build time", format!("{} ms", report.elapsed_ms)));
            }
            print_table(&rows);
        }
    }
}

// --- Helper types and functions ---

#[derive(Tabled)]
struct SearchResultRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    doc_type: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Lex / Sem")]
    sources: String,
    #[tabled(rename = "Snippet")]
    snippet: String,
}

#[derive(Tabled)]
struct ClassificationRow {
    #[tabled(rename = "Query")]
    query: String,
    #[tabled(rename = "Type")]
    query_type: String,
    #[tabled(rename = "Lexical")]
    lexical: String,
    #[tabled(rename = "Semantic")]
    semantic: String,
    #[tabled(rename = "Matched")]
    matched: String,
}

#[derive(Tabled)]
struct ChunkRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    doc_type: String,
    #[tabled(rename = "Chars")]
    chars: usize,
    #[tabled(rename = "Tokens")]
    tokens: usize,
    #[tabled(rename = "Degraded")]
    degraded: String,
    #[tabled(rename = "Text")]
    preview: String,
}

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Stat")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

impl StatRow {
    fn new(name: &'static str, value: impl ToString) -> Self {
        Self {
            name,
            value: value.to_string(),
        }
    }
}

fn format_rank(rank: Option<usize>) -> String {
    rank.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string())
}

fn truncate(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut out: String = flat.chars().take(max_chars - 3).collect();
    out.push_str("...");
    out
}
