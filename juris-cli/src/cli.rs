use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use juris::DocumentType;

use crate::output::OutputFormat;

/// Juris - hybrid retrieval over legal corpora
#[derive(Parser)]
#[command(name = "juris", version, about)]
pub struct Cli {
    /// Path to an engine configuration TOML file.
    #[arg(long, env = "JURIS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build an index from a corpus file and report its statistics.
    Index(IndexCommand),
    /// Build an index and run one query against it.
    Search(SearchCommand),
    /// Show how a query is classified and weighted.
    Classify(ClassifyCommand),
    /// Show how a corpus is chunked.
    Chunk(ChunkCommand),
    /// Serve the search API over HTTP.
    Serve(ServeCommand),
}

#[derive(Parser)]
pub struct IndexCommand {
    /// Corpus file (`.jsonl` or `.csv`).
    #[arg(long)]
    pub corpus: PathBuf,

    /// Embedding cache file, read before and written after the build.
    #[arg(long)]
    pub cache: Option<PathBuf>,
}

#[derive(Parser)]
pub struct SearchCommand {
    /// Corpus file (`.jsonl` or `.csv`).
    #[arg(long)]
    pub corpus: PathBuf,

    /// Query text.
    #[arg(long, short)]
    pub query: String,

    /// Maximum number of results.
    #[arg(long, default_value_t = juris::DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Restrict results to these document types.
    #[arg(long = "type", value_parser = parse_doc_type)]
    pub doc_types: Vec<DocumentType>,

    /// Embedding cache file.
    #[arg(long)]
    pub cache: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ClassifyCommand {
    /// Query text.
    #[arg(long, short)]
    pub query: String,
}

#[derive(Parser)]
pub struct ChunkCommand {
    /// Corpus file (`.jsonl` or `.csv`).
    #[arg(long)]
    pub corpus: PathBuf,
}

#[derive(Parser)]
pub struct ServeCommand {
    /// Corpus file (`.jsonl` or `.csv`).
    #[arg(long)]
    pub corpus: PathBuf,

    /// Address to listen on.
    #[arg(long, env = "JURIS_ADDR", default_value = "127.0.0.1:8080")]
    pub addr: SocketAddr,

    /// Embedding cache file.
    #[arg(long)]
    pub cache: Option<PathBuf>,
}

fn parse_doc_type(value: &str) -> Result<DocumentType, String> {
    value.parse().map_err(|e: juris::JurisError| e.to_string())
}
