use anyhow::Result;
use juris::DocumentStore;

use crate::cli::ChunkCommand;
use crate::context::{self, CliConfig};
use crate::output::{self, OutputFormat};

/// Chunk and analyze a corpus without embedding it.
pub fn run(cmd: ChunkCommand, config: &CliConfig, format: OutputFormat) -> Result<()> {
    let documents = context::read_corpus(&cmd.corpus)?;
    let analyzer = context::create_analyzer(config.analyzer)?;
    let store = DocumentStore::from_raw(documents, analyzer.as_ref(), &config.engine.chunking)?;
    output::print_chunks(store.documents(), format);
    Ok(())
}
