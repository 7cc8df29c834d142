use anyhow::Result;
use tracing::info;

use crate::cli::IndexCommand;
use crate::context::{self, CliConfig};
use crate::output::{self, OutputFormat};

/// Build a snapshot from a corpus and print its statistics.
pub async fn run(cmd: IndexCommand, config: &CliConfig, format: OutputFormat) -> Result<()> {
    let documents = context::read_corpus(&cmd.corpus)?;
    let builder = context::create_builder(config, cmd.cache.as_deref())?;

    let (snapshot, report) = builder.build_with_report(documents).await?;
    if let Some(path) = &cmd.cache {
        builder.save_cache(path)?;
        info!("saved {} embeddings to {}", builder.cached_embeddings(), path.display());
    }

    output::print_stats(&snapshot.stats(), Some(&report), format);
    Ok(())
}
