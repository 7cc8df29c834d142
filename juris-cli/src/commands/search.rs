use anyhow::Result;
use juris::{SearchFilter, SearchRequest};

use crate::cli::SearchCommand;
use crate::context::{self, CliConfig};
use crate::output::{self, OutputFormat};

/// Execute a search command.
pub async fn run(cmd: SearchCommand, config: &CliConfig, format: OutputFormat) -> Result<()> {
    let retriever = context::open_retriever(config, &cmd.corpus, cmd.cache.as_deref()).await?;

    let mut request = SearchRequest::builder(cmd.query).top_k(cmd.top_k);
    if !cmd.doc_types.is_empty() {
        let filter = cmd
            .doc_types
            .into_iter()
            .fold(SearchFilter::new(), |filter, doc_type| filter.doc_type(doc_type));
        request = request.filter(filter);
    }

    let response = retriever.search(request.build()).await?;
    output::print_search_response(&response, format);
    Ok(())
}
