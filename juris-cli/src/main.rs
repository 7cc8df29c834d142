mod cli;
mod commands;
mod context;
mod corpus;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::commands::{chunk, classify, index, search, serve};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output on stdout stays parseable.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let format = cli.format;
    let config = context::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Index(cmd) => index::run(cmd, &config, format).await,
        Command::Search(cmd) => search::run(cmd, &config, format).await,
        Command::Classify(cmd) => classify::run(cmd, &config, format),
        Command::Chunk(cmd) => chunk::run(cmd, &config, format),
        Command::Serve(cmd) => serve::run(cmd, &config).await,
    }
}
