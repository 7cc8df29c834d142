use anyhow::Result;
use juris::QueryClassifier;

use crate::cli::ClassifyCommand;
use crate::context::CliConfig;
use crate::output::{self, OutputFormat};

pub fn run(cmd: ClassifyCommand, config: &CliConfig, format: OutputFormat) -> Result<()> {
    let classifier = QueryClassifier::new(&config.engine.classifier)?;
    let classification = classifier.classify(&cmd.query);
    output::print_classification(&cmd.query, &classification, format);
    Ok(())
}
