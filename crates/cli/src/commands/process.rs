//! Process command handler.
//!
//! Runs one or more contract PDFs through extraction, chunking, embedding
//! and indexing.

use super::{check_reports, print_reports, resolve_strategy};
use clap::Args;
use clausal_contracts::ContractPipeline;
use clausal_core::{config::AppConfig, AppResult};
use std::path::PathBuf;

/// Process contract PDFs into the index
#[derive(Args, Debug)]
pub struct ProcessCommand {
    /// PDF files to process
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Chunking strategy (clauses, sentences, paragraphs)
    #[arg(short, long)]
    pub strategy: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ProcessCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing process command for {} files", self.paths.len());

        let strategy = resolve_strategy(self.strategy.as_deref(), config)?;
        let pipeline = ContractPipeline::from_config(config)?;

        let reports = if self.paths.len() == 1 {
            vec![pipeline.process_contract(&self.paths[0], strategy).await]
        } else {
            pipeline.batch_process(&self.paths, strategy).await
        };

        print_reports(&reports, self.json)?;
        check_reports(&reports)
    }
}
