//! Stats command handler.
//!
//! Shows index and embedding statistics.

use clap::Args;
use clausal_contracts::ContractPipeline;
use clausal_core::{config::AppConfig, AppResult};

/// Show index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let pipeline = ContractPipeline::from_config(config)?;
        let stats = pipeline.statistics()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
            return Ok(());
        }

        println!("Index: {}", config.store.index_name);
        println!("  Vectors: {}", stats.index.total_vectors);
        match stats.index.dimension {
            Some(dimension) => println!("  Dimension: {}", dimension),
            None => println!("  Dimension: (empty index)"),
        }
        println!(
            "Embedding: {} / {} ({} dimensions)",
            stats.embedding_provider, stats.embedding_model, stats.embedding_dimension
        );

        Ok(())
    }
}
