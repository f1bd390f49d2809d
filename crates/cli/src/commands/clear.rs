//! Clear command handler.

use clap::Args;
use clausal_contracts::ContractPipeline;
use clausal_core::{config::AppConfig, AppResult};
use std::io::{BufRead, Write};

/// Delete every vector from the index
#[derive(Args, Debug)]
pub struct ClearCommand {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl ClearCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing clear command");

        if !self.yes && !confirm(&config.store.index_name)? {
            println!("Aborted.");
            return Ok(());
        }

        let pipeline = ContractPipeline::from_config(config)?;
        pipeline.clear()?;
        println!("Index '{}' cleared", config.store.index_name);

        Ok(())
    }
}

fn confirm(index_name: &str) -> AppResult<bool> {
    print!("Delete all vectors from index '{}'? [y/N] ", index_name);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
