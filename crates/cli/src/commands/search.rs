//! Search command handler.
//!
//! Natural-language search over indexed clauses, one-shot or interactive.

use super::truncate;
use clap::Args;
use clausal_contracts::{ContractPipeline, MetadataFilter, SearchHit};
use clausal_core::{config::AppConfig, AppResult};
use std::io::{BufRead, Write};

/// Characters of content shown per result
const PREVIEW_CHARS: usize = 200;
const INTERACTIVE_PREVIEW_CHARS: usize = 150;

const EXIT_WORDS: [&str; 3] = ["quit", "exit", "q"];

/// Search indexed contracts
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Query text (omit with --interactive)
    #[arg(required_unless_present = "interactive")]
    pub query: Option<String>,

    /// Number of results to return (default from config)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Metadata filter, repeatable (key=value)
    #[arg(long)]
    pub filter: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Read queries from stdin until "quit"
    #[arg(short, long)]
    pub interactive: bool,
}

impl SearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing search command");

        let filter = MetadataFilter::parse(self.filter.as_slice())?;
        let pipeline = ContractPipeline::from_config(config)?;

        if let Some(query) = &self.query {
            let hits = pipeline.search(query, self.top_k, Some(&filter)).await?;
            self.print_hits(query, &hits, PREVIEW_CHARS)?;
        }

        if self.interactive {
            self.run_interactive(&pipeline, &filter).await?;
        }

        Ok(())
    }

    async fn run_interactive(
        &self,
        pipeline: &ContractPipeline,
        filter: &MetadataFilter,
    ) -> AppResult<()> {
        println!("Interactive contract search. Type 'quit' to exit.");

        let stdin = std::io::stdin();
        let mut lines = stdin.lock().lines();

        loop {
            print!("\nQuery: ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next() else {
                break;
            };
            let line = line?;
            let query = line.trim();

            if query.is_empty() {
                continue;
            }
            if EXIT_WORDS.contains(&query.to_lowercase().as_str()) {
                break;
            }

            match pipeline.search(query, self.top_k, Some(filter)).await {
                Ok(hits) => self.print_hits(query, &hits, INTERACTIVE_PREVIEW_CHARS)?,
                Err(e) => {
                    tracing::error!("Search failed: {}", e);
                    println!("Search failed: {}", e);
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn print_hits(&self, query: &str, hits: &[SearchHit], preview_chars: usize) -> AppResult<()> {
        if self.json {
            let output = serde_json::json!({
                "query": query,
                "results": hits,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        if hits.is_empty() {
            println!("No relevant clauses found.");
            return Ok(());
        }

        println!("Results for: {}", query);
        for (i, hit) in hits.iter().enumerate() {
            println!();
            println!("{}. {} (score: {:.3})", i + 1, hit.heading, hit.score);
            if let Some(source) = &hit.source {
                println!("   source: {}", source);
            }
            println!("   {}", truncate(&hit.content, preview_chars));
        }

        Ok(())
    }
}
