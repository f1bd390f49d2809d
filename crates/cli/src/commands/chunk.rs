//! Chunk command handler.
//!
//! Runs the chunking engine on a single document and prints the segments,
//! without embedding or indexing anything.

use super::{resolve_strategy, truncate};
use clap::Args;
use clausal_contracts::{AutoSource, ChunkEngine, TextSource};
use clausal_core::{config::AppConfig, AppResult};
use std::path::PathBuf;

const PREVIEW_CHARS: usize = 120;

/// Preview how a document would be chunked
#[derive(Args, Debug)]
pub struct ChunkCommand {
    /// PDF or plain-text file
    pub file: PathBuf,

    /// Chunking strategy (clauses, sentences, paragraphs)
    #[arg(short, long)]
    pub strategy: Option<String>,

    /// Maximum segment size in characters (default from config)
    #[arg(long)]
    pub max_chars: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ChunkCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chunk command for {:?}", self.file);

        let strategy = resolve_strategy(self.strategy.as_deref(), config)?;
        let engine = ChunkEngine::new(&config.chunking)?;
        let extracted = AutoSource.extract(&self.file)?;

        let max_chars = self.max_chars.unwrap_or_else(|| engine.max_chars(strategy));
        let segments = engine.chunk_with_limit(&extracted.text, strategy, max_chars);
        let stats = engine.statistics(&segments);

        if self.json {
            let output = serde_json::json!({
                "file": self.file,
                "strategy": strategy,
                "max_chars": max_chars,
                "segments": segments,
                "statistics": stats,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        for segment in &segments {
            println!(
                "[{}] {} ({}..{}, {} chars)",
                segment.id,
                segment.heading,
                segment.start_position,
                segment.end_position,
                segment.char_len()
            );
            println!("    {}", truncate(&segment.content.replace('\n', " "), PREVIEW_CHARS));
        }

        println!();
        println!(
            "{} segments ({} strategy, max {} chars): avg {:.1}, min {}, max {}, total {}",
            stats.total_chunks,
            strategy,
            max_chars,
            stats.avg_length,
            stats.min_length,
            stats.max_length,
            stats.total_characters
        );

        Ok(())
    }
}
