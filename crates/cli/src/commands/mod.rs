//! Command handlers for the clausal CLI.
//!
//! Each subcommand lives in its own submodule.

pub mod batch;
pub mod chunk;
pub mod clear;
pub mod process;
pub mod search;
pub mod stats;
pub mod validate;

// Re-export command types for convenience
pub use batch::BatchCommand;
pub use chunk::ChunkCommand;
pub use clear::ClearCommand;
pub use process::ProcessCommand;
pub use search::SearchCommand;
pub use stats::StatsCommand;
pub use validate::ValidateCommand;

use clausal_contracts::{ChunkStrategy, ProcessReport};
use clausal_core::{AppConfig, AppError, AppResult};

/// The `--strategy` flag, or the configured default.
pub(crate) fn resolve_strategy(arg: Option<&str>, config: &AppConfig) -> AppResult<ChunkStrategy> {
    arg.unwrap_or(&config.chunking.default_strategy).parse()
}

/// First `max` characters of `text`, with an ellipsis when cut.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max).collect();
    format!("{}...", head)
}

pub(crate) fn print_reports(reports: &[ProcessReport], json: bool) -> AppResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }

    for report in reports {
        if report.success {
            println!(
                "✓ {} ({} strategy): {} chars, {} chunks, {} embeddings",
                report.path.display(),
                report.strategy,
                report.text_length,
                report.chunks_created,
                report.embeddings_generated
            );
            if let Some(stats) = &report.chunk_statistics {
                println!(
                    "  chunk lengths: avg {:.1}, min {}, max {}",
                    stats.avg_length, stats.min_length, stats.max_length
                );
            }
        } else {
            println!(
                "✗ {}: {}",
                report.path.display(),
                report.error.as_deref().unwrap_or("Unknown error")
            );
        }
    }

    Ok(())
}

/// Error when any report failed, so the process exits non-zero.
pub(crate) fn check_reports(reports: &[ProcessReport]) -> AppResult<()> {
    let failed = reports.iter().filter(|r| !r.success).count();
    if failed > 0 {
        return Err(AppError::Other(format!(
            "{} of {} contracts failed to process",
            failed,
            reports.len()
        )));
    }
    Ok(())
}
