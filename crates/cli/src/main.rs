//! Clausal CLI
//!
//! Main entry point for the clausal command-line tool.
//! Indexes PDF contracts clause by clause and searches them in natural language.

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use clausal_core::{config::AppConfig, logging};
use commands::{
    BatchCommand, ChunkCommand, ClearCommand, ProcessCommand, SearchCommand, StatsCommand,
    ValidateCommand,
};
use std::path::PathBuf;

/// Clausal - semantic search over PDF contracts
#[derive(Parser, Debug)]
#[command(name = "clausal")]
#[command(about = "Semantic search over PDF contracts", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "CLAUSAL_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "CLAUSAL_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process contract PDFs into the index
    Process(ProcessCommand),

    /// Process every PDF in a directory
    Batch(BatchCommand),

    /// Search indexed contracts
    Search(SearchCommand),

    /// Show index statistics
    Stats(StatsCommand),

    /// Delete every vector from the index
    Clear(ClearCommand),

    /// Validate a PDF before processing
    Validate(ValidateCommand),

    /// Preview how a document would be chunked
    Chunk(ChunkCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Process(_) => "process",
            Commands::Batch(_) => "batch",
            Commands::Search(_) => "search",
            Commands::Stats(_) => "stats",
            Commands::Clear(_) => "clear",
            Commands::Validate(_) => "validate",
            Commands::Chunk(_) => "chunk",
        }
    }
}

/// Defaults, then the config file, then the environment, then CLI flags.
fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::load().context("Failed to load configuration")?;

    // A --workspace flag points at a different .clausal/config.yaml
    if cli.config.is_none() && config.config_file.is_none() {
        if let Some(workspace) = &cli.workspace {
            let candidate = workspace.join(".clausal").join("config.yaml");
            if candidate.exists() {
                config = config
                    .merge_yaml(&candidate)
                    .with_context(|| format!("Failed to read {:?}", candidate))?;
                config.apply_env(|key| std::env::var(key).ok())?;
            }
        }
    }

    if let Some(path) = &cli.config {
        if config.config_file.as_ref() != Some(path) {
            config = config
                .merge_yaml(path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            config.config_file = Some(path.clone());
            config.apply_env(|key| std::env::var(key).ok())?;
        }
    }

    let config = config.with_overrides(
        cli.workspace.clone(),
        cli.log_level.clone(),
        cli.verbose,
        cli.no_color,
    );
    config.validate()?;

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let config = load_config(&cli)?;

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Clausal CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!(
        "Embedding: {} / {}",
        config.embedding.provider,
        config.embedding.model
    );

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    // Route to command handlers
    let result = match &cli.command {
        Commands::Process(cmd) => cmd.execute(&config).await,
        Commands::Batch(cmd) => cmd.execute(&config).await,
        Commands::Search(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
        Commands::Clear(cmd) => cmd.execute(&config).await,
        Commands::Validate(cmd) => cmd.execute(&config).await,
        Commands::Chunk(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    Ok(result?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search_with_filters() {
        let cli = Cli::parse_from([
            "clausal",
            "search",
            "termination notice",
            "-k",
            "5",
            "--filter",
            "source=msa.pdf",
            "--filter",
            "heading=1 Termination",
        ]);

        match cli.command {
            Commands::Search(cmd) => {
                assert_eq!(cmd.query.as_deref(), Some("termination notice"));
                assert_eq!(cmd.top_k, Some(5));
                assert_eq!(cmd.filter.len(), 2);
                assert!(!cmd.interactive);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_interactive_search_needs_no_query() {
        let cli = Cli::parse_from(["clausal", "search", "--interactive"]);
        assert_eq!(cli.command.name(), "search");

        assert!(Cli::try_parse_from(["clausal", "search"]).is_err());
    }

    #[test]
    fn test_process_requires_paths() {
        assert!(Cli::try_parse_from(["clausal", "process"]).is_err());

        let cli = Cli::parse_from(["clausal", "process", "a.pdf", "b.pdf", "-s", "sentences"]);
        match cli.command {
            Commands::Process(cmd) => {
                assert_eq!(cmd.paths.len(), 2);
                assert_eq!(cmd.strategy.as_deref(), Some("sentences"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
