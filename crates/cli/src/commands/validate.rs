//! Validate command handler.
//!
//! Checks that a file is a readable, non-empty PDF before processing.

use clap::Args;
use clausal_contracts::ContractPipeline;
use clausal_core::{config::AppConfig, AppError, AppResult};
use std::path::PathBuf;

/// Validate a PDF before processing
#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// PDF file to check
    pub path: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ValidateCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing validate command for {:?}", self.path);

        let pipeline = ContractPipeline::from_config(config)?;
        let report = pipeline.validate_pdf(&self.path);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else if report.valid {
            println!(
                "✓ {} is valid: {} characters, {} pages",
                self.path.display(),
                report.text_length.unwrap_or_default(),
                report.page_count.unwrap_or_default()
            );
        } else {
            println!(
                "✗ {} is not valid: {}",
                self.path.display(),
                report.error.as_deref().unwrap_or("Unknown error")
            );
        }

        if report.valid {
            Ok(())
        } else {
            Err(AppError::Other(format!(
                "Validation failed for {:?}",
                self.path
            )))
        }
    }
}
