//! Batch command handler.
//!
//! Processes every PDF found under a directory.

use super::{check_reports, print_reports, resolve_strategy};
use clap::Args;
use clausal_contracts::{extract::is_pdf, ContractPipeline};
use clausal_core::{config::AppConfig, AppError, AppResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Process every PDF in a directory
#[derive(Args, Debug)]
pub struct BatchCommand {
    /// Directory to scan (recursively)
    pub dir: PathBuf,

    /// Chunking strategy (clauses, sentences, paragraphs)
    #[arg(short, long)]
    pub strategy: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl BatchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing batch command for {:?}", self.dir);

        if !self.dir.is_dir() {
            return Err(AppError::NotFound(format!(
                "Directory not found: {:?}",
                self.dir
            )));
        }

        let strategy = resolve_strategy(self.strategy.as_deref(), config)?;
        let paths = find_pdfs(&self.dir);
        if paths.is_empty() {
            println!("No PDF files found in {}", self.dir.display());
            return Ok(());
        }

        let pipeline = ContractPipeline::from_config(config)?;
        let reports = pipeline.batch_process(&paths, strategy).await;

        print_reports(&reports, self.json)?;
        if !self.json {
            let successful = reports.iter().filter(|r| r.success).count();
            println!("\n{}/{} contracts processed", successful, reports.len());
        }

        check_reports(&reports)
    }
}

/// PDF files under `dir`, sorted by path.
fn find_pdfs(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_pdf(e.path()))
        .map(|e| e.into_path())
        .collect();

    paths.sort();
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_pdfs_recurses_and_filters() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("2024")).unwrap();
        std::fs::write(dir.path().join("b.pdf"), b"").unwrap();
        std::fs::write(dir.path().join("2024").join("a.PDF"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let found = find_pdfs(dir.path());
        assert_eq!(
            found,
            vec![dir.path().join("2024").join("a.PDF"), dir.path().join("b.pdf")]
        );
    }
}
