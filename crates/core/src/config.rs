//! Configuration management for clausal.
//!
//! Configuration is layered, later sources winning:
//! - Built-in defaults
//! - Config file (`.clausal/config.yaml`, or `CLAUSAL_CONFIG`)
//! - Environment variables
//! - Command-line flags (`AppConfig::with_overrides`)
//!
//! The resulting [`AppConfig`] is passed explicitly to the components that
//! need it; nothing reads settings from global state.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default clause-heading pattern: an outline number (`12`, `12.3`, `1.2.3`)
/// followed by a capitalized word and the rest of the line. Compiled in
/// multi-line mode by the boundary detector.
pub const DEFAULT_CLAUSE_PATTERN: &str = r"(?:^|\n)(\d+(?:\.\d+)*\s+[A-Z][^\n]+)";

/// Embedding providers that `create_provider` knows how to build.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["hash", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .clausal/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    pub chunking: ChunkingConfig,

    pub embedding: EmbeddingConfig,

    pub store: StoreConfig,

    pub search: SearchConfig,
}

/// Settings for the chunking engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Regular expression recognizing clause headings
    pub clause_pattern: String,

    /// Size bound for clause chunks before they are re-split
    pub clause_max_chars: usize,

    /// Size bound for sentence chunks
    pub sentence_max_chars: usize,

    /// Size bound for paragraph chunks before they are re-split
    pub paragraph_max_chars: usize,

    /// Strategy used when the caller does not name one
    pub default_strategy: String,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            clause_pattern: DEFAULT_CLAUSE_PATTERN.to_string(),
            clause_max_chars: 3000,
            sentence_max_chars: 1000,
            paragraph_max_chars: 2000,
            default_strategy: "clauses".to_string(),
        }
    }
}

/// Settings for the embedding collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider name: "hash" or "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Number of texts embedded (and vectors upserted) per batch
    pub batch_size: usize,

    /// Provider endpoint, e.g. the Ollama base URL
    pub endpoint: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "hash".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            batch_size: 100,
            endpoint: None,
        }
    }
}

/// Settings for the vector store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Name of the vector collection; also the database file stem
    pub index_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            index_name: "contract-clauses".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of matches returned when the caller does not ask for a count
    pub default_top_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { default_top_k: 3 }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    chunking: Option<ChunkingConfig>,
    embedding: Option<EmbeddingConfig>,
    store: Option<StoreConfig>,
    search: Option<SearchConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            chunking: ChunkingConfig::default(),
            embedding: EmbeddingConfig::default(),
            store: StoreConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and the environment.
    ///
    /// Environment variables:
    /// - `CLAUSAL_WORKSPACE`: Override workspace path
    /// - `CLAUSAL_CONFIG`: Path to config file
    /// - `CLAUSAL_INDEX_NAME`: Vector collection name
    /// - `CLAUSAL_EMBEDDING_PROVIDER`, `CLAUSAL_EMBEDDING_MODEL`, `CLAUSAL_EMBEDDING_DIMENSION`
    /// - `CLAUSAL_DEFAULT_TOP_K`: Default number of search results
    /// - `OLLAMA_URL`: Ollama endpoint
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use clausal_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Index: {}", config.store.index_name);
    /// ```
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("CLAUSAL_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("CLAUSAL_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.clausal_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        config.apply_env(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    pub fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        self.merge_yaml_str(&contents).map_err(|e| match e {
            AppError::Config(msg) => AppError::Config(format!("{} ({:?})", msg, path)),
            other => other,
        })
    }

    fn merge_yaml_str(&self, contents: &str) -> AppResult<Self> {
        let config_file: ConfigFile = serde_yaml::from_str(contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file: {}", e)))?;

        let mut result = self.clone();

        if let Some(ws) = config_file.workspace {
            if let Some(path) = ws.path {
                result.workspace = PathBuf::from(path);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(chunking) = config_file.chunking {
            result.chunking = chunking;
        }
        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }
        if let Some(store) = config_file.store {
            result.store = store;
        }
        if let Some(search) = config_file.search {
            result.search = search;
        }

        Ok(result)
    }

    /// Apply environment overrides using `var` as the lookup.
    pub fn apply_env<F>(&mut self, var: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(index_name) = var("CLAUSAL_INDEX_NAME") {
            self.store.index_name = index_name;
        }

        if let Some(provider) = var("CLAUSAL_EMBEDDING_PROVIDER") {
            self.embedding.provider = provider;
        }

        if let Some(model) = var("CLAUSAL_EMBEDDING_MODEL") {
            self.embedding.model = model;
        }

        if let Some(dimension) = var("CLAUSAL_EMBEDDING_DIMENSION") {
            self.embedding.dimensions = parse_usize("CLAUSAL_EMBEDDING_DIMENSION", &dimension)?;
        }

        if let Some(top_k) = var("CLAUSAL_DEFAULT_TOP_K") {
            self.search.default_top_k = parse_usize("CLAUSAL_DEFAULT_TOP_K", &top_k)?;
        }

        if let Some(endpoint) = var("OLLAMA_URL") {
            self.embedding.endpoint = Some(endpoint);
        }

        if let Some(level) = var("RUST_LOG") {
            self.log_level = Some(level);
        }

        if var("NO_COLOR").is_some() {
            self.no_color = true;
        }

        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over the file and the environment.
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .clausal directory.
    pub fn clausal_dir(&self) -> PathBuf {
        self.workspace.join(".clausal")
    }

    /// Ensure the .clausal directory exists.
    pub fn ensure_clausal_dir(&self) -> AppResult<()> {
        let dir = self.clausal_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .clausal directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Path of the SQLite file backing the configured vector collection.
    pub fn index_path(&self) -> PathBuf {
        self.clausal_dir()
            .join(format!("{}.db", self.store.index_name))
    }

    /// Validate settings that would otherwise fail deep inside a pipeline run.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.embedding.provider.as_str();
        if !KNOWN_EMBEDDING_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        let sizes = [
            ("chunking.clause_max_chars", self.chunking.clause_max_chars),
            ("chunking.sentence_max_chars", self.chunking.sentence_max_chars),
            ("chunking.paragraph_max_chars", self.chunking.paragraph_max_chars),
            ("embedding.dimensions", self.embedding.dimensions),
            ("embedding.batch_size", self.embedding.batch_size),
            ("search.default_top_k", self.search.default_top_k),
        ];
        for (name, value) in sizes {
            if value == 0 {
                return Err(AppError::Config(format!("{} must be greater than zero", name)));
            }
        }

        if self.store.index_name.trim().is_empty() {
            return Err(AppError::Config("store.index_name must not be empty".to_string()));
        }

        Ok(())
    }
}

fn parse_usize(name: &str, value: &str) -> AppResult<usize> {
    value.trim().parse::<usize>().map_err(|e| {
        AppError::Config(format!("{} must be a positive integer, got '{}': {}", name, value, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.chunking.clause_max_chars, 3000);
        assert_eq!(config.chunking.sentence_max_chars, 1000);
        assert_eq!(config.chunking.paragraph_max_chars, 2000);
        assert_eq!(config.embedding.provider, "hash");
        assert_eq!(config.embedding.dimensions, 384);
        assert_eq!(config.store.index_name, "contract-clauses");
        assert_eq!(config.search.default_top_k, 3);
        assert!(!config.verbose);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_index_path() {
        let config = AppConfig {
            workspace: PathBuf::from("/tmp/ws"),
            ..Default::default()
        };
        assert_eq!(
            config.index_path(),
            PathBuf::from("/tmp/ws/.clausal/contract-clauses.db")
        );
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden =
            config.with_overrides(Some(PathBuf::from("/tmp")), None, true, false);

        assert_eq!(overridden.workspace, PathBuf::from("/tmp"));
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml_partial_sections() {
        let yaml = r#"
chunking:
  clause_max_chars: 1500
embedding:
  provider: ollama
  model: nomic-embed-text
  dimensions: 768
logging:
  color: false
"#;
        let merged = AppConfig::default().merge_yaml_str(yaml).unwrap();

        assert_eq!(merged.chunking.clause_max_chars, 1500);
        // Unspecified fields keep their defaults
        assert_eq!(merged.chunking.sentence_max_chars, 1000);
        assert_eq!(merged.chunking.clause_pattern, DEFAULT_CLAUSE_PATTERN);
        assert_eq!(merged.embedding.provider, "ollama");
        assert_eq!(merged.embedding.dimensions, 768);
        assert_eq!(merged.embedding.batch_size, 100);
        assert!(merged.no_color);
        assert_eq!(merged.search.default_top_k, 3);
    }

    #[test]
    fn test_merge_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "store:\n  index_name: leases\n").unwrap();

        let merged = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(merged.store.index_name, "leases");
    }

    #[test]
    fn test_merge_yaml_invalid() {
        let result = AppConfig::default().merge_yaml_str("chunking: [1, 2");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_apply_env() {
        let vars: HashMap<&str, &str> = [
            ("CLAUSAL_INDEX_NAME", "ndas"),
            ("CLAUSAL_EMBEDDING_DIMENSION", "768"),
            ("CLAUSAL_DEFAULT_TOP_K", "5"),
            ("OLLAMA_URL", "http://gpu-box:11434"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_env(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.store.index_name, "ndas");
        assert_eq!(config.embedding.dimensions, 768);
        assert_eq!(config.search.default_top_k, 5);
        assert_eq!(
            config.embedding.endpoint.as_deref(),
            Some("http://gpu-box:11434")
        );
    }

    #[test]
    fn test_apply_env_bad_number() {
        let mut config = AppConfig::default();
        let result = config.apply_env(|k| {
            (k == "CLAUSAL_DEFAULT_TOP_K").then(|| "three".to_string())
        });
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.embedding.provider = "pinecone".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_size() {
        let mut config = AppConfig::default();
        config.chunking.sentence_max_chars = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sentence_max_chars"));
    }
}
