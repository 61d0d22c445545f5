//! Configuration management for pdfqa.
//!
//! Configuration is layered, later sources winning:
//! 1. Built-in defaults
//! 2. `.env.local` and `.env` in the workspace (never overriding variables
//!    already present in the process environment)
//! 3. The YAML config file (`.pdfqa/config.yaml` unless `--config` is given)
//! 4. Environment variables
//! 5. Command-line flags (`with_overrides`)
//!
//! State written by the tool itself (the index record, the local vector store)
//! lives under `.pdfqa/` in the workspace.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

pub const DEFAULT_CHUNK_SIZE: usize = 10_000;
pub const DEFAULT_OVERLAP_SIZE: usize = 5_000;
pub const DEFAULT_INDEX_NAME: &str = "regqa";
pub const DEFAULT_PINECONE_ENVIRONMENT: &str = "us-west1-gcp-free";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-3.5-turbo-instruct";
pub const DEFAULT_MAX_TOKENS: u32 = 400;

const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["openai", "mock"];
const KNOWN_COMPLETION_PROVIDERS: [&str; 1] = ["openai"];
const KNOWN_BACKENDS: [&str; 2] = ["pinecone", "sqlite"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .pdfqa/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Credentials for the embedding and completion services
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,

    /// Credentials for the hosted vector index
    #[serde(skip_serializing)]
    pub pinecone_api_key: Option<String>,

    /// Default PDF to ingest when none is given on the command line
    pub pdf_path: Option<PathBuf>,

    pub embedding: EmbeddingSettings,
    pub completion: CompletionSettings,
    pub vector_store: VectorStoreSettings,
    pub chunking: ChunkSettings,

    /// Number of matches requested from the index per query
    pub top_k: usize,

    /// Address the HTTP service binds to
    pub bind: String,

    pub database: DatabaseSettings,

    /// Optional HTTP client timeout for all hosted services
    pub request_timeout_secs: Option<u64>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// `.env` files applied to the process environment by `load`
    #[serde(skip)]
    pub env_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingSettings {
    /// "openai" or "mock"
    pub provider: String,
    pub model: String,
    pub endpoint: Option<String>,
    /// Only consulted by the mock provider; hosted models report their own
    pub dimensions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionSettings {
    pub provider: String,
    pub model: String,
    pub endpoint: Option<String>,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorStoreSettings {
    /// "pinecone" or "sqlite"
    pub backend: String,
    pub environment: String,
    pub index_name: String,
    /// SQLite file for the local backend (default `.pdfqa/vectors.db`)
    pub path: Option<PathBuf>,
    /// Control plane base URL override
    pub controller_url: Option<String>,
    /// Data plane base URL override
    pub data_url: Option<String>,
}

/// Fixed-window chunking parameters, in characters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkSettings {
    pub chunk_size: usize,
    pub overlap_size: usize,
}

impl Default for ChunkSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap_size: DEFAULT_OVERLAP_SIZE,
        }
    }
}

impl ChunkSettings {
    pub fn new(chunk_size: usize, overlap_size: usize) -> AppResult<Self> {
        let settings = Self {
            chunk_size,
            overlap_size,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings under which the window would never advance.
    pub fn validate(&self) -> AppResult<()> {
        if self.chunk_size == 0 {
            return Err(AppError::Config("chunk_size must be positive".to_string()));
        }
        if self.overlap_size >= self.chunk_size {
            return Err(AppError::Config(format!(
                "overlap_size ({}) must be smaller than chunk_size ({})",
                self.overlap_size, self.chunk_size
            )));
        }
        Ok(())
    }

    /// Distance between the start offsets of consecutive chunks.
    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap_size
    }
}

/// Relational source used by `ingest --from-db`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseSettings {
    pub table: String,
    pub column: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            table: "pdf_data".to_string(),
            column: "content".to_string(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    pdf_path: Option<String>,
    embedding: Option<EmbeddingSection>,
    completion: Option<CompletionSection>,
    vector_store: Option<VectorStoreSection>,
    chunking: Option<ChunkingSection>,
    retrieval: Option<RetrievalSection>,
    server: Option<ServerSection>,
    database: Option<DatabaseSection>,
    logging: Option<LoggingSection>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmbeddingSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    dimensions: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletionSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VectorStoreSection {
    backend: Option<String>,
    environment: Option<String>,
    index_name: Option<String>,
    path: Option<String>,
    controller_url: Option<String>,
    data_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChunkingSection {
    chunk_size: Option<usize>,
    overlap_size: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalSection {
    top_k: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ServerSection {
    bind: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DatabaseSection {
    table: Option<String>,
    column: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            openai_api_key: None,
            pinecone_api_key: None,
            pdf_path: None,
            embedding: EmbeddingSettings {
                provider: "openai".to_string(),
                model: DEFAULT_EMBEDDING_MODEL.to_string(),
                endpoint: None,
                dimensions: 384,
            },
            completion: CompletionSettings {
                provider: "openai".to_string(),
                model: DEFAULT_COMPLETION_MODEL.to_string(),
                endpoint: None,
                max_tokens: DEFAULT_MAX_TOKENS,
            },
            vector_store: VectorStoreSettings {
                backend: "pinecone".to_string(),
                environment: DEFAULT_PINECONE_ENVIRONMENT.to_string(),
                index_name: DEFAULT_INDEX_NAME.to_string(),
                path: None,
                controller_url: None,
                data_url: None,
            },
            chunking: ChunkSettings::default(),
            top_k: 1,
            bind: "127.0.0.1:5000".to_string(),
            database: DatabaseSettings::default(),
            request_timeout_secs: None,
            log_level: None,
            verbose: false,
            no_color: false,
            env_files: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration for a workspace from files and the process environment.
    ///
    /// Environment variables:
    /// - `OPENAI_API_SECRET` (or `OPENAI_API_KEY`): embedding and completion key
    /// - `PINECONE_API_KEY`: vector index key
    /// - `PINECONE_ENVIRONMENT`: vector index region
    /// - `PINECONE_INDEX_NAME`: index name
    /// - `PDF_PATH`: default PDF source
    /// - `PDFQA_WORKSPACE`, `PDFQA_CONFIG`: workspace and config file
    /// - `RUST_LOG`, `NO_COLOR`: logging
    ///
    /// # Example
    /// ```no_run
    /// use pdfqa_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None, None).expect("Failed to load config");
    /// println!("Index: {}", config.vector_store.index_name);
    /// ```
    pub fn load(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let workspace = workspace
            .or_else(|| std::env::var("PDFQA_WORKSPACE").ok().map(PathBuf::from))
            .unwrap_or_else(|| Self::default().workspace);

        // Runs before logging is set up; the caller logs `env_files`
        let env_files = load_dotenv(&workspace)?;

        let mut config = Self::load_with(workspace, config_file, |key| std::env::var(key).ok())?;
        config.env_files = env_files;
        Ok(config)
    }

    /// Load configuration with an explicit variable lookup.
    pub fn load_with<F>(workspace: PathBuf, config_file: Option<PathBuf>, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            workspace,
            config_file: config_file.or_else(|| lookup("PDFQA_CONFIG").map(PathBuf::from)),
            ..Self::default()
        };

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.state_dir().join("config.yaml"));

        if config_path.exists() {
            config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        config.openai_api_key = lookup("OPENAI_API_SECRET").or_else(|| lookup("OPENAI_API_KEY"));
        config.pinecone_api_key = lookup("PINECONE_API_KEY");

        if let Some(environment) = lookup("PINECONE_ENVIRONMENT") {
            config.vector_store.environment = environment;
        }

        if let Some(index_name) = lookup("PINECONE_INDEX_NAME") {
            config.vector_store.index_name = index_name;
        }

        if let Some(pdf_path) = lookup("PDF_PATH") {
            config.pdf_path = Some(PathBuf::from(pdf_path));
        }

        if let Some(level) = lookup("RUST_LOG") {
            config.log_level = Some(level);
        }

        if lookup("NO_COLOR").is_some() {
            config.no_color = true;
        }

        config.chunking.validate()?;

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &Path) -> AppResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        if let Some(pdf_path) = file.pdf_path {
            self.pdf_path = Some(self.resolve(&pdf_path));
        }

        if let Some(embedding) = file.embedding {
            if let Some(provider) = embedding.provider {
                self.embedding.provider = provider;
            }
            if let Some(model) = embedding.model {
                self.embedding.model = model;
            }
            if let Some(dimensions) = embedding.dimensions {
                self.embedding.dimensions = dimensions;
            }
            self.embedding.endpoint = embedding.endpoint.or(self.embedding.endpoint.take());
        }

        if let Some(completion) = file.completion {
            if let Some(provider) = completion.provider {
                self.completion.provider = provider;
            }
            if let Some(model) = completion.model {
                self.completion.model = model;
            }
            if let Some(max_tokens) = completion.max_tokens {
                self.completion.max_tokens = max_tokens;
            }
            self.completion.endpoint = completion.endpoint.or(self.completion.endpoint.take());
        }

        if let Some(store) = file.vector_store {
            if let Some(backend) = store.backend {
                self.vector_store.backend = backend;
            }
            if let Some(environment) = store.environment {
                self.vector_store.environment = environment;
            }
            if let Some(index_name) = store.index_name {
                self.vector_store.index_name = index_name;
            }
            if let Some(path) = store.path {
                self.vector_store.path = Some(self.resolve(&path));
            }
            self.vector_store.controller_url =
                store.controller_url.or(self.vector_store.controller_url.take());
            self.vector_store.data_url = store.data_url.or(self.vector_store.data_url.take());
        }

        if let Some(chunking) = file.chunking {
            if let Some(chunk_size) = chunking.chunk_size {
                self.chunking.chunk_size = chunk_size;
            }
            if let Some(overlap_size) = chunking.overlap_size {
                self.chunking.overlap_size = overlap_size;
            }
        }

        if let Some(top_k) = file.retrieval.and_then(|r| r.top_k) {
            self.top_k = top_k;
        }

        if let Some(bind) = file.server.and_then(|s| s.bind) {
            self.bind = bind;
        }

        if let Some(database) = file.database {
            if let Some(table) = database.table {
                self.database.table = table;
            }
            if let Some(column) = database.column {
                self.database.column = column;
            }
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        if file.request_timeout_secs.is_some() {
            self.request_timeout_secs = file.request_timeout_secs;
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Flags take precedence over the environment and the config file.
    pub fn with_overrides(
        mut self,
        index_name: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(index_name) = index_name {
            self.vector_store.index_name = index_name;
        }

        if verbose {
            self.verbose = true;
        }

        // An explicit level wins; otherwise -v means debug even when RUST_LOG is set
        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        } else if verbose {
            self.log_level = Some("debug".to_string());
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .pdfqa directory.
    pub fn state_dir(&self) -> PathBuf {
        self.workspace.join(".pdfqa")
    }

    /// Ensure the .pdfqa directory exists.
    pub fn ensure_state_dir(&self) -> AppResult<()> {
        let state_dir = self.state_dir();
        if !state_dir.exists() {
            std::fs::create_dir_all(&state_dir).map_err(|e| {
                AppError::Config(format!("Failed to create .pdfqa directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// SQLite file used by the local vector store backend.
    pub fn vector_db_path(&self) -> PathBuf {
        self.vector_store
            .path
            .clone()
            .unwrap_or_else(|| self.state_dir().join("vectors.db"))
    }

    /// Validate provider names, chunk settings and required credentials.
    pub fn validate(&self) -> AppResult<()> {
        check_known("embedding provider", &self.embedding.provider, &KNOWN_EMBEDDING_PROVIDERS)?;
        check_known("completion provider", &self.completion.provider, &KNOWN_COMPLETION_PROVIDERS)?;
        check_known("vector store backend", &self.vector_store.backend, &KNOWN_BACKENDS)?;

        self.chunking.validate()?;

        if self.top_k == 0 {
            return Err(AppError::Config("top_k must be at least 1".to_string()));
        }

        let needs_openai = self.embedding.provider == "openai" || self.completion.provider == "openai";
        if needs_openai && self.openai_api_key.is_none() {
            return Err(AppError::Config(
                "OpenAI API key not found. Set OPENAI_API_SECRET (or OPENAI_API_KEY)".to_string(),
            ));
        }

        if self.vector_store.backend == "pinecone" && self.pinecone_api_key.is_none() {
            return Err(AppError::Config(
                "Pinecone API key not found. Set PINECONE_API_KEY".to_string(),
            ));
        }

        Ok(())
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = PathBuf::from(path);
        if path.is_absolute() {
            path
        } else {
            self.workspace.join(path)
        }
    }
}

fn check_known(what: &str, value: &str, known: &[&str]) -> AppResult<()> {
    if known.contains(&value) {
        Ok(())
    } else {
        Err(AppError::Config(format!(
            "Unknown {}: {}. Supported: {}",
            what,
            value,
            known.join(", ")
        )))
    }
}

/// Load `.env.local` then `.env` from the workspace, if present.
/// Apply `.env.local` then `.env` without overriding variables already set.
/// Returns the files that were applied.
fn load_dotenv(workspace: &Path) -> AppResult<Vec<PathBuf>> {
    let mut loaded = Vec::new();
    for name in [".env.local", ".env"] {
        let path = workspace.join(name);
        if path.exists() {
            dotenvy::from_path(&path)
                .map_err(|e| AppError::Config(format!("Failed to load {:?}: {}", path, e)))?;
            loaded.push(path);
        }
    }
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.chunking.chunk_size, 10_000);
        assert_eq!(config.chunking.overlap_size, 5_000);
        assert_eq!(config.vector_store.index_name, "regqa");
        assert_eq!(config.vector_store.environment, "us-west1-gcp-free");
        assert_eq!(config.embedding.model, "text-embedding-ada-002");
        assert_eq!(config.completion.max_tokens, 400);
        assert_eq!(config.top_k, 1);
        assert!(!config.verbose);
    }

    #[test]
    fn test_state_dir() {
        let config = AppConfig::default();
        assert!(config.state_dir().ends_with(".pdfqa"));
        assert!(config.vector_db_path().ends_with(".pdfqa/vectors.db"));
    }

    #[test]
    fn test_env_variables_are_read() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig::load_with(
            temp.path().to_path_buf(),
            None,
            lookup_from(&[
                ("OPENAI_API_SECRET", "sk-test"),
                ("PINECONE_API_KEY", "pc-test"),
                ("PINECONE_INDEX_NAME", "handbook"),
                ("PDF_PATH", "/data/handbook.pdf"),
            ]),
        )
        .unwrap();

        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.pinecone_api_key.as_deref(), Some("pc-test"));
        assert_eq!(config.vector_store.index_name, "handbook");
        assert_eq!(config.pdf_path, Some(PathBuf::from("/data/handbook.pdf")));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_openai_key_alias() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig::load_with(
            temp.path().to_path_buf(),
            None,
            lookup_from(&[("OPENAI_API_KEY", "sk-alias")]),
        )
        .unwrap();
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-alias"));
    }

    #[test]
    fn test_yaml_then_env_precedence() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join(".pdfqa")).unwrap();
        std::fs::write(
            temp.path().join(".pdfqa/config.yaml"),
            r#"
embedding:
  provider: mock
  dimensions: 64
vectorStore:
  backend: sqlite
  indexName: from-yaml
chunking:
  chunkSize: 800
  overlapSize: 200
retrieval:
  topK: 3
server:
  bind: 0.0.0.0:8080
logging:
  color: false
"#,
        )
        .unwrap();

        let config = AppConfig::load_with(
            temp.path().to_path_buf(),
            None,
            lookup_from(&[("PINECONE_INDEX_NAME", "from-env")]),
        )
        .unwrap();

        assert_eq!(config.embedding.provider, "mock");
        assert_eq!(config.embedding.dimensions, 64);
        assert_eq!(config.vector_store.backend, "sqlite");
        assert_eq!(config.vector_store.index_name, "from-env");
        assert_eq!(config.chunking, ChunkSettings::new(800, 200).unwrap());
        assert_eq!(config.top_k, 3);
        assert_eq!(config.bind, "0.0.0.0:8080");
        assert!(config.no_color);
    }

    #[test]
    fn test_bad_overlap_rejected_at_load() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("custom.yaml");
        std::fs::write(&config_path, "chunking:\n  chunkSize: 100\n  overlapSize: 100\n").unwrap();

        let err = AppConfig::load_with(temp.path().to_path_buf(), Some(config_path), lookup_from(&[]))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let temp = TempDir::new().unwrap();
        let result = AppConfig::load_with(
            temp.path().to_path_buf(),
            Some(temp.path().join("absent.yaml")),
            lookup_from(&[]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_chunk_settings_validation() {
        assert!(ChunkSettings::new(10, 5).is_ok());
        assert!(ChunkSettings::new(10, 10).is_err());
        assert!(ChunkSettings::new(10, 11).is_err());
        assert!(ChunkSettings::new(0, 0).is_err());
        assert_eq!(ChunkSettings::default().stride(), 5_000);
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(Some("other".to_string()), None, true, false);

        assert_eq!(overridden.vector_store.index_name, "other");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_verbose_beats_rust_log_from_environment() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig::load_with(
            temp.path().to_path_buf(),
            None,
            lookup_from(&[("RUST_LOG", "warn")]),
        )
        .unwrap();
        assert_eq!(config.log_level.as_deref(), Some("warn"));

        let verbose = config.clone().with_overrides(None, None, true, false);
        assert_eq!(verbose.log_level.as_deref(), Some("debug"));

        let explicit = config.with_overrides(None, Some("trace".to_string()), true, false);
        assert_eq!(explicit.log_level.as_deref(), Some("trace"));
    }

    #[test]
    fn test_load_dotenv_reports_applied_files() {
        let temp = TempDir::new().unwrap();
        assert!(load_dotenv(temp.path()).unwrap().is_empty());

        std::fs::write(temp.path().join(".env"), "PDFQA_DOTENV_TEST_MARKER=1\n").unwrap();
        let loaded = load_dotenv(temp.path()).unwrap();
        assert_eq!(loaded, vec![temp.path().join(".env")]);
        assert_eq!(std::env::var("PDFQA_DOTENV_TEST_MARKER").unwrap(), "1");
    }

    #[test]
    fn test_malformed_dotenv_is_config_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(".env.local"), "PDFQA_BROKEN=\"unterminated\n").unwrap();
        assert!(matches!(load_dotenv(temp.path()), Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_missing_credentials() {
        let config = AppConfig::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_SECRET"));

        let mut config = AppConfig::default();
        config.openai_api_key = Some("sk".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("PINECONE_API_KEY"));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.embedding.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }
}
