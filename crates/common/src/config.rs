use crate::error::NavigatorError;
use crate::logger::parse_log_level;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "navigator.toml";

/// Navigator application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the curated use case CSV
    pub data_path: PathBuf,

    /// Directory holding the persisted embedding cache
    pub cache_dir: PathBuf,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Where the embedding model weights are downloaded to
    pub model_cache_dir: PathBuf,

    /// Texts per embedding batch
    pub embed_batch_size: usize,

    /// Result count when the caller does not ask for one
    pub default_top_k: usize,

    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// Log directory
    pub log_dir: PathBuf,

    /// Log level
    pub log_level: String,

    /// Chat completion API base URL
    pub openrouter_base_url: String,

    /// Chat completion API key
    #[serde(default)]
    pub openrouter_api_key: Option<String>,

    /// Chat model used by the assistant
    pub assistant_model: String,

    /// Sampling temperature for the assistant
    pub assistant_temperature: f32,

    /// Records retrieved as assistant context
    pub assistant_context_k: usize,
}

/// Locations of the two persisted cache artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePaths {
    /// Row-major f32 embedding matrix
    pub embeddings: PathBuf,

    /// Fingerprint and checksum manifest
    pub manifest: PathBuf,
}

impl CachePaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            embeddings: dir.join("embeddings.bin"),
            manifest: dir.join("cache_manifest.json"),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("./data/ai_use_cases.csv"),
            cache_dir: PathBuf::from("./data/cache"),
            embedding_model: "all-MiniLM-L6-v2".to_string(),
            model_cache_dir: PathBuf::from("./data/models"),
            embed_batch_size: 64,
            default_top_k: 5,
            server_host: "0.0.0.0".to_string(),
            server_port: 8080,
            log_dir: PathBuf::from("./data/log"),
            log_level: "info".to_string(),
            openrouter_base_url: "https://openrouter.ai/api/v1".to_string(),
            openrouter_api_key: None,
            assistant_model: "mistralai/mistral-7b-instruct".to_string(),
            assistant_temperature: 0.7,
            assistant_context_k: 5,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional TOML file and the environment
    ///
    /// Precedence, lowest first: built-in defaults, the config file
    /// (`file` or `navigator.toml` when present), `.env` + process environment.
    pub fn load(file: Option<&Path>) -> Result<Self, NavigatorError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let defaults = Config::try_from(&AppConfig::default())
            .map_err(|e| NavigatorError::config(format!("Invalid default configuration: {}", e)))?;

        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config: AppConfig = Config::builder()
            .add_source(defaults)
            .add_source(file_source)
            .add_source(Environment::default())
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| NavigatorError::config(format!("Failed to load configuration: {}", e)))?;

        config.validate()?;

        // Ensure required directories exist
        config.ensure_directories()?;

        Ok(config)
    }

    /// Ensure required directories exist, create if not
    pub fn ensure_directories(&self) -> Result<(), NavigatorError> {
        let dirs = vec![&self.cache_dir, &self.log_dir];

        for dir in dirs {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    NavigatorError::config(format!(
                        "Failed to create directory {}: {}",
                        dir.display(),
                        e
                    ))
                })?;
            }
        }

        Ok(())
    }

    /// Cache artifact locations inside `cache_dir`
    pub fn cache_paths(&self) -> CachePaths {
        CachePaths::in_dir(&self.cache_dir)
    }

    /// Get log file path
    pub fn get_log_path(&self, filename: &str) -> PathBuf {
        self.log_dir.join(filename)
    }

    /// Get server bind address (host:port)
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// API key if one is configured and non-blank
    pub fn api_key(&self) -> Option<&str> {
        self.openrouter_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), NavigatorError> {
        if self.embedding_model.trim().is_empty() {
            return Err(NavigatorError::config("Embedding model name cannot be empty"));
        }

        if !self.openrouter_base_url.starts_with("http://")
            && !self.openrouter_base_url.starts_with("https://")
        {
            return Err(NavigatorError::config(
                "OpenRouter base URL must start with http:// or https://",
            ));
        }

        if parse_log_level(&self.log_level).is_none() {
            return Err(NavigatorError::config(format!(
                "Unknown log level '{}' (expected trace, debug, info, warn or error)",
                self.log_level
            )));
        }

        if self.server_port == 0 {
            return Err(NavigatorError::config("Server port cannot be 0"));
        }

        if self.default_top_k == 0 {
            return Err(NavigatorError::config("default_top_k must be at least 1"));
        }

        if self.embed_batch_size == 0 {
            return Err(NavigatorError::config("embed_batch_size must be at least 1"));
        }

        if !(0.0..=2.0).contains(&self.assistant_temperature) {
            return Err(NavigatorError::config(
                "assistant_temperature must be between 0.0 and 2.0",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.embedding_model, "all-MiniLM-L6-v2");
        assert_eq!(config.default_top_k, 5);
        assert!(config.api_key().is_none());
    }

    #[test]
    fn test_server_bind_address() {
        let config = AppConfig::default();
        assert_eq!(config.server_bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_validate() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());

        let mut invalid_config = AppConfig::default();
        invalid_config.embedding_model = String::new();
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = AppConfig::default();
        invalid_config.default_top_k = 0;
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = AppConfig::default();
        invalid_config.openrouter_base_url = "openrouter.ai".to_string();
        assert!(invalid_config.validate().is_err());
    }

    #[test]
    fn test_blank_api_key_is_none() {
        let mut config = AppConfig::default();
        config.openrouter_api_key = Some("   ".to_string());
        assert!(config.api_key().is_none());

        config.openrouter_api_key = Some("sk-test".to_string());
        assert_eq!(config.api_key(), Some("sk-test"));
    }

    #[test]
    fn test_cache_paths() {
        let paths = CachePaths::in_dir(Path::new("/tmp/cache"));
        assert_eq!(paths.embeddings, PathBuf::from("/tmp/cache/embeddings.bin"));
        assert_eq!(paths.manifest, PathBuf::from("/tmp/cache/cache_manifest.json"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("navigator.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "cache_dir = \"{}\"\nlog_dir = \"{}\"\nassistant_context_k = 3\nembedding_model = \"bge-small-en-v1.5\"",
            dir.path().join("cache").display(),
            dir.path().join("log").display()
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.assistant_context_k, 3);
        assert_eq!(config.embedding_model, "bge-small-en-v1.5");
        assert!(dir.path().join("cache").exists());
        assert!(dir.path().join("log").exists());
    }
}
