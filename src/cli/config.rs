//! Configuration management for RagBuddy
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.ragbuddy/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{RagError, Result};
use crate::generation::{Generator, MockGenerator, OllamaGenerator, DEFAULT_MODEL};
use crate::rag::chunker::ChunkerConfig;
use crate::rag::pipeline::{CostConfig, EmbeddingConfig, IndexConfig, RagConfig, RetrievalConfig};

/// Environment variable selecting the mock (true) or Ollama (false) backend
pub const MOCK_ENV_VAR: &str = "RAGBUDDY_USE_MOCK_LLM";

/// Complete configuration for RagBuddy
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub chunking: ChunkerConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub cost: CostConfig,
}

/// Answer backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Answer from retrieved context without a model
    pub use_mock: bool,
    pub host: String,
    pub port: u16,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            use_mock: true,
            host: "127.0.0.1".to_string(),
            port: 11434,
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config = match path {
            Some(config_path) => Self::load_from_file(&config_path)?,
            None => Self::load_default()?,
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RagError::Config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| RagError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// ~/.ragbuddy/config.toml, when a home directory is known
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".ragbuddy").join("config.toml"))
    }

    /// Apply environment overrides
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var(MOCK_ENV_VAR) {
            self.apply_mock_override(&value)?;
        }
        Ok(())
    }

    /// Set the backend choice from a boolean-ish string
    pub fn apply_mock_override(&mut self, value: &str) -> Result<()> {
        self.generation.use_mock = match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            other => {
                return Err(RagError::Config(format!(
                    "{} must be true or false, got '{}'",
                    MOCK_ENV_VAR, other
                )))
            }
        };
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.rag_config().validate()?;

        if self.generation.model.trim().is_empty() {
            return Err(RagError::Config("generation model must not be empty".to_string()));
        }

        if self.generation.timeout_secs == 0 {
            return Err(RagError::Config(
                "generation timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| RagError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RagError::Config(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| RagError::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Pretty TOML of the effective configuration
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| RagError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Pipeline half of the configuration
    pub fn rag_config(&self) -> RagConfig {
        RagConfig {
            chunking: self.chunking.clone(),
            embedding: self.embedding.clone(),
            index: self.index.clone(),
            retrieval: self.retrieval.clone(),
            cost: self.cost.clone(),
        }
    }

    /// Get Ollama base URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.generation.host, self.generation.port)
    }

    /// Instantiate the configured answer backend
    pub fn build_generator(&self) -> Result<Arc<dyn Generator>> {
        if self.generation.use_mock {
            return Ok(Arc::new(MockGenerator::new()));
        }

        let client = OllamaGenerator::with_config(
            &self.ollama_url(),
            &self.generation.model,
            Duration::from_secs(self.generation.timeout_secs),
        )?;
        Ok(Arc::new(client))
    }

    /// Whether the configured backend answers; the mock always does
    pub async fn backend_reachable(&self) -> Result<bool> {
        if self.generation.use_mock {
            return Ok(true);
        }

        let client = OllamaGenerator::with_config(
            &self.ollama_url(),
            &self.generation.model,
            Duration::from_secs(self.generation.timeout_secs),
        )?;
        Ok(client.health_check().await)
    }
}
