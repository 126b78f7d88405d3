/// Configuration module for ragserve.
///
/// Handles loading, validating, and providing default configuration values.
/// The generative-model API key is taken from the environment, never from
/// the config file.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Environment variable holding the generative-model API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

// ── Default value functions ──────────────────────────────────────────

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_db_path() -> String {
    "./data/vectors.db".to_string()
}

fn default_static_dir() -> String {
    "./static".to_string()
}

fn default_chunk_size() -> usize {
    500
}

fn default_chunk_overlap() -> usize {
    50
}

fn default_search_top_k() -> usize {
    3
}

fn default_model_name() -> String {
    "paraphrase-multilingual-MiniLM-L12-v2".to_string()
}

fn default_dimensions() -> usize {
    384
}

fn default_llm_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_llm_base_url() -> String {
    crate::llm::DEFAULT_BASE_URL.to_string()
}

fn default_temperature() -> f32 {
    0.7
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    #[serde(default = "default_search_top_k")]
    pub search_top_k: usize,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    /// From the environment, not the config file.
    #[serde(skip)]
    pub api_key: Option<String>,
}

/// Embedding model settings.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_model_name")]
    pub name: String,

    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

/// Generative model settings.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

// ── Default impls ────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            db_path: default_db_path(),
            static_dir: default_static_dir(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            search_top_k: default_search_top_k(),
            model: ModelConfig::default(),
            llm: LlmConfig::default(),
            api_key: None,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            dimensions: default_dimensions(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_llm_model(),
            base_url: default_llm_base_url(),
            temperature: default_temperature(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// If `config_path` is empty, defaults to `"config.json"`.
    /// If the file does not exist, returns a default config and optionally
    /// generates a template file. The API key is then read from the
    /// environment in either case.
    pub fn load(config_path: &str) -> Result<Self> {
        let path = if config_path.is_empty() {
            "config.json"
        } else {
            config_path
        };

        let mut cfg = if std::path::Path::new(path).exists() {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {path}"))?;

            match serde_json::from_str::<Config>(&data) {
                Ok(c) => {
                    info!("Loaded configuration from {path}");
                    c
                }
                Err(e) => {
                    warn!("Invalid JSON in {path}: {e}");
                    warn!("Using default configuration");
                    Self::default()
                }
            }
        } else {
            info!("{path} not found, using defaults");
            let cfg = Self::default();

            // Generate template only for the default path
            if path == "config.json" {
                match cfg.save(path) {
                    Ok(()) => info!("Generated config template: {path}"),
                    Err(e) => warn!("Failed to generate config template: {e}"),
                }
            }

            cfg
        };

        cfg.api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        if cfg.api_key.is_none() {
            warn!("{API_KEY_ENV} is not set; /ask requests will fail until it is");
        }

        Ok(cfg)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &str) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("failed to marshal config")?;
        std::fs::write(path, data).with_context(|| format!("failed to write config: {path}"))?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.chunk_size > 0, "chunk_size must be positive");
        anyhow::ensure!(
            self.chunk_overlap < self.chunk_size,
            "chunk_overlap must be smaller than chunk_size"
        );
        anyhow::ensure!(self.search_top_k > 0, "search_top_k must be positive");
        anyhow::ensure!(
            self.model.dimensions > 0,
            "model.dimensions must be positive"
        );
        anyhow::ensure!(!self.bind_addr.is_empty(), "bind_addr must not be empty");
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────
