//! TOML configuration.
//!
//! ```toml
//! [vault]
//! path = "/home/me/vault"
//!
//! [embedding]
//! provider = "local"
//! ```
//!
//! Every section except `[vault]` is optional. The database defaults to
//! `<vault>/.note-linker/state.db`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use note_linker_core::indexer::DEFAULT_BATCH_SIZE;
use note_linker_core::ranking::DEFAULT_RRF_K;

/// Directory inside the vault that holds the database and lock file.
pub const STATE_DIR: &str = ".note-linker";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub vault: VaultConfig,
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct VaultConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DbConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Base URL for the Ollama provider.
    #[serde(default)]
    pub url: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: None,
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
            url: None,
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}
fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct RankingConfig {
    #[serde(default = "default_rrf_k")]
    pub rrf_k: u32,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            rrf_k: default_rrf_k(),
            limit: default_limit(),
        }
    }
}

fn default_rrf_k() -> u32 {
    DEFAULT_RRF_K
}
fn default_limit() -> usize {
    50
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn state_dir(&self) -> PathBuf {
        self.vault.path.join(STATE_DIR)
    }

    pub fn db_path(&self) -> PathBuf {
        self.db
            .path
            .clone()
            .unwrap_or_else(|| self.state_dir().join("state.db"))
    }

    /// Lock file guarding indexing runs, next to the database.
    pub fn lock_path(&self) -> PathBuf {
        match self.db_path().parent() {
            Some(dir) => dir.join("index.lock"),
            None => self.state_dir().join("index.lock"),
        }
    }
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }

    fn requires_model(&self) -> bool {
        matches!(self.provider.as_str(), "openai" | "ollama")
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.embedding.batch_size == 0 {
        anyhow::bail!("embedding.batch_size must be > 0");
    }

    if config.ranking.rrf_k == 0 {
        anyhow::bail!("ranking.rrf_k must be > 0");
    }

    if config.ranking.limit == 0 {
        anyhow::bail!("ranking.limit must be > 0");
    }

    if config.embedding.requires_model() {
        if config.embedding.dims.is_none() || config.embedding.dims == Some(0) {
            anyhow::bail!(
                "embedding.dims must be > 0 when provider is '{}'",
                config.embedding.provider
            );
        }
        if config.embedding.model.is_none() {
            anyhow::bail!(
                "embedding.model must be specified when provider is '{}'",
                config.embedding.provider
            );
        }
    }

    match config.embedding.provider.as_str() {
        "disabled" | "hash" | "local" | "ollama" | "openai" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be disabled, hash, local, ollama, or openai.",
            other
        ),
    }

    Ok(config)
}
