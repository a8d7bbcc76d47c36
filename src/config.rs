use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct MemscopeConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub analytics: AnalyticsConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    /// `"chroma"` (HTTP) or `"memory"` (in-process, lost on exit).
    pub provider: String,
    pub url: String,
    pub tenant: String,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_input_chars: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    pub default_n_results: usize,
    pub timeline_limit: usize,
    pub default_source: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub duplicate_threshold: f64,
    pub duplicate_sample_size: usize,
    pub duplicate_neighbors: usize,
    pub graph_threshold: f64,
    pub graph_sample_size: usize,
    /// Upper bound on any analytics sample; graph builds are quadratic in it.
    pub max_sample_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SyncConfig {
    pub program: String,
    pub script: String,
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3201,
            log_level: "info".into(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: "chroma".into(),
            url: "http://localhost:8000".into(),
            tenant: "default_tenant".into(),
            database: "default_database".into(),
            collection: "memories".into(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".into(),
            url: "http://localhost:11434".into(),
            model: "nomic-embed-text".into(),
            timeout_secs: 30,
            max_input_chars: crate::embedding::MAX_INPUT_CHARS,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_n_results: 10,
            timeline_limit: 100,
            default_source: "live".into(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            duplicate_threshold: 0.1,
            duplicate_sample_size: 200,
            duplicate_neighbors: 5,
            graph_threshold: 0.15,
            graph_sample_size: 100,
            max_sample_size: 1000,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            program: "python3".into(),
            script: "~/openclaw/scripts/chromadb/migrate_ollama.py".into(),
            args: vec!["--sync".into()],
            timeout_secs: 60,
        }
    }
}

/// Returns `~/.memscope/`
pub fn default_memscope_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".memscope")
}

/// Returns the default config file path: `~/.memscope/config.toml`
pub fn default_config_path() -> PathBuf {
    default_memscope_dir().join("config.toml")
}

impl MemscopeConfig {
    /// Load config from the default TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            MemscopeConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (MEMSCOPE_CHROMA_URL, MEMSCOPE_OLLAMA_URL,
    /// MEMSCOPE_COLLECTION, MEMSCOPE_LOG_LEVEL, MEMSCOPE_PORT).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MEMSCOPE_CHROMA_URL") {
            self.store.url = val;
        }
        if let Ok(val) = std::env::var("MEMSCOPE_OLLAMA_URL") {
            self.embedding.url = val;
        }
        if let Ok(val) = std::env::var("MEMSCOPE_COLLECTION") {
            self.store.collection = val;
        }
        if let Ok(val) = std::env::var("MEMSCOPE_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("MEMSCOPE_PORT") {
            match val.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %val, "ignoring invalid MEMSCOPE_PORT"),
            }
        }
    }

    /// Address the HTTP surface binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Resolve the sync script path, expanding `~` if needed.
    pub fn resolved_sync_script(&self) -> PathBuf {
        expand_tilde(&self.sync.script)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
