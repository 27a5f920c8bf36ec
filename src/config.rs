use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which [`KeyValueStore`](snippet_collector_core::store::KeyValueStore)
/// backend to open, and where.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Persistent SQLite key-value table at `path`.
    Sqlite,
    /// One file per key under the directory `path`.
    Fallback,
    /// Process-local; nothing survives the command.
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_storage_path(),
        }
    }
}

fn default_backend() -> StorageBackend {
    StorageBackend::Sqlite
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./data/snippets.sqlite")
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.storage.path.as_os_str().is_empty() {
        anyhow::bail!("storage.path must not be empty");
    }

    if config.logging.level.trim().is_empty() {
        anyhow::bail!("logging.level must not be empty");
    }

    Ok(config)
}

/// [`load_config`] when `path` exists, otherwise [`Config::minimal`].
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::minimal())
    }
}
