// src/config.rs - Configuration management
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::fs;
use std::str::FromStr;
use anyhow::{Context, Result};
use strum::{EnumString, Display, AsRefStr};

use crate::models::IdFormat;
use crate::storage::DEFAULT_STORAGE_KEY;
use crate::validator::FieldValidator;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub inventory: InventoryConfig,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
    pub frontend: FrontendConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    File,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: String,
    pub key: String,
    /// Write the snapshot even when the collection is empty
    pub persist_empty: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InventoryConfig {
    pub id_format: IdFormat,
    pub recent_items_limit: usize,
    pub default_min_stock_threshold: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct FrontendConfig {
    /// Directory with a built frontend; served at `/` when set
    pub static_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            data_dir: "data".to_string(),
            key: DEFAULT_STORAGE_KEY.to_string(),
            persist_empty: true,
        }
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            id_format: IdFormat::Short,
            recent_items_limit: 5,
            default_min_stock_threshold: crate::models::DEFAULT_MIN_STOCK_THRESHOLD,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:8080".to_string(),
                "http://localhost:8080".to_string(),
            ],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

pub fn load_config() -> Result<Config> {
    load_env_file()?;

    let config_file = env::var("CONFIG_FILE").ok().map(PathBuf::from);
    let mut config = load_config_from(config_file.as_deref())?;

    override_with(&mut config, |name| env::var(name).ok())?;

    config.validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

/// Reads the TOML file if given, otherwise returns the defaults.
pub fn load_config_from(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            let config_str = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&config_str)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        }
        None => Ok(Config::default()),
    }
}

/// Applies environment-style overrides; `lookup` returns the variable's value.
pub fn override_with(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
    if let Some(host) = lookup("STOCKFLOW_HOST") {
        config.server.host = host;
    }
    if let Some(port_str) = lookup("STOCKFLOW_PORT") {
        config.server.port = port_str.parse::<u16>()
            .with_context(|| format!("Invalid STOCKFLOW_PORT: {}", port_str))?;
    }
    if let Some(workers_str) = lookup("STOCKFLOW_WORKERS") {
        if let Ok(workers) = workers_str.parse::<usize>() {
            config.server.workers = Some(workers);
        }
    }
    if let Some(data_dir) = lookup("STOCKFLOW_DATA_DIR") {
        config.storage.data_dir = data_dir;
    }
    if let Some(backend) = lookup("STOCKFLOW_STORAGE_BACKEND") {
        config.storage.backend = StorageBackend::from_str(&backend)
            .with_context(|| format!("Invalid STOCKFLOW_STORAGE_BACKEND: {}", backend))?;
    }
    if let Some(key) = lookup("STOCKFLOW_STORAGE_KEY") {
        config.storage.key = key;
    }
    if let Some(id_format) = lookup("STOCKFLOW_ID_FORMAT") {
        config.inventory.id_format = IdFormat::from_str(&id_format)
            .with_context(|| format!("Invalid STOCKFLOW_ID_FORMAT: {}", id_format))?;
    }
    if let Some(static_dir) = lookup("STOCKFLOW_STATIC_DIR") {
        config.frontend.static_dir = Some(static_dir).filter(|s| !s.trim().is_empty());
    }
    if let Some(origins_str) = lookup("ALLOWED_ORIGINS") {
        config.security.allowed_origins = origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if let Some(level) = lookup("RUST_LOG") {
        config.logging.level = level;
    }

    Ok(())
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("server.port must be non-zero"));
        }

        FieldValidator::storage_key(&self.storage.key)
            .map_err(|e| anyhow::anyhow!(e))?;

        if self.storage.backend == StorageBackend::File && self.storage.data_dir.trim().is_empty() {
            return Err(anyhow::anyhow!("storage.data_dir is required for the file backend"));
        }

        if self.inventory.recent_items_limit == 0 {
            return Err(anyhow::anyhow!("inventory.recent_items_limit must be at least 1"));
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn print_startup_info(&self) {
        log::info!("📦 StockFlow starting up...");
        log::info!("🌐 Server: {}", self.bind_address());
        match self.storage.backend {
            StorageBackend::File => log::info!("💾 Storage: file slot '{}' in {}", self.storage.key, self.storage.data_dir),
            StorageBackend::Memory => log::warn!("💾 Storage: in-memory slot '{}' (changes are lost on exit)", self.storage.key),
        }
        if !self.storage.persist_empty {
            log::warn!("⚠️  Empty inventory will not be persisted");
        }
        log::info!("🆔 Item ids: {}", self.inventory.id_format);
        log::info!("📊 Logging: {} level", self.logging.level);
        match &self.frontend.static_dir {
            Some(dir) => log::info!("🖥  Frontend: {}", dir),
            None => log::info!("🖥  Frontend: none (JSON API only)"),
        }
    }
}

pub fn load_env_file() -> Result<()> {
    if let Ok(env_file) = env::var("ENV_FILE") {
        dotenvy::from_filename(&env_file)
            .with_context(|| format!("Failed to load environment file: {}", env_file))?;
    } else if Path::new(".env").exists() {
        dotenvy::dotenv().context("Failed to load .env file")?;
    }
    Ok(())
}
