use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::constants;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Static key passed as a query parameter on every catalog request.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// How long the search box must be quiet before a request fires.
    /// Zero fires immediately on every settled value.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_category_ttl")]
    pub category_ttl_secs: u64,

    #[serde(default = "default_search_ttl")]
    pub search_ttl_secs: u64,

    #[serde(default = "default_detail_ttl")]
    pub detail_ttl_secs: u64,

    #[serde(default = "default_page_capacity")]
    pub page_capacity: usize,

    #[serde(default = "default_detail_capacity")]
    pub detail_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub connection_timeout: u64,

    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Directory for durable state; defaults to the platform data dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            debug!("Loading config from {:?}", config_path);
            let contents =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            let config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            info!("Config loaded successfully");
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, contents).context("Failed to write config file")?;

        debug!("Config saved to {:?}", config_path);
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(config_dir.join("marquee").join("config.toml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            search: SearchConfig::default(),
            cache: CacheConfig::default(),
            network: NetworkConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            language: default_language(),
            image_base_url: default_image_base_url(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            category_ttl_secs: default_category_ttl(),
            search_ttl_secs: default_search_ttl(),
            detail_ttl_secs: default_detail_ttl(),
            page_capacity: default_page_capacity(),
            detail_capacity: default_detail_capacity(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connection_timeout: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    constants::DEFAULT_BASE_URL.to_string()
}
fn default_language() -> String {
    constants::DEFAULT_LANGUAGE.to_string()
}
fn default_image_base_url() -> String {
    constants::DEFAULT_IMAGE_BASE_URL.to_string()
}
fn default_debounce_ms() -> u64 {
    constants::DEFAULT_SEARCH_DEBOUNCE_MS
}
fn default_category_ttl() -> u64 {
    constants::CATEGORY_PAGE_TTL_SECS
}
fn default_search_ttl() -> u64 {
    constants::SEARCH_PAGE_TTL_SECS
}
fn default_detail_ttl() -> u64 {
    constants::DETAIL_TTL_SECS
}
fn default_page_capacity() -> usize {
    constants::PAGE_CACHE_CAPACITY
}
fn default_detail_capacity() -> usize {
    constants::DETAIL_CACHE_CAPACITY
}
fn default_timeout() -> u64 {
    30
}
fn default_retries() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_section() {
        let config = Config::default();
        assert_eq!(config.api.base_url, constants::DEFAULT_BASE_URL);
        assert_eq!(config.search.debounce_ms, 500);
        assert_eq!(config.cache.category_ttl_secs, 300);
        assert_eq!(config.cache.search_ttl_secs, 120);
        assert_eq!(config.cache.detail_ttl_secs, 600);
        assert_eq!(config.network.max_retries, 3);
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn partial_file_fills_missing_fields_with_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            api_key = "abc123"

            [search]
            debounce_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.api.api_key, "abc123");
        assert_eq!(config.api.base_url, constants::DEFAULT_BASE_URL);
        assert_eq!(config.search.debounce_ms, 250);
        assert_eq!(config.cache.detail_ttl_secs, 600);
    }

    #[test]
    fn round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.api.base_url, config.api.base_url);
        assert_eq!(parsed.cache.page_capacity, config.cache.page_capacity);
    }
}
