use crate::core::price::PriceSource;
use crate::core::token::Token;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const CRYPTOCOMPARE_BASE_URL: &str = "https://min-api.cryptocompare.com";
const LIVECOINWATCH_BASE_URL: &str = "https://api.livecoinwatch.com";
const COINCAP_BASE_URL: &str = "https://api.coincap.io";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SourceConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub coingecko: Option<SourceConfig>,
    #[serde(default)]
    pub cryptocompare: Option<SourceConfig>,
    #[serde(default)]
    pub livecoinwatch: Option<SourceConfig>,
    #[serde(default)]
    pub coincap: Option<SourceConfig>,
}

impl ProvidersConfig {
    fn source(&self, source: PriceSource) -> Option<&SourceConfig> {
        match source {
            PriceSource::CoinGecko => self.coingecko.as_ref(),
            PriceSource::CryptoCompare => self.cryptocompare.as_ref(),
            PriceSource::LiveCoinWatch => self.livecoinwatch.as_ref(),
            PriceSource::CoinCap => self.coincap.as_ref(),
        }
    }

    pub fn base_url(&self, source: PriceSource) -> String {
        self.source(source)
            .and_then(|s| s.base_url.clone())
            .unwrap_or_else(|| default_base_url(source).to_string())
    }

    /// API key from the environment, falling back to the config file.
    pub fn api_key(&self, source: PriceSource) -> Option<String> {
        self.api_key_with_env(source, |name| std::env::var(name).ok())
    }

    pub fn api_key_with_env(
        &self,
        source: PriceSource,
        env: impl Fn(&str) -> Option<String>,
    ) -> Option<String> {
        api_key_env_var(source)
            .and_then(env)
            .or_else(|| self.source(source).and_then(|s| s.api_key.clone()))
            .filter(|key| !key.trim().is_empty())
    }
}

pub fn default_base_url(source: PriceSource) -> &'static str {
    match source {
        PriceSource::CoinGecko => COINGECKO_BASE_URL,
        PriceSource::CryptoCompare => CRYPTOCOMPARE_BASE_URL,
        PriceSource::LiveCoinWatch => LIVECOINWATCH_BASE_URL,
        PriceSource::CoinCap => COINCAP_BASE_URL,
    }
}

pub fn api_key_env_var(source: PriceSource) -> Option<&'static str> {
    match source {
        PriceSource::CryptoCompare => Some("CRYPTOCOMPARE_API_KEY"),
        PriceSource::LiveCoinWatch => Some("LIVECOINWATCH_API_KEY"),
        PriceSource::CoinGecko | PriceSource::CoinCap => None,
    }
}

fn default_price_sources() -> Vec<PriceSource> {
    PriceSource::DEFAULT_ORDER.to_vec()
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_price_sources")]
    pub price_sources: Vec<PriceSource>,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default)]
    pub tokens: Vec<Token>,
    pub data_path: Option<String>,
    pub database_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            price_sources: default_price_sources(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            tokens: Vec::new(),
            data_path: None,
            database_path: None,
        }
    }
}

impl AppConfig {
    /// Loads the default config file, or built-in defaults when there is none.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "coinfolio", "coinfolio")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "coinfolio", "coinfolio")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.database_path {
            return Ok(PathBuf::from(custom_path));
        }
        Ok(self.default_data_path()?.join("portfolio.db"))
    }

    pub fn cache_path(&self) -> Result<PathBuf> {
        Ok(self.default_data_path()?.join("cache"))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
