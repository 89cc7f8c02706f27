//! The fallback chain: tries each configured source in order and caches the
//! first successful quote.

use super::coincap::CoinCapProvider;
use super::coingecko::CoinGeckoProvider;
use super::cryptocompare::CryptoCompareProvider;
use super::livecoinwatch::LiveCoinWatchProvider;
use crate::core::config::AppConfig;
use crate::core::price::{PriceProvider, PriceQuote, PriceSource};
use crate::core::token::Token;
use crate::store::PriceCache;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub struct FallbackPriceProvider {
    providers: Vec<Box<dyn PriceProvider>>,
    cache: PriceCache,
    ttl: Duration,
}

impl FallbackPriceProvider {
    pub fn new(providers: Vec<Box<dyn PriceProvider>>, cache: PriceCache, ttl: Duration) -> Self {
        Self {
            providers,
            cache,
            ttl,
        }
    }

    /// Builds the chain in `price_sources` order. Sources that need a key are
    /// skipped when none is configured.
    pub fn from_config(config: &AppConfig, cache: PriceCache) -> Result<Self> {
        Self::from_config_with_env(config, cache, |name| std::env::var(name).ok())
    }

    /// Same as [`Self::from_config`], reading API key variables through `env`.
    pub fn from_config_with_env(
        config: &AppConfig,
        cache: PriceCache,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut providers: Vec<Box<dyn PriceProvider>> = Vec::new();
        let mut seen = Vec::new();

        for &source in &config.price_sources {
            if seen.contains(&source) {
                continue;
            }
            seen.push(source);

            let base_url = config.providers.base_url(source);
            let api_key = config.providers.api_key_with_env(source, &env);
            if source.requires_api_key() && api_key.is_none() {
                warn!(%source, "No API key configured, skipping price source");
                continue;
            }
            let api_key = api_key.unwrap_or_default();

            let provider: Box<dyn PriceProvider> = match source {
                PriceSource::CoinGecko => Box::new(CoinGeckoProvider::new(&base_url)?),
                PriceSource::CryptoCompare => {
                    Box::new(CryptoCompareProvider::new(&base_url, &api_key)?)
                }
                PriceSource::LiveCoinWatch => {
                    Box::new(LiveCoinWatchProvider::new(&base_url, &api_key)?)
                }
                PriceSource::CoinCap => Box::new(CoinCapProvider::new(&base_url)?),
            };
            debug!(%source, %base_url, "Registered price source");
            providers.push(provider);
        }

        Ok(Self::new(providers, cache, config.cache_ttl()))
    }

    /// Names of the active sources, in the order they are tried.
    pub fn source_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }
}

#[async_trait]
impl PriceProvider for FallbackPriceProvider {
    fn name(&self) -> &str {
        "fallback chain"
    }

    #[instrument(name = "PriceFetch", skip(self, token), fields(symbol = %token.symbol))]
    async fn fetch_price(&self, token: &Token) -> Result<PriceQuote> {
        if let Some(cached) = self.cache.get(&token.symbol).await {
            return Ok(cached);
        }

        if self.providers.is_empty() {
            return Err(anyhow!("No price sources configured"));
        }

        let mut failures = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            match provider.fetch_price(token).await {
                Ok(quote) => {
                    debug!(source = provider.name(), price = quote.price, "Price fetched");
                    self.cache
                        .put(token.symbol.clone(), quote.clone(), Some(self.ttl))
                        .await;
                    return Ok(quote);
                }
                Err(e) => {
                    warn!(source = provider.name(), error = %e, "Price source failed");
                    failures.push(format!("{}: {}", provider.name(), e));
                }
            }
        }

        Err(anyhow!(
            "All price sources failed for {}: {}",
            token.symbol,
            failures.join("; ")
        ))
    }
}
