//! Pricing abstractions and core types

use crate::core::token::Token;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// The external price APIs known to the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    CoinGecko,
    CryptoCompare,
    LiveCoinWatch,
    CoinCap,
}

impl PriceSource {
    /// Default order of the fallback chain.
    pub const DEFAULT_ORDER: [PriceSource; 4] = [
        PriceSource::CoinGecko,
        PriceSource::CryptoCompare,
        PriceSource::LiveCoinWatch,
        PriceSource::CoinCap,
    ];

    pub fn requires_api_key(&self) -> bool {
        matches!(self, PriceSource::CryptoCompare | PriceSource::LiveCoinWatch)
    }
}

impl Display for PriceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PriceSource::CoinGecko => "CoinGecko",
                PriceSource::CryptoCompare => "CryptoCompare",
                PriceSource::LiveCoinWatch => "LiveCoinWatch",
                PriceSource::CoinCap => "CoinCap",
            }
        )
    }
}

impl FromStr for PriceSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "coingecko" => Ok(PriceSource::CoinGecko),
            "cryptocompare" => Ok(PriceSource::CryptoCompare),
            "livecoinwatch" => Ok(PriceSource::LiveCoinWatch),
            "coincap" => Ok(PriceSource::CoinCap),
            _ => Err(anyhow!("Invalid price source: {}", s)),
        }
    }
}

/// A USD price for one token, tagged with the source that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub symbol: String,
    pub price: f64,
    pub source: String,
    pub fetched_at: DateTime<Utc>,
}

impl PriceQuote {
    pub fn new(symbol: &str, price: f64, source: impl Into<String>) -> Self {
        Self {
            symbol: symbol.to_string(),
            price,
            source: source.into(),
            fetched_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Human readable name used in logs and error reports.
    fn name(&self) -> &str;

    async fn fetch_price(&self, token: &Token) -> Result<PriceQuote>;
}

/// Rejects prices a source may report for delisted or unknown tokens.
pub fn validate_price(price: f64) -> Result<f64> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(anyhow!("Invalid price: {}", price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_source_parsing() {
        assert_eq!(
            "CoinGecko".parse::<PriceSource>().unwrap(),
            PriceSource::CoinGecko
        );
        assert_eq!(
            "livecoinwatch".parse::<PriceSource>().unwrap(),
            PriceSource::LiveCoinWatch
        );
        assert!("binance".parse::<PriceSource>().is_err());
    }

    #[test]
    fn test_price_source_serde_names() {
        let yaml = serde_yaml::to_string(&PriceSource::CryptoCompare).unwrap();
        assert_eq!(yaml.trim(), "cryptocompare");
        let parsed: Vec<PriceSource> = serde_yaml::from_str("[coincap, coingecko]").unwrap();
        assert_eq!(parsed, vec![PriceSource::CoinCap, PriceSource::CoinGecko]);
    }

    #[test]
    fn test_validate_price() {
        assert_eq!(validate_price(0.000012).unwrap(), 0.000012);
        assert!(validate_price(0.0).is_err());
        assert!(validate_price(-1.0).is_err());
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_price(f64::INFINITY).is_err());
    }
}
