use super::util::{endpoint, http_client, read_json, trim_base_url};
use crate::core::price::{PriceProvider, PriceQuote, PriceSource, validate_price};
use crate::core::token::Token;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// CoinGecko `simple/price` endpoint. Keyed by token id, no API key.
pub struct CoinGeckoProvider {
    base_url: String,
    client: reqwest::Client,
}

impl CoinGeckoProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: trim_base_url(base_url),
            client: http_client()?,
        })
    }
}

// {"dogecoin": {"usd": 0.12}}
type SimplePriceResponse = HashMap<String, HashMap<String, Option<f64>>>;

#[async_trait]
impl PriceProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        "CoinGecko"
    }

    #[instrument(name = "CoinGeckoPriceFetch", skip(self, token), fields(id = %token.id))]
    async fn fetch_price(&self, token: &Token) -> Result<PriceQuote> {
        let url = endpoint(
            &self.base_url,
            &["simple", "price"],
            &[("ids", token.id.as_str()), ("vs_currencies", "usd")],
        )?;
        debug!("Requesting price from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for token: {}", e, token.id))?;
        let data: SimplePriceResponse = read_json(response, self.name(), &token.id).await?;

        let price = data
            .get(&token.id)
            .and_then(|prices| prices.get("usd").copied().flatten())
            .ok_or_else(|| anyhow!("No price data found for token: {}", token.id))?;

        Ok(PriceQuote::new(
            &token.symbol,
            validate_price(price)?,
            PriceSource::CoinGecko.to_string(),
        ))
    }
}
