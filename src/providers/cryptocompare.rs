use super::util::{endpoint, http_client, read_json, trim_base_url};
use crate::core::price::{PriceProvider, PriceQuote, PriceSource, validate_price};
use crate::core::token::Token;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

pub struct CryptoCompareProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl CryptoCompareProvider {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        Ok(Self {
            base_url: trim_base_url(base_url),
            api_key: api_key.to_string(),
            client: http_client()?,
        })
    }
}

// Success: {"USD": 0.12}. Failure: {"Response": "Error", "Message": "..."} with a 200 status.
#[derive(Debug, Deserialize)]
struct PriceResponse {
    #[serde(rename = "USD")]
    usd: Option<f64>,
    #[serde(rename = "Message")]
    message: Option<String>,
}

#[async_trait]
impl PriceProvider for CryptoCompareProvider {
    fn name(&self) -> &str {
        "CryptoCompare"
    }

    #[instrument(
        name = "CryptoComparePriceFetch",
        skip(self, token),
        fields(symbol = %token.symbol)
    )]
    async fn fetch_price(&self, token: &Token) -> Result<PriceQuote> {
        let url = endpoint(
            &self.base_url,
            &["data", "price"],
            &[("fsym", token.symbol.as_str()), ("tsyms", "USD")],
        )?;
        debug!("Requesting price from {}", url);

        let response = self
            .client
            .get(url)
            .header("authorization", format!("Apikey {}", self.api_key))
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {}", e, token.symbol))?;
        let data: PriceResponse = read_json(response, self.name(), &token.symbol).await?;

        let price = match (data.usd, data.message) {
            (Some(price), _) => price,
            (None, Some(message)) => {
                return Err(anyhow!("CryptoCompare error for {}: {}", token.symbol, message));
            }
            (None, None) => {
                return Err(anyhow!("No price data found for symbol: {}", token.symbol));
            }
        };

        Ok(PriceQuote::new(
            &token.symbol,
            validate_price(price)?,
            PriceSource::CryptoCompare.to_string(),
        ))
    }
}
