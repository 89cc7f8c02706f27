use super::util::{endpoint, http_client, read_json, trim_base_url};
use crate::core::price::{PriceProvider, PriceQuote, PriceSource, validate_price};
use crate::core::token::Token;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// LiveCoinWatch `coins/single`. Requires an API key, queried by symbol.
pub struct LiveCoinWatchProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl LiveCoinWatchProvider {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        Ok(Self {
            base_url: trim_base_url(base_url),
            api_key: api_key.to_string(),
            client: http_client()?,
        })
    }
}

#[derive(Debug, Serialize)]
struct SingleCoinRequest<'a> {
    currency: &'a str,
    code: &'a str,
    meta: bool,
}

#[derive(Debug, Deserialize)]
struct SingleCoinResponse {
    rate: Option<f64>,
}

#[async_trait]
impl PriceProvider for LiveCoinWatchProvider {
    fn name(&self) -> &str {
        "LiveCoinWatch"
    }

    #[instrument(
        name = "LiveCoinWatchPriceFetch",
        skip(self, token),
        fields(symbol = %token.symbol)
    )]
    async fn fetch_price(&self, token: &Token) -> Result<PriceQuote> {
        let url = endpoint(&self.base_url, &["coins", "single"], &[])?;
        debug!("Requesting price from {}", url);

        let request = SingleCoinRequest {
            currency: "USD",
            code: &token.symbol,
            meta: false,
        };
        let response = self
            .client
            .post(url)
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {}", e, token.symbol))?;
        let data: SingleCoinResponse = read_json(response, self.name(), &token.symbol).await?;

        let price = data
            .rate
            .ok_or_else(|| anyhow!("No price data found for symbol: {}", token.symbol))?;

        Ok(PriceQuote::new(
            &token.symbol,
            validate_price(price)?,
            PriceSource::LiveCoinWatch.to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_successful_price_fetch_posts_symbol() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/coins/single"))
            .and(header("x-api-key", "lcw-key"))
            .and(body_json(serde_json::json!({
                "currency": "USD",
                "code": "FLOKI",
                "meta": false
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"rate":0.000171,"volume":1}"#),
            )
            .mount(&mock_server)
            .await;

        let provider = LiveCoinWatchProvider::new(&mock_server.uri(), "lcw-key").unwrap();
        let quote = provider
            .fetch_price(&Token::new("Floki Inu", "FLOKI", "floki-inu"))
            .await
            .unwrap();
        assert_eq!(quote.price, 0.000171);
        assert_eq!(quote.source, "LiveCoinWatch");
    }

    #[tokio::test]
    async fn test_unknown_coin_is_an_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/coins/single"))
            .respond_with(ResponseTemplate::new(404).set_body_string(
                r#"{"error":{"code":404,"status":"Not Found","description":"Coin not found"}}"#,
            ))
            .mount(&mock_server)
            .await;

        let provider = LiveCoinWatchProvider::new(&mock_server.uri(), "lcw-key").unwrap();
        let result = provider.fetch_price(&Token::new("Nope", "NOPE", "nope")).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 404 Not Found for NOPE"
        );
    }

    #[tokio::test]
    async fn test_null_rate_is_missing_price() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/coins/single"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"rate":null}"#))
            .mount(&mock_server)
            .await;

        let provider = LiveCoinWatchProvider::new(&mock_server.uri(), "lcw-key").unwrap();
        let result = provider.fetch_price(&Token::new("Kishu", "KISHU", "kishu-inu")).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "No price data found for symbol: KISHU"
        );
    }
}
