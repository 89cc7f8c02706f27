use super::util::{endpoint, http_client, read_json, trim_base_url};
use crate::core::price::{PriceProvider, PriceQuote, PriceSource, validate_price};
use crate::core::token::Token;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

pub struct CoinCapProvider {
    base_url: String,
    client: reqwest::Client,
}

impl CoinCapProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: trim_base_url(base_url),
            client: http_client()?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct AssetResponse {
    data: Option<AssetData>,
}

#[derive(Debug, Deserialize)]
struct AssetData {
    // CoinCap reports prices as decimal strings
    #[serde(rename = "priceUsd")]
    price_usd: Option<String>,
}

#[async_trait]
impl PriceProvider for CoinCapProvider {
    fn name(&self) -> &str {
        "CoinCap"
    }

    #[instrument(name = "CoinCapPriceFetch", skip(self, token), fields(id = %token.id))]
    async fn fetch_price(&self, token: &Token) -> Result<PriceQuote> {
        let url = endpoint(&self.base_url, &["v2", "assets", token.id.as_str()], &[])?;
        debug!("Requesting price from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for token: {}", e, token.id))?;
        let data: AssetResponse = read_json(response, self.name(), &token.id).await?;

        let raw = data
            .data
            .and_then(|asset| asset.price_usd)
            .ok_or_else(|| anyhow!("No price data found for token: {}", token.id))?;
        let price: f64 = raw
            .parse()
            .map_err(|e| anyhow!("Invalid priceUsd {:?} for token {}: {}", raw, token.id, e))?;

        Ok(PriceQuote::new(
            &token.symbol,
            validate_price(price)?,
            PriceSource::CoinCap.to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(id: &str, status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v2/assets/{id}")))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_successful_price_fetch() {
        let body = r#"{"data":{"id":"bonfida","symbol":"FIDA","priceUsd":"0.2714530000"}}"#;
        let mock_server = create_mock_server("bonfida", 200, body).await;
        let provider = CoinCapProvider::new(&mock_server.uri()).unwrap();

        let quote = provider
            .fetch_price(&Token::new("Bonfida", "FIDA", "bonfida"))
            .await
            .unwrap();
        assert!((quote.price - 0.271453).abs() < 1e-12);
        assert_eq!(quote.symbol, "FIDA");
        assert_eq!(quote.source, "CoinCap");
    }

    #[tokio::test]
    async fn test_null_price_is_missing() {
        let body = r#"{"data":{"id":"saitama","priceUsd":null}}"#;
        let mock_server = create_mock_server("saitama", 200, body).await;
        let provider = CoinCapProvider::new(&mock_server.uri()).unwrap();

        let result = provider
            .fetch_price(&Token::new("Saitama", "SAITAMA", "saitama"))
            .await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "No price data found for token: saitama"
        );
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_server = create_mock_server("dogecoin", 200, r#"{"error":"x"#).await;
        let provider = CoinCapProvider::new(&mock_server.uri()).unwrap();

        let result = provider
            .fetch_price(&Token::new("Dogecoin", "DOGE", "dogecoin"))
            .await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse CoinCap response for dogecoin")
        );
    }
}
