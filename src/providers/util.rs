use anyhow::{Context, Result, anyhow};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("coinfolio/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Shared client settings for every price source.
pub fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

/// Checks the status and decodes a JSON body, naming the source in errors.
pub async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    source: &str,
    symbol: &str,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("HTTP error: {} for {}", status, symbol));
    }

    let text = response.text().await?;
    debug!(source, body = %text, "Received response");
    serde_json::from_str(&text)
        .map_err(|e| anyhow!("Failed to parse {} response for {}: {}", source, symbol, e))
}

pub fn trim_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Joins `segments` onto `base_url` and appends `query`, percent-encoding both.
pub fn endpoint(base_url: &str, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
    let mut url =
        Url::parse(base_url).with_context(|| format!("Invalid base URL: {base_url}"))?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("Base URL cannot take a path: {}", base_url))?
        .pop_if_empty()
        .extend(segments);
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}
