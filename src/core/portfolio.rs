//! Portfolio operations: buying into a holding and valuing the ledger.
use crate::core::ledger::{Holding, Transaction, validate_quantity};
use crate::core::price::{PriceProvider, PriceQuote};
use crate::core::token::{Token, TokenCatalog};
use crate::store::Ledger;
use anyhow::Result;
use futures::future::join_all;
use std::collections::HashMap;
use tracing::debug;

/// Outcome of [`add_holding`].
#[derive(Debug, Clone)]
pub struct Purchase {
    pub holding: Holding,
    pub transaction: Transaction,
    pub source: String,
}

/// Prices `token` through `prices`, then upserts the holding and logs a buy.
pub async fn add_holding(
    ledger: &Ledger,
    prices: &(dyn PriceProvider + Send + Sync),
    token: &Token,
    quantity: f64,
) -> Result<Purchase> {
    // Reject bad input before spending a network round trip
    validate_quantity(quantity)?;

    let quote = prices.fetch_price(token).await?;
    let (holding, transaction) = ledger
        .record_buy(&token.symbol, quantity, quote.price)
        .await?;

    Ok(Purchase {
        holding,
        transaction,
        source: quote.source,
    })
}

/// Fetches current prices for `symbols` concurrently.
///
/// Symbols the catalog cannot resolve map to an error entry rather than
/// aborting the batch.
pub async fn fetch_live_prices(
    prices: &(dyn PriceProvider + Send + Sync),
    catalog: &TokenCatalog,
    symbols: &[String],
    on_fetched: &(dyn Fn() + Sync),
) -> HashMap<String, Result<PriceQuote>> {
    let futures = symbols.iter().map(|symbol| async move {
        let result = match catalog.resolve(symbol) {
            Ok(token) => prices.fetch_price(&token).await,
            Err(e) => Err(e),
        };
        on_fetched();
        (symbol.clone(), result)
    });
    join_all(futures).await.into_iter().collect()
}

/// One row of a valued portfolio.
#[derive(Debug, Clone)]
pub struct HoldingValue {
    pub token: String,
    pub quantity: f64,
    pub value: f64,
    pub weight: Option<f64>,
    pub live_price: Option<f64>,
    pub live_value: Option<f64>,
    pub source: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct PortfolioValue {
    pub holdings: Vec<HoldingValue>,
    pub total_value: f64,
    /// Present only when every live lookup succeeded.
    pub total_live_value: Option<f64>,
}

/// Values the stored holdings and, when `live_prices` is given, revalues them
/// at current prices.
pub fn calculate_portfolio_value(
    holdings: &[Holding],
    live_prices: Option<&HashMap<String, Result<PriceQuote>>>,
) -> PortfolioValue {
    let total_value: f64 = holdings.iter().map(|h| h.value).sum();
    let mut total_live_value = live_prices.map(|_| 0.0);

    let rows = holdings
        .iter()
        .map(|holding| {
            let mut row = HoldingValue {
                token: holding.token.clone(),
                quantity: holding.quantity,
                value: holding.value,
                weight: (total_value > 0.0).then(|| holding.value / total_value * 100.0),
                live_price: None,
                live_value: None,
                source: None,
                error: None,
            };

            if let Some(prices) = live_prices {
                match prices.get(&holding.token) {
                    Some(Ok(quote)) => {
                        let live_value = holding.quantity * quote.price;
                        row.live_price = Some(quote.price);
                        row.live_value = Some(live_value);
                        row.source = Some(quote.source.clone());
                        total_live_value = total_live_value.map(|t| t + live_value);
                    }
                    Some(Err(e)) => {
                        debug!("Live price error for {}: {}", holding.token, e);
                        row.error = Some(e.to_string());
                        total_live_value = None;
                    }
                    None => {
                        row.error = Some(format!("Price data not available for {}", holding.token));
                        total_live_value = None;
                    }
                }
            }
            row
        })
        .collect();

    PortfolioValue {
        holdings: rows,
        total_value,
        total_live_value,
    }
}
