use super::ui;
use crate::core::portfolio;
use crate::core::{PriceProvider, PriceQuote, TokenCatalog};
use crate::store::Ledger;
use anyhow::Result;
use comfy_table::Cell;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum WatchlistAction {
    List,
    Add(String),
    Remove(String),
}

pub async fn run(
    ledger: &Ledger,
    prices: &(dyn PriceProvider + Send + Sync),
    catalog: &TokenCatalog,
    action: WatchlistAction,
) -> Result<()> {
    match action {
        WatchlistAction::Add(query) => {
            let token = catalog.resolve(&query)?;
            if ledger.watchlist_add(&token.symbol).await? {
                println!("{} added to watchlist!", token.symbol);
            } else {
                println!("{} is already on the watchlist", token.symbol);
            }
        }
        WatchlistAction::Remove(query) => {
            let token = catalog.resolve(&query)?;
            if ledger.watchlist_remove(&token.symbol).await? {
                println!("{} removed from watchlist", token.symbol);
            } else {
                println!("{} is not on the watchlist", token.symbol);
            }
        }
        WatchlistAction::List => {
            let symbols = ledger.watchlist().await?;
            if symbols.is_empty() {
                println!("Your watchlist is empty!");
                return Ok(());
            }

            let pb = ui::new_progress_bar(symbols.len() as u64, "Fetching prices...");
            let quotes = portfolio::fetch_live_prices(prices, catalog, &symbols, &|| pb.inc(1)).await;
            pb.finish_and_clear();

            println!("{}", render_watchlist(&symbols, &quotes));
        }
    }
    Ok(())
}

fn render_watchlist(symbols: &[String], quotes: &HashMap<String, Result<PriceQuote>>) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Token"),
        ui::header_cell("Price"),
        ui::header_cell("Source"),
    ]);

    for symbol in symbols {
        let (price, source) = match quotes.get(symbol) {
            Some(Ok(quote)) => (
                ui::number_cell(ui::format_usd(quote.price)),
                Cell::new(&quote.source),
            ),
            Some(Err(e)) => (ui::na_cell(true), Cell::new(e.to_string())),
            None => (ui::na_cell(false), Cell::new("-")),
        };
        table.add_row(vec![Cell::new(symbol), price, source]);
    }

    format!(
        "{}\n\n{}",
        ui::style_text("Watchlist", ui::StyleType::Title),
        table
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_render_watchlist_inlines_errors() {
        let symbols = vec!["BONK".to_string(), "PEPE".to_string()];
        let mut quotes = HashMap::new();
        quotes.insert(
            "BONK".to_string(),
            Ok(PriceQuote::new("BONK", 0.0000215, "CoinGecko")),
        );
        quotes.insert("PEPE".to_string(), Err(anyhow!("CoinCap: timeout")));

        let output = render_watchlist(&symbols, &quotes);
        assert!(output.contains("$0.0000215"));
        assert!(output.contains("CoinGecko"));
        assert!(output.contains("N/A"));
        assert!(output.contains("CoinCap: timeout"));
    }
}
