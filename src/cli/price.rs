use super::ui;
use crate::core::{PriceProvider, TokenCatalog};
use crate::providers::FallbackPriceProvider;
use anyhow::Result;

pub async fn run(prices: &FallbackPriceProvider, catalog: &TokenCatalog, query: &str) -> Result<()> {
    let token = catalog.resolve(query)?;

    let spinner = ui::new_spinner(&format!("Fetching {} price...", token.symbol));
    let result = prices.fetch_price(&token).await;
    spinner.finish_and_clear();
    let quote = result?;

    println!(
        "{} ({}): {}",
        ui::style_text(&token.name, ui::StyleType::Title),
        token.symbol,
        ui::style_text(&ui::format_usd(quote.price), ui::StyleType::TotalValue)
    );
    println!(
        "{}",
        ui::style_text(
            &format!(
                "Source: {} at {} (chain: {})",
                quote.source,
                quote.fetched_at.format("%Y-%m-%d %H:%M:%S UTC"),
                prices.source_names().join(" -> ")
            ),
            ui::StyleType::Subtle
        )
    );
    Ok(())
}
