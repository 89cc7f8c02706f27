use super::ui;
use crate::core::portfolio::{self, PortfolioValue};
use crate::core::{PriceProvider, TokenCatalog};
use crate::store::Ledger;
use anyhow::Result;
use comfy_table::Cell;

impl PortfolioValue {
    pub fn display_as_table(&self, live: bool) -> String {
        let mut table = ui::new_styled_table();

        let mut header = vec![
            ui::header_cell("Token"),
            ui::header_cell("Quantity"),
            ui::header_cell("Value (USD)"),
            ui::header_cell("Weight (%)"),
        ];
        if live {
            header.extend([
                ui::header_cell("Live Price"),
                ui::header_cell("Live Value"),
                ui::header_cell("Change"),
                ui::header_cell("Source"),
            ]);
        }
        table.set_header(header);

        for holding in &self.holdings {
            let mut row = vec![
                Cell::new(&holding.token),
                ui::number_cell(ui::format_quantity(holding.quantity)),
                ui::number_cell(ui::format_usd(holding.value)),
                ui::format_optional_cell(holding.weight, |w| format!("{w:.2}%")),
            ];
            if live {
                let has_error = holding.error.is_some();
                let change = holding
                    .live_value
                    .filter(|_| holding.value > 0.0)
                    .map(|v| (v - holding.value) / holding.value * 100.0);
                row.extend([
                    holding
                        .live_price
                        .map_or(ui::na_cell(has_error), |p| ui::number_cell(ui::format_usd(p))),
                    holding
                        .live_value
                        .map_or(ui::na_cell(has_error), |v| ui::number_cell(ui::format_usd(v))),
                    change.map_or(ui::na_cell(has_error), ui::change_cell),
                    Cell::new(holding.source.as_deref().unwrap_or("-")),
                ]);
            }
            table.add_row(row);
        }

        let mut output = format!(
            "{}\n\n{}\n\nTotal Value ({}): {}",
            ui::style_text("Portfolio", ui::StyleType::Title),
            table,
            ui::style_text("USD", ui::StyleType::TotalLabel),
            ui::style_text(&ui::format_usd(self.total_value), ui::StyleType::TotalValue),
        );

        if live {
            let (text, style_type) = match self.total_live_value {
                Some(v) => (ui::format_usd(v), ui::StyleType::TotalValue),
                None => ("N/A".to_string(), ui::StyleType::Error),
            };
            output.push_str(&format!(
                "\nLive Value ({}): {}",
                ui::style_text("USD", ui::StyleType::TotalLabel),
                ui::style_text(&text, style_type)
            ));
        }

        output
    }
}

pub async fn run(
    ledger: &Ledger,
    prices: &(dyn PriceProvider + Send + Sync),
    catalog: &TokenCatalog,
    live: bool,
) -> Result<()> {
    let holdings = ledger.holdings().await?;
    if holdings.is_empty() {
        println!("Your portfolio is empty!");
        return Ok(());
    }

    let live_prices = if live {
        let symbols: Vec<String> = holdings.iter().map(|h| h.token.clone()).collect();
        let pb = ui::new_progress_bar(symbols.len() as u64, "Fetching prices...");
        let results = portfolio::fetch_live_prices(prices, catalog, &symbols, &|| pb.inc(1)).await;
        pb.finish_and_clear();
        Some(results)
    } else {
        None
    };

    let value = portfolio::calculate_portfolio_value(&holdings, live_prices.as_ref());
    println!("{}", value.display_as_table(live));

    for (token, error) in value
        .holdings
        .iter()
        .filter_map(|h| h.error.as_ref().map(|e| (&h.token, e)))
    {
        println!(
            "{}",
            ui::style_text(&format!("{token}: {error}"), ui::StyleType::Error)
        );
    }
    Ok(())
}
