use super::ui;
use crate::core::portfolio::{self, Purchase};
use crate::core::{PriceProvider, Token, TokenCatalog};
use crate::store::Ledger;
use anyhow::Result;
use comfy_table::Cell;

pub async fn run(
    ledger: &Ledger,
    prices: &(dyn PriceProvider + Send + Sync),
    catalog: &TokenCatalog,
    query: &str,
    quantity: f64,
) -> Result<()> {
    let token = catalog.resolve(query)?;

    let spinner = ui::new_spinner(&format!("Fetching {} price...", token.symbol));
    let result = portfolio::add_holding(ledger, prices, &token, quantity).await;
    spinner.finish_and_clear();

    println!("{}", render_purchase(&token, &result?));
    Ok(())
}

fn render_purchase(token: &Token, purchase: &Purchase) -> String {
    let tx = &purchase.transaction;
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Token"),
        ui::header_cell("Bought"),
        ui::header_cell("Price"),
        ui::header_cell("Cost"),
        ui::header_cell("Holding"),
        ui::header_cell("Value"),
    ]);
    table.add_row(vec![
        Cell::new(format!("{} ({})", token.name, token.symbol)),
        ui::number_cell(ui::format_quantity(tx.quantity)),
        ui::number_cell(ui::format_usd(tx.price)),
        ui::number_cell(ui::format_usd(tx.total_value)),
        ui::number_cell(ui::format_quantity(purchase.holding.quantity)),
        ui::number_cell(ui::format_usd(purchase.holding.value)),
    ]);

    format!(
        "{}\n{}",
        table,
        ui::style_text(
            &format!("Price from {}", purchase.source),
            ui::StyleType::Subtle
        )
    )
}
