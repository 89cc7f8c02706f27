use super::ui;
use crate::core::{TokenCatalog, Transaction};
use crate::store::Ledger;
use anyhow::Result;
use comfy_table::Cell;

pub async fn run(ledger: &Ledger, catalog: &TokenCatalog, token: Option<&str>) -> Result<()> {
    let symbol = token.map(|t| catalog.resolve(t)).transpose()?.map(|t| t.symbol);
    let transactions = ledger.transactions(symbol.as_deref()).await?;

    if transactions.is_empty() {
        println!("No transactions recorded yet.");
        return Ok(());
    }
    println!("{}", render_transactions(&transactions));
    Ok(())
}

fn render_transactions(transactions: &[Transaction]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Token"),
        ui::header_cell("Type"),
        ui::header_cell("Quantity"),
        ui::header_cell("Price"),
        ui::header_cell("Total"),
    ]);

    for tx in transactions {
        table.add_row(vec![
            Cell::new(tx.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
            Cell::new(&tx.token),
            Cell::new(tx.kind),
            ui::number_cell(ui::format_quantity(tx.quantity)),
            ui::number_cell(ui::format_usd(tx.price)),
            ui::number_cell(ui::format_usd(tx.total_value)),
        ]);
    }

    let invested: f64 = transactions.iter().map(|t| t.total_value).sum();
    format!(
        "{}\n\nTotal Invested ({}): {}",
        table,
        ui::style_text("USD", ui::StyleType::TotalLabel),
        ui::style_text(&ui::format_usd(invested), ui::StyleType::TotalValue)
    )
}
