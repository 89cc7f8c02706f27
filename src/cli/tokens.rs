use super::ui;
use crate::core::TokenCatalog;
use comfy_table::Cell;

pub fn run(catalog: &TokenCatalog) {
    println!("{}", render_catalog(catalog));
}

fn render_catalog(catalog: &TokenCatalog) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Name"),
        ui::header_cell("Symbol"),
        ui::header_cell("Id"),
    ]);
    for token in catalog.tokens() {
        table.add_row(vec![
            Cell::new(&token.name),
            Cell::new(&token.symbol),
            Cell::new(&token.id),
        ]);
    }
    table.to_string()
}
