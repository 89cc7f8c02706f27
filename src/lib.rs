pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

pub use cli::watchlist::WatchlistAction;

use crate::core::TokenCatalog;
use crate::core::config::AppConfig;
use crate::providers::FallbackPriceProvider;
use crate::store::Ledger;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Add { token: String, quantity: f64 },
    Summary { live: bool },
    History { token: Option<String> },
    Price { token: String },
    Watchlist(WatchlistAction),
    Tokens,
    Export { path: PathBuf },
    Import { path: PathBuf },
    ClearCache,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("coinfolio starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let catalog = TokenCatalog::with_extra(&config.tokens);
    if command == AppCommand::Tokens {
        cli::tokens::run(&catalog);
        return Ok(());
    }

    let prices = FallbackPriceProvider::from_config(&config, store::open_price_cache(&config))?;
    debug!(sources = ?prices.source_names(), "Price chain ready");

    match command {
        AppCommand::Price { token } => return cli::price::run(&prices, &catalog, &token).await,
        AppCommand::ClearCache => {
            prices.clear_cache().await;
            println!("Price cache cleared");
            return Ok(());
        }
        _ => {}
    }

    let ledger = Ledger::open(&config.database_path()?).await?;
    let result = match command {
        AppCommand::Add { token, quantity } => {
            cli::add::run(&ledger, &prices, &catalog, &token, quantity).await
        }
        AppCommand::Summary { live } => cli::summary::run(&ledger, &prices, &catalog, live).await,
        AppCommand::History { token } => {
            cli::history::run(&ledger, &catalog, token.as_deref()).await
        }
        AppCommand::Watchlist(action) => {
            cli::watchlist::run(&ledger, &prices, &catalog, action).await
        }
        AppCommand::Export { path } => cli::transfer::export(&ledger, &path).await,
        AppCommand::Import { path } => cli::transfer::import(&ledger, &catalog, &path).await,
        AppCommand::Tokens | AppCommand::Price { .. } | AppCommand::ClearCache => {
            unreachable!("handled before opening the ledger")
        }
    };
    ledger.close().await;
    result
}
