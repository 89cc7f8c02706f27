//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod ledger;
pub mod log;
pub mod portfolio;
pub mod price;
pub mod snapshot;
pub mod token;

// Re-export main types for cleaner imports
pub use cache::Cache;
pub use ledger::{Holding, Transaction, TransactionKind};
pub use price::{PriceProvider, PriceQuote, PriceSource};
pub use token::{Token, TokenCatalog};
