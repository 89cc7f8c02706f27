pub mod disk;
pub mod memory;
pub mod sqlite;

use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::price::PriceQuote;
use disk::DiskCache;
use memory::MemoryCache;
use std::sync::Arc;
use tracing::warn;

pub use sqlite::Ledger;

pub type PriceCache = Arc<dyn Cache<String, PriceQuote>>;

const PRICE_PARTITION: &str = "prices";

/// Opens the persistent price cache, degrading to an in-memory one when the
/// data directory is unusable.
pub fn open_price_cache(config: &AppConfig) -> PriceCache {
    let disk = config
        .cache_path()
        .and_then(|path| DiskCache::<PriceQuote>::open(&path, PRICE_PARTITION));

    match disk {
        Ok(cache) => Arc::new(cache),
        Err(e) => {
            warn!(error = %e, "Disk cache unavailable, falling back to memory");
            Arc::new(MemoryCache::new())
        }
    }
}
