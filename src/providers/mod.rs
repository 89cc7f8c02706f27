pub mod coincap;
pub mod coingecko;
pub mod cryptocompare;
pub mod fallback;
pub mod livecoinwatch;
pub mod util;

pub use fallback::FallbackPriceProvider;
