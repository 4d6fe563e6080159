//! Market data provider implementations

pub mod coingecko;
pub mod fallback;

pub use coingecko::CoinGeckoProvider;
pub use fallback::{FallbackChain, TickOutcome};
