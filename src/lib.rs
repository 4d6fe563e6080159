//! # XEND IT Market Data SDK
//!
//! Keeps a display-ready snapshot of the token's market statistics fresh
//! while the site's home page is showing, using CoinGecko's market listing
//! with its simple price endpoint as a fallback.
//!
//! ## Usage
//!
//! The poller is an explicit lifecycle object owned by whatever shows the
//! data. Usually that is the [`SiteController`], which starts it when the
//! home page is reached and stops it when the home page is left:
//!
//! ```no_run
//! use std::sync::Arc;
//! use xend_market_sdk::{ExternalLinks, MarketDataPoller, PollerConfig, SiteController};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let poller = MarketDataPoller::new(PollerConfig::from_env()?)?;
//! let site = SiteController::new(Arc::new(poller), ExternalLinks::token()?);
//!
//! site.enter().await?;
//! let ticker = site.ticker().await;
//! println!("XEND: ${} ({})", ticker.headline_price, ticker.snapshot.kind());
//!
//! site.leave().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Degradation
//!
//! ```text
//! /coins/markets  --ok-->  MarketSnapshot::Full
//!      | err
//! /simple/price   --ok-->  MarketSnapshot::PartialPriceOnly (supply/ATH/ATL stale)
//!      | err
//! headline price = "$0.00004000", snapshot unchanged
//! ```
//!
//! No tick error ever reaches the caller; failures are logged and reflected
//! in [`MarketDataPoller::health_check`] and the [`TickerEvent`] stream.

pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod links;
pub mod metrics;
pub mod navigation;
pub mod poller;
pub mod provider;
pub mod providers;
pub mod site;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::PollerConfig;
pub use error::{ConfigError, NavigationError, ProviderError};
pub use format::PercentSign;
pub use links::ExternalLinks;
pub use metrics::PollerMetrics;
pub use navigation::{NavEvent, Page, Tab};
pub use poller::MarketDataPoller;
pub use site::SiteController;
pub use types::{
    ComponentHealth, HealthStatus, MarketSnapshot, MarketStats, TickerEvent, TickerState,
    UpdateKind,
};
