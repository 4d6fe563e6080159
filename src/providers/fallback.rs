//! Primary-then-fallback fetch chain

use crate::{
    error::ProviderError,
    metrics::{Endpoint, PollMetrics},
    provider::MarketDataSource,
    types::{CoinMarket, SimplePrice},
};
use std::sync::Arc;
use std::time::Instant;

/// Result of one pass through the chain
#[derive(Debug)]
pub enum TickOutcome {
    /// The market listing succeeded
    Full(CoinMarket),
    /// The listing failed, the simple quote succeeded
    Partial {
        quote: SimplePrice,
        primary_error: ProviderError,
    },
    /// Both endpoints failed
    Unavailable {
        primary_error: ProviderError,
        fallback_error: ProviderError,
    },
}

/// Queries the market listing first and the simple price endpoint only when
/// the listing fails.
pub struct FallbackChain {
    source: Arc<dyn MarketDataSource>,
    metrics: Arc<PollMetrics>,
}

impl FallbackChain {
    /// Creates a chain over a single source
    pub fn new(source: Arc<dyn MarketDataSource>, metrics: Arc<PollMetrics>) -> Self {
        Self { source, metrics }
    }

    /// Name of the underlying provider
    pub fn provider_name(&self) -> &'static str {
        self.source.provider_name()
    }

    /// Runs the chain once. Never fails; every error ends up in the outcome.
    pub async fn run(&self, token_id: &str) -> TickOutcome {
        let start = Instant::now();
        let primary_error = match self.source.fetch_market(token_id).await {
            Ok(market) => {
                self.metrics
                    .record_request(Endpoint::Primary, start.elapsed(), true)
                    .await;
                return TickOutcome::Full(market);
            }
            Err(e) => {
                self.metrics
                    .record_request(Endpoint::Primary, start.elapsed(), false)
                    .await;
                log::warn!(
                    "Provider {} failed to fetch market data for {}: {}",
                    self.provider_name(),
                    token_id,
                    e
                );
                e
            }
        };

        let start = Instant::now();
        match self.source.fetch_simple_price(token_id).await {
            Ok(quote) => {
                self.metrics
                    .record_request(Endpoint::Fallback, start.elapsed(), true)
                    .await;
                TickOutcome::Partial {
                    quote,
                    primary_error,
                }
            }
            Err(fallback_error) => {
                self.metrics
                    .record_request(Endpoint::Fallback, start.elapsed(), false)
                    .await;
                log::warn!(
                    "Provider {} failed to fetch fallback price for {}: {}",
                    self.provider_name(),
                    token_id,
                    fallback_error
                );
                TickOutcome::Unavailable {
                    primary_error,
                    fallback_error,
                }
            }
        }
    }
}
