//! Provider abstraction for fetching market data from external APIs

use crate::{
    error::ProviderError,
    types::{CoinMarket, SimplePrice},
};
use async_trait::async_trait;

/// Trait for market data sources
///
/// A source exposes two endpoints of different richness: a full market
/// listing used on every tick, and a simpler current-price query used when
/// the listing is unavailable.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetches the full market listing for a single token
    ///
    /// # Arguments
    /// * `token_id` - The token identifier on the price index
    ///
    /// # Returns
    /// The first market entry, or an error if the request failed or the
    /// listing was empty
    async fn fetch_market(&self, token_id: &str) -> Result<CoinMarket, ProviderError>;

    /// Fetches the simple current-price quote for a single token
    async fn fetch_simple_price(&self, token_id: &str) -> Result<SimplePrice, ProviderError>;

    /// Returns the name of this provider
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::sync::Semaphore;
    use tokio::time::Instant;

    /// Mock source for testing
    ///
    /// Responses are stored as `Result<_, String>` because `ProviderError`
    /// is not `Clone`; errors come back as `ApiError`. A gate can be closed
    /// to hold requests in flight until the test releases them.
    #[derive(Clone)]
    pub struct MockSource {
        market: Arc<Mutex<Result<CoinMarket, String>>>,
        simple: Arc<Mutex<Result<SimplePrice, String>>>,
        market_calls: Arc<Mutex<usize>>,
        market_call_times: Arc<Mutex<Vec<Instant>>>,
        simple_calls: Arc<Mutex<usize>>,
        gate: Arc<Mutex<Option<Arc<Semaphore>>>>,
    }

    impl Default for MockSource {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockSource {
        pub fn new() -> Self {
            Self {
                market: Arc::new(Mutex::new(Err("no market response".to_string()))),
                simple: Arc::new(Mutex::new(Err("no simple response".to_string()))),
                market_calls: Arc::new(Mutex::new(0)),
                market_call_times: Arc::new(Mutex::new(Vec::new())),
                simple_calls: Arc::new(Mutex::new(0)),
                gate: Arc::new(Mutex::new(None)),
            }
        }

        pub fn set_market(&self, market: CoinMarket) {
            *self.market.lock().unwrap() = Ok(market);
        }

        pub fn set_market_error(&self, error: &str) {
            *self.market.lock().unwrap() = Err(error.to_string());
        }

        pub fn set_simple(&self, quote: SimplePrice) {
            *self.simple.lock().unwrap() = Ok(quote);
        }

        pub fn set_simple_error(&self, error: &str) {
            *self.simple.lock().unwrap() = Err(error.to_string());
        }

        /// Holds every subsequent `fetch_market` until permits are released
        pub fn close_gate(&self) -> Arc<Semaphore> {
            let semaphore = Arc::new(Semaphore::new(0));
            *self.gate.lock().unwrap() = Some(semaphore.clone());
            semaphore
        }

        pub fn market_calls(&self) -> usize {
            *self.market_calls.lock().unwrap()
        }

        /// When each `fetch_market` call started, on tokio's clock
        pub fn market_call_times(&self) -> Vec<Instant> {
            self.market_call_times.lock().unwrap().clone()
        }

        pub fn simple_calls(&self) -> usize {
            *self.simple_calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl MarketDataSource for MockSource {
        async fn fetch_market(&self, _token_id: &str) -> Result<CoinMarket, ProviderError> {
            *self.market_calls.lock().unwrap() += 1;
            self.market_call_times.lock().unwrap().push(Instant::now());
            let gate = self.gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                gate.acquire()
                    .await
                    .map_err(|e| ProviderError::ApiError(e.to_string()))?
                    .forget();
            }
            self.market
                .lock()
                .unwrap()
                .clone()
                .map_err(ProviderError::ApiError)
        }

        async fn fetch_simple_price(&self, _token_id: &str) -> Result<SimplePrice, ProviderError> {
            *self.simple_calls.lock().unwrap() += 1;
            self.simple
                .lock()
                .unwrap()
                .clone()
                .map_err(ProviderError::ApiError)
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }
}
