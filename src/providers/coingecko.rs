//! CoinGecko market data provider implementation

use crate::{
    config::PollerConfig,
    constants::{COINGECKO_MARKETS_ENDPOINT, COINGECKO_SIMPLE_PRICE_ENDPOINT, USER_AGENT},
    error::ProviderError,
    provider::MarketDataSource,
    types::{CoinMarket, SimplePrice},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// CoinGecko API response for simple price queries
#[derive(Debug, serde::Deserialize)]
struct SimplePriceResponse {
    #[serde(flatten)]
    prices: HashMap<String, SimplePrice>,
}

/// CoinGecko market data provider
pub struct CoinGeckoProvider {
    client: Client,
    api_url: String,
}

impl CoinGeckoProvider {
    /// Creates a new CoinGecko provider
    pub fn new(config: &PollerConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(ProviderError::NetworkError)?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }

    /// Builds the `/coins/markets` URL for one token
    fn markets_url(&self, token_id: &str) -> String {
        format!(
            "{}{}?vs_currency=usd&ids={}&order=market_cap_desc&per_page=1&page=1&sparkline=false&price_change_percentage=24h",
            self.api_url, COINGECKO_MARKETS_ENDPOINT, token_id
        )
    }

    /// Builds the `/simple/price` URL for one token
    fn simple_price_url(&self, token_id: &str) -> String {
        format!(
            "{}{}?ids={}&vs_currencies=usd&include_market_cap=true&include_24hr_vol=true&include_24hr_change=true",
            self.api_url, COINGECKO_SIMPLE_PRICE_ENDPOINT, token_id
        )
    }

    /// Issues a GET and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ProviderError> {
        log::debug!("Fetching market data from CoinGecko: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout
            } else {
                ProviderError::NetworkError(e)
            }
        })?;

        // Check for rate limiting
        if response.status().as_u16() == 429 {
            return Err(ProviderError::RateLimitExceeded);
        }

        // Check for other errors
        if !response.status().is_success() {
            return Err(ProviderError::ApiError(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let response_text = response.text().await.map_err(ProviderError::NetworkError)?;

        serde_json::from_str(&response_text).map_err(|e| {
            ProviderError::InvalidResponse(format!(
                "Failed to parse CoinGecko response: {}. Response: {}",
                e, response_text
            ))
        })
    }
}

/// Picks the first market entry
fn first_market(markets: Vec<CoinMarket>, token_id: &str) -> Result<CoinMarket, ProviderError> {
    markets
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::no_data(token_id))
}

/// Picks the quote keyed by the token id
fn quote_for(response: SimplePriceResponse, token_id: &str) -> Result<SimplePrice, ProviderError> {
    let mut prices = response.prices;
    prices
        .remove(token_id)
        .ok_or_else(|| ProviderError::no_data(token_id))
}

#[async_trait]
impl MarketDataSource for CoinGeckoProvider {
    async fn fetch_market(&self, token_id: &str) -> Result<CoinMarket, ProviderError> {
        let markets: Vec<CoinMarket> = self.get_json(&self.markets_url(token_id)).await?;
        let market = first_market(markets, token_id)?;

        log::debug!(
            "Fetched market data for {} from CoinGecko: price={:?}",
            token_id,
            market.current_price
        );

        Ok(market)
    }

    async fn fetch_simple_price(&self, token_id: &str) -> Result<SimplePrice, ProviderError> {
        let response: SimplePriceResponse = self.get_json(&self.simple_price_url(token_id)).await?;
        quote_for(response, token_id)
    }

    fn provider_name(&self) -> &'static str {
        "coingecko"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves exactly one HTTP response and returns the base URL to reach it
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; 4096];
            let _ = socket.read(&mut request).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{}", addr)
    }

    async fn local_provider(status: &'static str, body: &'static str) -> CoinGeckoProvider {
        let config = PollerConfig::default().with_api_url(serve_once(status, body).await);
        CoinGeckoProvider::new(&config).unwrap()
    }

    fn provider() -> CoinGeckoProvider {
        let config = PollerConfig::default().with_api_url("https://api.example.com/api/v3");
        CoinGeckoProvider::new(&config).unwrap()
    }

    #[test]
    fn test_markets_url() {
        assert_eq!(
            provider().markets_url("xend-it"),
            "https://api.example.com/api/v3/coins/markets?vs_currency=usd&ids=xend-it&order=market_cap_desc&per_page=1&page=1&sparkline=false&price_change_percentage=24h"
        );
    }

    #[test]
    fn test_simple_price_url() {
        assert_eq!(
            provider().simple_price_url("xend-it"),
            "https://api.example.com/api/v3/simple/price?ids=xend-it&vs_currencies=usd&include_market_cap=true&include_24hr_vol=true&include_24hr_change=true"
        );
    }

    #[test]
    fn test_first_market_empty_is_no_data() {
        let err = first_market(Vec::new(), "xend-it").unwrap_err();
        assert!(matches!(err, ProviderError::NoData(id) if id == "xend-it"));
    }

    #[test]
    fn test_parse_markets_body() {
        let body = r#"[{"id":"xend-it","symbol":"xend","current_price":0.0000412,
            "market_cap":41200.0,"total_volume":1500.5,"price_change_24h":-0.000001,
            "price_change_percentage_24h":-2.4,"circulating_supply":999000000.0,
            "total_supply":null,"ath":0.0002,"ath_change_percentage":-79.4,
            "atl":0.00000812,"atl_change_percentage":407.3,"sparkline_in_7d":null}]"#;
        let markets: Vec<CoinMarket> = serde_json::from_str(body).unwrap();
        let market = first_market(markets, "xend-it").unwrap();
        assert_eq!(market.current_price, Some(0.0000412));
        assert_eq!(market.total_supply, None);
        assert_eq!(market.atl_change_percentage, Some(407.3));
    }

    #[test]
    fn test_parse_simple_price_body() {
        let body = r#"{"xend-it":{"usd":0.0000415,"usd_market_cap":41500.0,"usd_24h_vol":1600.0,"usd_24h_change":1.2}}"#;
        let response: SimplePriceResponse = serde_json::from_str(body).unwrap();
        let quote = quote_for(response, "xend-it").unwrap();
        assert_eq!(quote.usd, Some(0.0000415));
        assert_eq!(quote.usd_24h_change, Some(1.2));
    }

    #[test]
    fn test_simple_price_missing_token() {
        let response: SimplePriceResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            quote_for(response, "xend-it"),
            Err(ProviderError::NoData(_))
        ));
    }

    #[tokio::test]
    async fn test_rate_limited_response() {
        let provider = local_provider("429 Too Many Requests", "{}").await;
        let err = provider.fetch_market("xend-it").await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimitExceeded));
    }

    #[tokio::test]
    async fn test_server_error_response() {
        let provider = local_provider("500 Internal Server Error", "oops").await;
        let err = provider.fetch_market("xend-it").await.unwrap_err();
        assert!(matches!(err, ProviderError::ApiError(ref msg) if msg.starts_with("HTTP 500")));
    }

    #[tokio::test]
    async fn test_markets_body_of_wrong_shape() {
        let provider = local_provider("200 OK", r#"{"error":"unexpected"}"#).await;
        let err = provider.fetch_market("xend-it").await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_empty_markets_list() {
        let provider = local_provider("200 OK", "[]").await;
        let err = provider.fetch_market("xend-it").await.unwrap_err();
        assert!(matches!(err, ProviderError::NoData(ref id) if id == "xend-it"));
    }

    #[tokio::test]
    async fn test_fetch_market_over_http() {
        let provider =
            local_provider("200 OK", r#"[{"id":"xend-it","current_price":0.0000412}]"#).await;
        let market = provider.fetch_market("xend-it").await.unwrap();
        assert_eq!(market.current_price, Some(0.0000412));
        assert_eq!(market.market_cap, None);
    }

    #[tokio::test]
    async fn test_simple_price_without_token_key() {
        let provider = local_provider("200 OK", r#"{"bonk":{"usd":0.00002}}"#).await;
        let err = provider.fetch_simple_price("xend-it").await.unwrap_err();
        assert!(matches!(err, ProviderError::NoData(_)));
    }
}
