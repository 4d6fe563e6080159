//! Types for the market data ticker

use crate::constants::LOADING;
use crate::format::{
    format_ath, format_atl, format_billions, format_millions, format_millions_nonzero,
    format_percent, format_price, format_thousands, format_thousands_nonzero, PercentSign,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// First element of the `/coins/markets` response
///
/// Every numeric field may be `null` or absent for thinly traded tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinMarket {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub total_volume: Option<f64>,
    #[serde(default)]
    pub price_change_24h: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub circulating_supply: Option<f64>,
    #[serde(default)]
    pub total_supply: Option<f64>,
    #[serde(default)]
    pub ath: Option<f64>,
    #[serde(default)]
    pub ath_change_percentage: Option<f64>,
    #[serde(default)]
    pub atl: Option<f64>,
    #[serde(default)]
    pub atl_change_percentage: Option<f64>,
}

/// Entry of the `/simple/price` response for one token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimplePrice {
    #[serde(default)]
    pub usd: Option<f64>,
    #[serde(default)]
    pub usd_market_cap: Option<f64>,
    #[serde(default)]
    pub usd_24h_vol: Option<f64>,
    #[serde(default)]
    pub usd_24h_change: Option<f64>,
}

/// Display-ready market statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketStats {
    pub price: String,
    pub market_cap: String,
    pub volume_24h: String,
    pub price_change_24h: f64,
    pub price_change_percentage_24h: f64,
    pub circulating_supply: String,
    pub total_supply: String,
    pub ath: String,
    pub ath_change_percentage: f64,
    pub atl: String,
    pub atl_change_percentage: f64,
    /// When the price fields were last refreshed
    pub last_updated: DateTime<Utc>,
    /// Provider that produced the price fields
    pub source: String,
}

impl MarketStats {
    /// Statistics shown before anything has been fetched
    pub fn loading() -> Self {
        Self {
            price: LOADING.to_string(),
            market_cap: LOADING.to_string(),
            volume_24h: LOADING.to_string(),
            price_change_24h: 0.0,
            price_change_percentage_24h: 0.0,
            circulating_supply: LOADING.to_string(),
            total_supply: LOADING.to_string(),
            ath: LOADING.to_string(),
            ath_change_percentage: 0.0,
            atl: LOADING.to_string(),
            atl_change_percentage: 0.0,
            last_updated: Utc::now(),
            source: String::new(),
        }
    }

    /// Maps a primary response into display values
    pub fn from_market(coin: &CoinMarket, source: &str) -> Self {
        Self {
            price: format_price(coin.current_price),
            market_cap: format_millions(coin.market_cap),
            volume_24h: format_thousands(coin.total_volume),
            price_change_24h: coin.price_change_24h.unwrap_or(0.0),
            price_change_percentage_24h: coin.price_change_percentage_24h.unwrap_or(0.0),
            circulating_supply: format_billions(coin.circulating_supply),
            total_supply: format_billions(coin.total_supply),
            ath: format_ath(coin.ath),
            ath_change_percentage: coin.ath_change_percentage.unwrap_or(0.0),
            atl: format_atl(coin.atl),
            atl_change_percentage: coin.atl_change_percentage.unwrap_or(0.0),
            last_updated: Utc::now(),
            source: source.to_string(),
        }
    }

    /// Overwrites the four fields the fallback endpoint carries
    ///
    /// Supply and all-time fields are left as they were.
    pub fn patch_price(&mut self, quote: &SimplePrice, source: &str) {
        self.price = format_price(Some(quote.usd.unwrap_or(0.0)));
        self.market_cap = format_millions_nonzero(quote.usd_market_cap);
        self.volume_24h = format_thousands_nonzero(quote.usd_24h_vol);
        self.price_change_percentage_24h = quote.usd_24h_change.unwrap_or(0.0);
        self.last_updated = Utc::now();
        self.source = source.to_string();
    }

    /// 24h change, e.g. `+2.50%`
    pub fn price_change_display(&self) -> String {
        format_percent(self.price_change_percentage_24h, 2, PercentSign::PlusWhenNonNegative)
    }

    /// Distance from the all-time high, e.g. `-90.0%`
    pub fn ath_change_display(&self) -> String {
        format_percent(self.ath_change_percentage, 1, PercentSign::PlusWhenPositive)
    }

    /// Distance from the all-time low under the given sign policy
    pub fn atl_change_display(&self, sign: PercentSign) -> String {
        format_percent(self.atl_change_percentage, 1, sign)
    }
}

/// Latest known market statistics
///
/// `PartialPriceOnly` means the last tick came from the fallback endpoint:
/// price, market cap, volume and 24h change are fresh, supply and all-time
/// fields are whatever the previous snapshot held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "stats", rename_all = "snake_case")]
pub enum MarketSnapshot {
    Loading,
    Full(MarketStats),
    PartialPriceOnly(MarketStats),
}

impl MarketSnapshot {
    /// The statistics, if anything has been fetched
    pub fn stats(&self) -> Option<&MarketStats> {
        match self {
            MarketSnapshot::Loading => None,
            MarketSnapshot::Full(stats) | MarketSnapshot::PartialPriceOnly(stats) => Some(stats),
        }
    }

    /// True when every field came from the same primary response
    pub fn is_full(&self) -> bool {
        matches!(self, MarketSnapshot::Full(_))
    }

    /// True when supply and all-time fields may be stale
    pub fn is_partial(&self) -> bool {
        matches!(self, MarketSnapshot::PartialPriceOnly(_))
    }

    /// Applies a fallback quote on top of this snapshot
    pub fn patched(self, quote: &SimplePrice, source: &str) -> Self {
        let mut stats = match self {
            MarketSnapshot::Loading => MarketStats::loading(),
            MarketSnapshot::Full(stats) | MarketSnapshot::PartialPriceOnly(stats) => stats,
        };
        stats.patch_price(quote, source);
        MarketSnapshot::PartialPriceOnly(stats)
    }

    /// Short label used in logs and health details
    pub fn kind(&self) -> &'static str {
        match self {
            MarketSnapshot::Loading => "loading",
            MarketSnapshot::Full(_) => "full",
            MarketSnapshot::PartialPriceOnly(_) => "partial_price_only",
        }
    }
}

/// Everything the poller publishes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerState {
    /// Headline price; the placeholder when both endpoints failed
    pub headline_price: String,
    /// Set while the headline shows the placeholder
    pub placeholder: bool,
    pub snapshot: MarketSnapshot,
}

impl TickerState {
    /// State before the first tick
    pub fn loading() -> Self {
        Self {
            headline_price: LOADING.to_string(),
            placeholder: false,
            snapshot: MarketSnapshot::Loading,
        }
    }

    /// Replaces the snapshot with a fresh primary result
    pub fn apply_full(&mut self, coin: &CoinMarket, source: &str) {
        let stats = MarketStats::from_market(coin, source);
        self.headline_price = stats.price.clone();
        self.placeholder = false;
        self.snapshot = MarketSnapshot::Full(stats);
    }

    /// Patches price fields from a fallback quote
    pub fn apply_partial(&mut self, quote: &SimplePrice, source: &str) {
        let snapshot = std::mem::replace(&mut self.snapshot, MarketSnapshot::Loading);
        self.snapshot = snapshot.patched(quote, source);
        if let Some(stats) = self.snapshot.stats() {
            self.headline_price = stats.price.clone();
        }
        self.placeholder = false;
    }

    /// Swaps only the headline price for the placeholder
    pub fn apply_placeholder(&mut self, placeholder: &str) {
        self.headline_price = placeholder.to_string();
        self.placeholder = true;
    }
}

impl Default for TickerState {
    fn default() -> Self {
        Self::loading()
    }
}

/// Poller lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollerStatus {
    Running,
    Stopped,
}

/// Which tick outcome produced an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    Full,
    Partial,
    Placeholder,
}

/// Ticker events broadcast to subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TickerEvent {
    /// A new primary snapshot was published
    SnapshotPublished {
        id: Uuid,
        token_id: String,
        price: String,
        revision: u64,
        timestamp: DateTime<Utc>,
    },

    /// The primary endpoint failed and the fallback quote was applied
    FallbackUsed {
        id: Uuid,
        token_id: String,
        price: String,
        primary_error: String,
        revision: u64,
        timestamp: DateTime<Utc>,
    },

    /// Both endpoints failed and the headline shows the placeholder
    PlaceholderApplied {
        id: Uuid,
        token_id: String,
        error_message: String,
        revision: u64,
        timestamp: DateTime<Utc>,
    },

    /// A tick resolved after its session was stopped
    ResultDiscarded {
        id: Uuid,
        token_id: String,
        kind: UpdateKind,
        timestamp: DateTime<Utc>,
    },

    /// The poller started or stopped
    PollerStatusChanged {
        id: Uuid,
        status: PollerStatus,
        timestamp: DateTime<Utc>,
    },
}

impl TickerEvent {
    /// Get the event ID
    pub fn id(&self) -> Uuid {
        match self {
            TickerEvent::SnapshotPublished { id, .. } => *id,
            TickerEvent::FallbackUsed { id, .. } => *id,
            TickerEvent::PlaceholderApplied { id, .. } => *id,
            TickerEvent::ResultDiscarded { id, .. } => *id,
            TickerEvent::PollerStatusChanged { id, .. } => *id,
        }
    }

    /// Get the event type as string
    pub fn event_type(&self) -> &'static str {
        match self {
            TickerEvent::SnapshotPublished { .. } => "SNAPSHOT_PUBLISHED",
            TickerEvent::FallbackUsed { .. } => "FALLBACK_USED",
            TickerEvent::PlaceholderApplied { .. } => "PLACEHOLDER_APPLIED",
            TickerEvent::ResultDiscarded { .. } => "RESULT_DISCARDED",
            TickerEvent::PollerStatusChanged { .. } => "POLLER_STATUS_CHANGED",
        }
    }
}

impl std::fmt::Display for TickerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TickerEvent::SnapshotPublished {
                token_id, price, ..
            } => write!(f, "Snapshot published: {} = ${}", token_id, price),
            TickerEvent::FallbackUsed {
                token_id,
                price,
                primary_error,
                ..
            } => write!(
                f,
                "Fallback price for {} = ${} (primary failed: {})",
                token_id, price, primary_error
            ),
            TickerEvent::PlaceholderApplied {
                token_id,
                error_message,
                ..
            } => write!(f, "Placeholder price for {}: {}", token_id, error_message),
            TickerEvent::ResultDiscarded { token_id, kind, .. } => {
                write!(f, "Discarded late {:?} result for {}", kind, token_id)
            }
            TickerEvent::PollerStatusChanged { status, .. } => {
                write!(f, "Poller status: {:?}", status)
            }
        }
    }
}

/// Overall component health status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Fresh, complete data
    Healthy,
    /// Showing partial or placeholder data
    Degraded,
    /// No data yet
    Unhealthy,
}

/// Component health information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Optional status message
    pub message: Option<String>,
    /// Component-specific details
    pub details: std::collections::HashMap<String, serde_json::Value>,
    /// Last checked timestamp
    pub last_checked: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FALLBACK_PRICE;

    fn full_coin() -> CoinMarket {
        CoinMarket {
            id: "xend-it".to_string(),
            current_price: Some(0.00004123),
            market_cap: Some(12_345_678.0),
            total_volume: Some(45_678.0),
            price_change_24h: Some(0.0000012),
            price_change_percentage_24h: Some(2.5),
            circulating_supply: Some(999_950_000.0),
            total_supply: Some(1_000_000_000.0),
            ath: Some(0.0001),
            ath_change_percentage: Some(-58.8),
            atl: Some(0.000001),
            atl_change_percentage: Some(-12.0),
        }
    }

    #[test]
    fn test_from_market_maps_all_fields() {
        let stats = MarketStats::from_market(&full_coin(), "coingecko");
        assert_eq!(stats.price, "0.00004123");
        assert_eq!(stats.market_cap, "12.346M");
        assert_eq!(stats.volume_24h, "45.7K");
        assert_eq!(stats.circulating_supply, "1.00B");
        assert_eq!(stats.total_supply, "1.00B");
        assert_eq!(stats.ath, "0.00010000");
        assert_eq!(stats.atl, "0.0000010000");
        assert_eq!(stats.price_change_percentage_24h, 2.5);
        assert_eq!(stats.source, "coingecko");
        assert_eq!(stats.price_change_display(), "+2.50%");
        assert_eq!(stats.ath_change_display(), "-58.8%");
        assert_eq!(stats.atl_change_display(PercentSign::ForcedMagnitude), "+12.0%");
        assert_eq!(stats.atl_change_display(PercentSign::PlusWhenPositive), "-12.0%");
    }

    #[test]
    fn test_from_market_missing_fields() {
        let coin = CoinMarket {
            id: "xend-it".to_string(),
            ..Default::default()
        };
        let stats = MarketStats::from_market(&coin, "coingecko");
        assert_eq!(stats.price, "0.00");
        assert_eq!(stats.market_cap, "N/A");
        assert_eq!(stats.volume_24h, "N/A");
        assert_eq!(stats.circulating_supply, "N/A");
        assert_eq!(stats.total_supply, "N/A");
        assert_eq!(stats.ath, "0.00");
        assert_eq!(stats.atl, "0.00");
        assert_eq!(stats.price_change_percentage_24h, 0.0);
    }

    #[test]
    fn test_coin_market_deserializes_nulls() {
        let json = r#"{"id":"xend-it","current_price":0.00005,"market_cap":null,"circulating_supply":null}"#;
        let coin: CoinMarket = serde_json::from_str(json).unwrap();
        assert_eq!(coin.current_price, Some(0.00005));
        assert_eq!(coin.market_cap, None);
        assert_eq!(coin.total_supply, None);
    }

    #[test]
    fn test_patch_keeps_supply_and_extrema() {
        let mut state = TickerState::loading();
        state.apply_full(&full_coin(), "coingecko");

        let quote = SimplePrice {
            usd: Some(0.00005),
            usd_market_cap: Some(15_000_000.0),
            usd_24h_vol: Some(0.0),
            usd_24h_change: Some(-1.5),
        };
        state.apply_partial(&quote, "coingecko_simple");

        assert!(state.snapshot.is_partial());
        let stats = state.snapshot.stats().unwrap();
        assert_eq!(stats.price, "0.00005000");
        assert_eq!(stats.market_cap, "15.000M");
        assert_eq!(stats.volume_24h, "N/A");
        assert_eq!(stats.price_change_percentage_24h, -1.5);
        assert_eq!(stats.circulating_supply, "1.00B");
        assert_eq!(stats.ath, "0.00010000");
        assert_eq!(stats.atl, "0.0000010000");
        assert_eq!(state.headline_price, "0.00005000");
    }

    #[test]
    fn test_patch_from_loading_keeps_loading_placeholders() {
        let snapshot = MarketSnapshot::Loading.patched(&SimplePrice::default(), "coingecko_simple");
        let stats = snapshot.stats().unwrap();
        assert_eq!(stats.price, "0.00000000");
        assert_eq!(stats.market_cap, "N/A");
        assert_eq!(stats.total_supply, "Loading...");
        assert_eq!(stats.ath, "Loading...");
    }

    #[test]
    fn test_placeholder_only_touches_headline() {
        let mut state = TickerState::loading();
        state.apply_full(&full_coin(), "coingecko");
        let before = state.snapshot.clone();

        state.apply_placeholder(FALLBACK_PRICE);

        assert!(state.placeholder);
        assert_eq!(state.headline_price, "$0.00004000");
        assert_eq!(state.snapshot, before);
    }

    #[test]
    fn test_snapshot_serializes_tagged() {
        let json = serde_json::to_value(MarketSnapshot::Loading).unwrap();
        assert_eq!(json["kind"], "loading");
    }
}
