//! Constants for the market data ticker
//!
//! Defaults for everything the poller and the site need. `PollerConfig`
//! starts from these values and may override a few of them from the
//! environment.

/// Token identifier on the price index
pub const TOKEN_ID: &str = "xend-it";

/// How often to poll the market data endpoints (in milliseconds)
pub const POLL_INTERVAL_MS: u64 = 30_000;

/// HTTP request timeout when fetching market data (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// How long the splash-to-home transition lasts (in milliseconds)
pub const TRANSITION_DURATION_MS: u64 = 2_000;

/// Headline price shown when both endpoints fail
pub const FALLBACK_PRICE: &str = "$0.00004000";

/// Display value before the first tick lands
pub const LOADING: &str = "Loading...";

/// Display value for a missing magnitude
pub const NOT_AVAILABLE: &str = "N/A";

/// Display value for a missing price
pub const ZERO_PRICE: &str = "0.00";

/// CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Primary endpoint: full market listing
pub const COINGECKO_MARKETS_ENDPOINT: &str = "/coins/markets";

/// Fallback endpoint: simple price query
pub const COINGECKO_SIMPLE_PRICE_ENDPOINT: &str = "/simple/price";

/// User agent for HTTP requests
pub const USER_AGENT: &str = "xend-market-sdk/0.1.0";

/// Environment override for the API base URL
pub const ENV_API_URL: &str = "XEND_MARKET_API_URL";

/// Environment override for the token identifier
pub const ENV_TOKEN_ID: &str = "XEND_MARKET_TOKEN_ID";

/// Environment override for the poll interval (milliseconds)
pub const ENV_POLL_INTERVAL_MS: &str = "XEND_MARKET_POLL_INTERVAL_MS";

/// Token mint address on Solana
pub const TOKEN_MINT: &str = "ERtzyCSu9FPvdxwsUS13cueHfFWQNkSvbKh5nTpUpump";

/// DexScreener pair identifier for the chart
pub const DEXSCREENER_PAIR: &str = "ft9pg1expv89kksi5lb9c25zbms8sre7hmz6axymc7jw";

/// X (Twitter) community
pub const X_COMMUNITY_URL: &str = "https://x.com/i/communities/1953459548263469520";

/// Telegram group
pub const TELEGRAM_URL: &str = "https://t.me/xend_it";
