//! Runtime configuration for the poller
//!
//! Defaults come from [`crate::constants`]. The API URL, token id and poll
//! interval can be overridden from the environment.

use crate::constants::{
    COINGECKO_API_URL, ENV_API_URL, ENV_POLL_INTERVAL_MS, ENV_TOKEN_ID, FALLBACK_PRICE,
    POLL_INTERVAL_MS, REQUEST_TIMEOUT_SECS, TOKEN_ID, TRANSITION_DURATION_MS,
};
use crate::error::ConfigError;
use crate::format::PercentSign;
use std::time::Duration;

/// Settings shared by the poller, the provider and the site controller
#[derive(Debug, Clone, PartialEq)]
pub struct PollerConfig {
    /// Price index base URL (no trailing slash)
    pub api_url: String,
    /// Token identifier on the price index
    pub token_id: String,
    /// Time between ticks
    pub poll_interval: Duration,
    /// HTTP request timeout
    pub request_timeout: Duration,
    /// Splash-to-home transition length
    pub transition_duration: Duration,
    /// Headline shown when both endpoints fail
    pub fallback_price: String,
    /// Sign policy for the all-time-low change column
    pub atl_sign_policy: PercentSign,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            api_url: COINGECKO_API_URL.to_string(),
            token_id: TOKEN_ID.to_string(),
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            transition_duration: Duration::from_millis(TRANSITION_DURATION_MS),
            fallback_price: FALLBACK_PRICE.to_string(),
            atl_sign_policy: PercentSign::ForcedMagnitude,
        }
    }
}

impl PollerConfig {
    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Applies overrides from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            let url = url.trim().trim_end_matches('/').to_string();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::invalid_env(ENV_API_URL, url));
            }
            config.api_url = url;
        }

        if let Some(token_id) = lookup(ENV_TOKEN_ID) {
            let token_id = token_id.trim().to_string();
            if token_id.is_empty() {
                return Err(ConfigError::invalid_env(ENV_TOKEN_ID, token_id));
            }
            config.token_id = token_id;
        }

        if let Some(raw) = lookup(ENV_POLL_INTERVAL_MS) {
            let ms: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid_env(ENV_POLL_INTERVAL_MS, raw.clone()))?;
            config.poll_interval = Duration::from_millis(ms);
        }

        config.validate()?;
        Ok(config)
    }

    /// Rejects values the poller cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Invalid("poll interval must be non-zero".to_string()));
        }
        if self.token_id.is_empty() {
            return Err(ConfigError::Invalid("token id must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_token_id(mut self, token_id: impl Into<String>) -> Self {
        self.token_id = token_id.into();
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_transition_duration(mut self, transition_duration: Duration) -> Self {
        self.transition_duration = transition_duration;
        self
    }

    pub fn with_atl_sign_policy(mut self, policy: PercentSign) -> Self {
        self.atl_sign_policy = policy;
        self
    }
}
