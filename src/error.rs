//! Error types for the market data ticker

use crate::navigation::{NavEvent, Page};
use thiserror::Error;

/// Errors that can occur when fetching market data from a provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network request failed
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Invalid response from provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Provider API error
    #[error("Provider API error: {0}")]
    ApiError(String),

    /// Response parsed but carried nothing for the token
    #[error("No market data for {0}")]
    NoData(String),

    /// Timeout waiting for response
    #[error("Request timeout")]
    Timeout,
}

impl ProviderError {
    /// Creates a NoData error
    pub fn no_data(token_id: &str) -> Self {
        Self::NoData(token_id.to_string())
    }
}

/// Errors raised by the page state machine
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// The event does not apply to the current page
    #[error("Cannot apply {event:?} while on {from:?}")]
    InvalidTransition { from: Page, event: NavEvent },

    /// The task moving the page to `Home` panicked or was cancelled
    #[error("Page transition did not complete")]
    TransitionAborted,
}

/// Errors that can occur while building configuration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment override could not be parsed
    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: String, value: String },

    /// A configured value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The token mint is not a valid Solana public key
    #[error("Invalid mint address {address}: {reason}")]
    InvalidMint { address: String, reason: String },
}

impl ConfigError {
    /// Creates an InvalidEnv error
    pub fn invalid_env(var: &str, value: impl Into<String>) -> Self {
        Self::InvalidEnv {
            var: var.to_string(),
            value: value.into(),
        }
    }
}
