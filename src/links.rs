//! Outbound links shown on the home page

use crate::constants::{DEXSCREENER_PAIR, TELEGRAM_URL, TOKEN_MINT, X_COMMUNITY_URL};
use crate::error::ConfigError;
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// Swap, chart and social links for one token mint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalLinks {
    pub mint: String,
    pub jupiter_swap: String,
    pub raydium_swap: String,
    pub jupiter_token: String,
    pub dexscreener: String,
    pub chart_embed: String,
    pub x_community: String,
    pub telegram: String,
}

impl ExternalLinks {
    /// Builds the links for `mint` and `pair`
    ///
    /// Fails if `mint` is not a valid Solana public key.
    pub fn new(mint: &str, pair: &str) -> Result<Self, ConfigError> {
        let mint = Pubkey::from_str(mint)
            .map_err(|e| ConfigError::InvalidMint {
                address: mint.to_string(),
                reason: e.to_string(),
            })?
            .to_string();

        Ok(Self {
            jupiter_swap: format!("https://jup.ag/swap/SOL-{}", mint),
            raydium_swap: format!("https://raydium.io/swap/?inputMint=sol&outputMint={}", mint),
            jupiter_token: format!("https://jup.ag/tokens/{}", mint),
            dexscreener: format!("https://dexscreener.com/solana/{}", pair),
            chart_embed: format!(
                "https://dexscreener.com/solana/{}?embed=1&theme=dark&trades=0&info=0",
                pair
            ),
            x_community: X_COMMUNITY_URL.to_string(),
            telegram: TELEGRAM_URL.to_string(),
            mint,
        })
    }

    /// Links for the configured token
    pub fn token() -> Result<Self, ConfigError> {
        Self::new(TOKEN_MINT, DEXSCREENER_PAIR)
    }
}
