//! Display formatting for market statistics
//!
//! Every field of a [`MarketStats`](crate::types::MarketStats) goes through one
//! of these functions. Missing or non-finite inputs map to a sentinel string
//! instead of failing.

use crate::constants::{NOT_AVAILABLE, ZERO_PRICE};
use serde::{Deserialize, Serialize};

const MILLION: f64 = 1_000_000.0;
const THOUSAND: f64 = 1_000.0;
const BILLION: f64 = 1_000_000_000.0;

/// How a signed percentage is prefixed when displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentSign {
    /// `+` for zero and positive values, `-` for negatives
    #[default]
    PlusWhenNonNegative,
    /// `+` only for strictly positive values
    PlusWhenPositive,
    /// Always `+` followed by the absolute value
    ForcedMagnitude,
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn finite_nonzero(value: Option<f64>) -> Option<f64> {
    finite(value).filter(|v| *v != 0.0)
}

/// Clears the sign of negative zero so it never renders as `-0.00`
fn normalize(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

/// Price in USD with 8 fractional digits, `"0.00"` when missing
pub fn format_price(price: Option<f64>) -> String {
    match finite(price) {
        Some(p) => format!("{:.8}", normalize(p)),
        None => ZERO_PRICE.to_string(),
    }
}

/// Market cap in millions, e.g. `12.346M`
pub fn format_millions(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) => format!("{:.3}M", normalize(v / MILLION)),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// 24h volume in thousands, e.g. `45.7K`
pub fn format_thousands(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) => format!("{:.1}K", normalize(v / THOUSAND)),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Supply in billions, e.g. `1.00B`
///
/// A zero supply is reported by the index for tokens it has no supply data
/// for, so it maps to `N/A` like a missing one.
pub fn format_billions(value: Option<f64>) -> String {
    match finite_nonzero(value) {
        Some(v) => format!("{:.2}B", v / BILLION),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Same as [`format_millions`] but treats zero as missing
pub fn format_millions_nonzero(value: Option<f64>) -> String {
    format_millions(finite_nonzero(value))
}

/// Same as [`format_thousands`] but treats zero as missing
pub fn format_thousands_nonzero(value: Option<f64>) -> String {
    format_thousands(finite_nonzero(value))
}

/// All-time high, 8 fractional digits
pub fn format_ath(value: Option<f64>) -> String {
    format_price(value)
}

/// All-time low, 10 fractional digits
pub fn format_atl(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) => format!("{:.10}", normalize(v)),
        None => ZERO_PRICE.to_string(),
    }
}

/// Percentage with a fixed number of decimals and an explicit sign policy
pub fn format_percent(value: f64, decimals: usize, sign: PercentSign) -> String {
    let value = if value.is_finite() { normalize(value) } else { 0.0 };
    match sign {
        PercentSign::PlusWhenNonNegative if value >= 0.0 => {
            format!("+{:.*}%", decimals, value)
        }
        PercentSign::PlusWhenPositive if value > 0.0 => format!("+{:.*}%", decimals, value),
        PercentSign::ForcedMagnitude => format!("+{:.*}%", decimals, value.abs()),
        _ => format!("{:.*}%", decimals, value),
    }
}
