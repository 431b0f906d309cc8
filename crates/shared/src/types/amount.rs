//! Amount normalization and asset types.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All balances and amounts are `rust_decimal::Decimal`, normalized to
//! 8 decimal places (the smallest unit of the supported assets).

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places every ledger amount is normalized to.
pub const AMOUNT_SCALE: u32 = 8;

/// Normalizes an amount to [`AMOUNT_SCALE`] decimal places using
/// Banker's Rounding (round half to even).
#[must_use]
pub fn round8(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Cryptocurrency assets a custodial balance can be denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Asset {
    /// Bitcoin
    Btc,
    /// Ether
    Eth,
    /// Tether (USD stablecoin)
    Usdt,
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Btc => write!(f, "BTC"),
            Self::Eth => write!(f, "ETH"),
            Self::Usdt => write!(f, "USDT"),
        }
    }
}

impl std::str::FromStr for Asset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BTC" => Ok(Self::Btc),
            "ETH" => Ok(Self::Eth),
            "USDT" => Ok(Self::Usdt),
            _ => Err(format!("Unknown asset: {s}")),
        }
    }
}
