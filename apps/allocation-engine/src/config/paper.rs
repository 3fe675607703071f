//! Paper trading configuration used by the `paper-run` binary.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Synthetic market and simulated account settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperConfig {
    /// Equity before any trade.
    #[serde(default = "default_starting_equity")]
    pub starting_equity: Decimal,
    /// Commission charged per round trip.
    #[serde(default = "default_commission")]
    pub commission: Decimal,
    /// Fixed volatility reading per symbol.
    #[serde(default)]
    pub volatility: HashMap<String, Decimal>,
    /// Starting mid price per symbol.
    #[serde(default)]
    pub initial_prices: HashMap<String, Decimal>,
    /// Largest random-walk step per tick, in points.
    #[serde(default = "default_step_points")]
    pub step_points: u32,
    /// Quoted spread in points.
    #[serde(default = "default_spread_points")]
    pub spread_points: u32,
    /// Random seed of the synthetic feed.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Ticks to replay per symbol.
    #[serde(default = "default_ticks")]
    pub ticks: usize,
    /// Ticks per admission bar.
    #[serde(default = "default_ticks_per_bar")]
    pub ticks_per_bar: usize,
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            starting_equity: default_starting_equity(),
            commission: default_commission(),
            volatility: HashMap::new(),
            initial_prices: HashMap::new(),
            step_points: default_step_points(),
            spread_points: default_spread_points(),
            seed: default_seed(),
            ticks: default_ticks(),
            ticks_per_bar: default_ticks_per_bar(),
        }
    }
}

const fn default_starting_equity() -> Decimal {
    dec!(10000)
}

const fn default_commission() -> Decimal {
    dec!(2)
}

const fn default_step_points() -> u32 {
    20
}

const fn default_spread_points() -> u32 {
    2
}

const fn default_seed() -> u64 {
    42
}

const fn default_ticks() -> usize {
    20_000
}

const fn default_ticks_per_bar() -> usize {
    60
}
