//! Position sizing configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::risk::{PositionSizerConfig, SizingPolicy};

/// Sizing configuration, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SizingConfig {
    /// Fixed fraction of equity per trade.
    EquityFraction {
        /// Fraction of equity committed per trade.
        trade_fraction: Decimal,
        /// Allocation cap and drawdown tolerance as a fraction of equity.
        #[serde(default = "default_max_fraction")]
        max_fraction: Decimal,
    },
    /// Base size grown per consecutive loss.
    Martingale {
        /// Size after a win.
        base_size: Decimal,
        /// Growth per consecutive loss.
        factor: Decimal,
        /// Streak length at which sizing restarts.
        max_streak: u32,
        /// Drawdown tolerance as a fraction of equity.
        #[serde(default = "default_max_fraction")]
        max_fraction: Decimal,
    },
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self::EquityFraction {
            trade_fraction: dec!(0.01),
            max_fraction: default_max_fraction(),
        }
    }
}

impl SizingConfig {
    /// Fraction of equity bounding allocations and drawdowns.
    #[must_use]
    pub const fn max_fraction(&self) -> Decimal {
        match self {
            Self::EquityFraction { max_fraction, .. } | Self::Martingale { max_fraction, .. } => {
                *max_fraction
            }
        }
    }

    /// Convert to the sizer's configuration.
    #[must_use]
    pub const fn to_sizer_config(&self) -> PositionSizerConfig {
        let policy = match *self {
            Self::EquityFraction { trade_fraction, .. } => {
                SizingPolicy::EquityFraction { trade_fraction }
            }
            Self::Martingale {
                base_size,
                factor,
                max_streak,
                ..
            } => SizingPolicy::Martingale {
                base_size,
                factor,
                max_streak,
            },
        };
        PositionSizerConfig {
            policy,
            max_fraction: self.max_fraction(),
        }
    }
}

const fn default_max_fraction() -> Decimal {
    dec!(0.05)
}
