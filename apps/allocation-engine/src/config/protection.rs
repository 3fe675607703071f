//! Protective level configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::risk::ProtectionPolicy;

/// Volatility source and protective multipliers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionConfig {
    /// Bar period of the volatility indicator.
    #[serde(default = "default_volatility_period")]
    pub volatility_period: String,
    /// Bars the indicator looks back over.
    #[serde(default = "default_lookback")]
    pub lookback: u32,
    /// Take-profit distance in volatility units.
    #[serde(default = "default_take_profit_multiplier")]
    pub take_profit_multiplier: Decimal,
    /// Stop-loss distance in volatility units.
    #[serde(default = "default_stop_loss_multiplier")]
    pub stop_loss_multiplier: Decimal,
}

impl Default for ProtectionConfig {
    fn default() -> Self {
        Self {
            volatility_period: default_volatility_period(),
            lookback: default_lookback(),
            take_profit_multiplier: default_take_profit_multiplier(),
            stop_loss_multiplier: default_stop_loss_multiplier(),
        }
    }
}

impl ProtectionConfig {
    /// Convert to the domain policy.
    #[must_use]
    pub const fn to_policy(&self) -> ProtectionPolicy {
        ProtectionPolicy {
            take_profit_multiplier: self.take_profit_multiplier,
            stop_loss_multiplier: self.stop_loss_multiplier,
        }
    }
}

fn default_volatility_period() -> String {
    "H1".to_string()
}

const fn default_lookback() -> u32 {
    14
}

const fn default_take_profit_multiplier() -> Decimal {
    dec!(2)
}

const fn default_stop_loss_multiplier() -> Decimal {
    dec!(3)
}
