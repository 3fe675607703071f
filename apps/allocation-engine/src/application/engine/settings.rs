//! Runtime settings of the allocation engine.

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::risk::{PositionSizerConfig, ProtectionPolicy, SizingPolicy};

/// Settings the engine runs with, resolved from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Outcomes kept per variant for the win rate.
    pub window_size: usize,
    /// Minimum win rate (percent) for admission.
    pub win_rate_threshold: Decimal,
    /// Maximum number of simultaneously live orders.
    pub max_concurrent: usize,
    /// Bar period whose completion triggers an admission pass.
    pub admission_period: String,
    /// Bar period the volatility indicator is computed on.
    pub volatility_period: String,
    /// Bars the volatility indicator looks back over.
    pub volatility_lookback: u32,
    /// Upper bound on a close request.
    pub close_timeout: Duration,
    /// Protective level multipliers.
    pub protection: ProtectionPolicy,
    /// Sizing policy and drawdown fraction.
    pub sizing: PositionSizerConfig,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            window_size: 20,
            win_rate_threshold: dec!(80),
            max_concurrent: 5,
            admission_period: "M15".to_string(),
            volatility_period: "H1".to_string(),
            volatility_lookback: 14,
            close_timeout: Duration::from_millis(5000),
            protection: ProtectionPolicy {
                take_profit_multiplier: dec!(2),
                stop_loss_multiplier: dec!(3),
            },
            sizing: PositionSizerConfig {
                policy: SizingPolicy::EquityFraction {
                    trade_fraction: dec!(0.01),
                },
                max_fraction: dec!(0.05),
            },
        }
    }
}
