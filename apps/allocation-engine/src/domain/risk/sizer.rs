//! Core position sizing logic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::SizingError;
use crate::domain::shared::{round_currency, round_size};

/// How an order size is derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SizingPolicy {
    /// Commit a fixed fraction of equity, topped up by the variant's shortfall
    /// against its locked profit.
    EquityFraction {
        /// Fraction of equity per trade.
        trade_fraction: Decimal,
    },
    /// Scale a base size by `(1 + factor)` per consecutive loss.
    Martingale {
        /// Size after a win (or a streak reset).
        base_size: Decimal,
        /// Growth per consecutive loss.
        factor: Decimal,
        /// Streak length at which sizing restarts from `base_size`.
        max_streak: u32,
    },
}

/// Configuration for position sizing behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSizerConfig {
    /// Sizing policy.
    pub policy: SizingPolicy,
    /// Largest fraction of equity a single allocation (or a drawdown) may reach.
    pub max_fraction: Decimal,
}

/// Per-call inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizingInput {
    /// Current account equity.
    pub equity: Decimal,
    /// Units per lot of the instrument.
    pub contract_size: Decimal,
    /// Realized profit of the variant.
    pub realized_profit: Decimal,
    /// High-water mark of the variant's realized profit.
    pub locked_profit: Decimal,
    /// Consecutive losing live trades of the variant.
    pub consecutive_losses: u32,
}

impl SizingInput {
    /// Inputs for a variant with no history.
    #[must_use]
    pub const fn new(equity: Decimal) -> Self {
        Self {
            equity,
            contract_size: Decimal::ONE,
            realized_profit: Decimal::ZERO,
            locked_profit: Decimal::ZERO,
            consecutive_losses: 0,
        }
    }
}

/// Result of a sizing calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizingResult {
    /// Order size, three decimals.
    pub size: Decimal,
    /// Currency allocation behind the size (equity-fraction only).
    pub allocation: Option<Decimal>,
    /// Whether the `max_fraction` cap reduced the allocation.
    pub was_capped: bool,
    /// Whether the martingale streak hit its cap and must restart at zero.
    pub streak_reset: bool,
}

/// Position sizer implementing the configured policy.
#[derive(Debug, Clone)]
pub struct PositionSizer {
    config: PositionSizerConfig,
}

impl PositionSizer {
    /// Create a sizer.
    #[must_use]
    pub const fn new(config: PositionSizerConfig) -> Self {
        Self { config }
    }

    /// Sizer configuration.
    #[must_use]
    pub const fn config(&self) -> &PositionSizerConfig {
        &self.config
    }

    /// Drawdown tolerated before the safety net resets a profit lock.
    #[must_use]
    pub fn drawdown_limit(&self, equity: Decimal) -> Decimal {
        round_currency(equity * self.config.max_fraction)
    }

    /// Calculate the order size.
    ///
    /// # Errors
    ///
    /// Returns error if equity is not positive, the contract size is not
    /// positive, or the size rounds to zero.
    pub fn calculate(&self, input: &SizingInput) -> Result<SizingResult, SizingError> {
        Self::validate_input(input)?;

        let result = match &self.config.policy {
            SizingPolicy::EquityFraction { trade_fraction } => {
                self.equity_fraction(input, *trade_fraction)
            }
            SizingPolicy::Martingale {
                base_size,
                factor,
                max_streak,
            } => Self::martingale(input, *base_size, *factor, *max_streak),
        };

        if result.size <= Decimal::ZERO {
            return Err(SizingError::BelowMinimum {
                calculated: result.size,
            });
        }
        Ok(result)
    }

    fn equity_fraction(&self, input: &SizingInput, trade_fraction: Decimal) -> SizingResult {
        let mut allocation = input.equity * trade_fraction;
        if input.realized_profit < input.locked_profit {
            allocation += input.locked_profit - input.realized_profit;
        }

        let cap = input.equity * self.config.max_fraction;
        let was_capped = allocation > cap;
        if was_capped {
            allocation = cap;
        }
        let allocation = round_currency(allocation);

        SizingResult {
            size: round_size(allocation / input.contract_size),
            allocation: Some(allocation),
            was_capped,
            streak_reset: false,
        }
    }

    fn martingale(
        input: &SizingInput,
        base_size: Decimal,
        factor: Decimal,
        max_streak: u32,
    ) -> SizingResult {
        let streak_reset = input.consecutive_losses >= max_streak;
        let streak = if streak_reset {
            0
        } else {
            input.consecutive_losses
        };

        let growth = Decimal::ONE + factor;
        let size = (0..streak).fold(base_size, |size, _| size * growth);

        SizingResult {
            size: round_size(size),
            allocation: None,
            was_capped: false,
            streak_reset,
        }
    }

    fn validate_input(input: &SizingInput) -> Result<(), SizingError> {
        if input.equity <= Decimal::ZERO {
            return Err(SizingError::InvalidInput(format!(
                "equity must be positive, got {}",
                input.equity
            )));
        }
        if input.contract_size <= Decimal::ZERO {
            return Err(SizingError::InvalidInput(
                "contract size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn equity_sizer() -> PositionSizer {
        PositionSizer::new(PositionSizerConfig {
            policy: SizingPolicy::EquityFraction {
                trade_fraction: dec!(0.01),
            },
            max_fraction: dec!(0.05),
        })
    }

    fn martingale_sizer() -> PositionSizer {
        PositionSizer::new(PositionSizerConfig {
            policy: SizingPolicy::Martingale {
                base_size: dec!(0.1),
                factor: dec!(1),
                max_streak: 4,
            },
            max_fraction: dec!(0.05),
        })
    }

    #[test]
    fn equity_fraction_plain() {
        let result = equity_sizer()
            .calculate(&SizingInput::new(dec!(10000)))
            .expect("should size");
        assert_eq!(result.allocation, Some(dec!(100)));
        assert_eq!(result.size, dec!(100));
        assert!(!result.was_capped);
    }

    #[test]
    fn equity_fraction_adds_shortfall() {
        let input = SizingInput {
            realized_profit: dec!(120),
            locked_profit: dec!(150),
            ..SizingInput::new(dec!(10000))
        };
        let result = equity_sizer().calculate(&input).expect("should size");
        assert_eq!(result.allocation, Some(dec!(130)));
    }

    #[test]
    fn equity_fraction_caps_at_max_fraction() {
        let input = SizingInput {
            realized_profit: dec!(-1000),
            locked_profit: dec!(0),
            ..SizingInput::new(dec!(10000))
        };
        let result = equity_sizer().calculate(&input).expect("should size");
        assert_eq!(result.allocation, Some(dec!(500)));
        assert!(result.was_capped);
    }

    #[test]
    fn equity_fraction_converts_with_contract_size() {
        let input = SizingInput {
            contract_size: dec!(100000),
            ..SizingInput::new(dec!(12345.67))
        };
        let result = equity_sizer().calculate(&input).expect("should size");
        assert_eq!(result.allocation, Some(dec!(123.46)));
        assert_eq!(result.size, dec!(0.001));
    }

    #[test]
    fn martingale_grows_per_loss() {
        let sizer = martingale_sizer();
        for (losses, expected) in [(0, dec!(0.1)), (1, dec!(0.2)), (2, dec!(0.4)), (3, dec!(0.8))] {
            let input = SizingInput {
                consecutive_losses: losses,
                ..SizingInput::new(dec!(10000))
            };
            let result = sizer.calculate(&input).expect("should size");
            assert_eq!(result.size, expected, "losses = {losses}");
            assert!(!result.streak_reset);
        }
    }

    #[test]
    fn martingale_resets_at_cap() {
        let input = SizingInput {
            consecutive_losses: 4,
            ..SizingInput::new(dec!(10000))
        };
        let result = martingale_sizer().calculate(&input).expect("should size");
        assert_eq!(result.size, dec!(0.1));
        assert!(result.streak_reset);
    }

    #[test]
    fn rejects_non_positive_equity() {
        let result = equity_sizer().calculate(&SizingInput::new(Decimal::ZERO));
        assert!(matches!(result, Err(SizingError::InvalidInput(_))));
    }

    #[test]
    fn rejects_size_rounding_to_zero() {
        let input = SizingInput {
            contract_size: dec!(100000000),
            ..SizingInput::new(dec!(1000))
        };
        let result = equity_sizer().calculate(&input);
        assert!(matches!(result, Err(SizingError::BelowMinimum { .. })));
    }

    #[test]
    fn drawdown_limit_rounds_to_cents() {
        assert_eq!(equity_sizer().drawdown_limit(dec!(400.123)), dec!(20.01));
    }
}
