//! Protective take-profit and stop-loss distances.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::SizingError;
use crate::domain::shared::{Direction, Instrument, round_price};

/// Multipliers applied to the externally supplied volatility measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionPolicy {
    /// Take-profit distance in volatility units.
    pub take_profit_multiplier: Decimal,
    /// Stop-loss distance in volatility units.
    pub stop_loss_multiplier: Decimal,
}

impl ProtectionPolicy {
    /// Derive price offsets from a volatility reading.
    ///
    /// `None` or a non-positive reading means the indicator has not warmed up.
    ///
    /// # Errors
    ///
    /// Returns [`SizingError::InsufficientData`] when no usable volatility exists.
    pub fn offsets(
        &self,
        instrument: &Instrument,
        volatility: Option<Decimal>,
    ) -> Result<ProtectiveOffsets, SizingError> {
        let volatility = volatility
            .filter(|v| *v > Decimal::ZERO)
            .ok_or_else(|| SizingError::InsufficientData {
                symbol: instrument.symbol.to_string(),
            })?;

        Ok(ProtectiveOffsets {
            take_profit: round_price(volatility * self.take_profit_multiplier, instrument.pip_scale),
            stop_loss: round_price(volatility * self.stop_loss_multiplier, instrument.pip_scale),
            pip_scale: instrument.pip_scale,
        })
    }
}

/// Price distances from entry, already rounded to the instrument's decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectiveOffsets {
    /// Distance to the take-profit level.
    pub take_profit: Decimal,
    /// Distance to the stop-loss level.
    pub stop_loss: Decimal,
    /// Decimals of the instrument the offsets were computed for.
    pub pip_scale: u32,
}

impl ProtectiveOffsets {
    /// Anchor the offsets on an entry price.
    #[must_use]
    pub fn prices(&self, entry: Decimal, direction: Direction) -> ProtectivePrices {
        let sign = direction.sign();
        ProtectivePrices {
            take_profit: round_price(entry + sign * self.take_profit, self.pip_scale),
            stop_loss: round_price(entry - sign * self.stop_loss, self.pip_scale),
        }
    }
}

/// Absolute protective price levels attached to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectivePrices {
    /// Take-profit level.
    pub take_profit: Decimal,
    /// Stop-loss level.
    pub stop_loss: Decimal,
}
