//! Profit lock and drawdown safety net.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::round_currency;

/// Realized profit together with its high-water mark.
///
/// `locked_profit` only moves up, except when the safety net resets it to
/// the current profit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitLockState {
    profit: Decimal,
    locked_profit: Decimal,
}

/// A safety-net reset that just happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyNetReset {
    /// High-water mark before the reset.
    pub previous_locked: Decimal,
    /// Profit the lock was reset to.
    pub profit: Decimal,
    /// Drawdown that triggered the reset.
    pub drawdown: Decimal,
    /// Tolerated drawdown.
    pub limit: Decimal,
}

impl ProfitLockState {
    /// Lock seeded with explicit values.
    #[must_use]
    pub fn with_values(profit: Decimal, locked_profit: Decimal) -> Self {
        Self {
            profit,
            locked_profit: locked_profit.max(profit),
        }
    }

    /// Realized profit.
    #[must_use]
    pub const fn profit(&self) -> Decimal {
        self.profit
    }

    /// High-water mark of realized profit.
    #[must_use]
    pub const fn locked_profit(&self) -> Decimal {
        self.locked_profit
    }

    /// Distance from the high-water mark.
    #[must_use]
    pub fn drawdown(&self) -> Decimal {
        self.locked_profit - self.profit
    }

    /// Add a realized net result and raise the high-water mark if needed.
    pub fn record(&mut self, net_profit: Decimal) {
        self.profit = round_currency(self.profit + net_profit);
        if self.profit > self.locked_profit {
            self.locked_profit = self.profit;
        }
    }

    /// Accept the drawdown when it exceeds `limit`.
    ///
    /// After a reset `locked_profit == profit`.
    pub fn apply_safety_net(&mut self, limit: Decimal) -> Option<SafetyNetReset> {
        let drawdown = self.drawdown();
        if drawdown <= limit {
            return None;
        }
        let previous_locked = self.locked_profit;
        self.locked_profit = self.profit;
        Some(SafetyNetReset {
            previous_locked,
            profit: self.profit,
            drawdown,
            limit,
        })
    }
}
