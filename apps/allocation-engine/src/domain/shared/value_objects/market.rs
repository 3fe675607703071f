//! Market data inputs: ticks and bars.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Direction, Symbol};

/// Top-of-book quote update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    /// Instrument symbol.
    pub symbol: Symbol,
    /// Best bid price.
    pub bid: Decimal,
    /// Best ask price.
    pub ask: Decimal,
    /// Quote timestamp.
    pub time: DateTime<Utc>,
}

impl Tick {
    /// Create a new tick.
    #[must_use]
    pub fn new(symbol: impl Into<Symbol>, bid: Decimal, ask: Decimal, time: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            bid,
            ask,
            time,
        }
    }

    /// Get the mid price.
    #[must_use]
    pub fn mid(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::TWO
    }

    /// Get the spread.
    #[must_use]
    pub fn spread(&self) -> Decimal {
        self.ask - self.bid
    }

    /// Price a market order on `direction` would execute at.
    #[must_use]
    pub const fn entry_price(&self, direction: Direction) -> Decimal {
        match direction {
            Direction::Long => self.ask,
            Direction::Short => self.bid,
        }
    }

    /// Price a position on `direction` would be closed at.
    #[must_use]
    pub const fn exit_price(&self, direction: Direction) -> Decimal {
        match direction {
            Direction::Long => self.bid,
            Direction::Short => self.ask,
        }
    }
}

/// Completed bar of a given period (e.g. `M15`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    /// Instrument symbol.
    pub symbol: Symbol,
    /// Bar period label.
    pub period: String,
    /// Opening price.
    pub open: Decimal,
    /// Closing price.
    pub close: Decimal,
    /// Bar close time.
    pub time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn tick_prices() {
        let tick = Tick::new("EURUSD", dec!(1.10000), dec!(1.10020), Utc::now());
        assert_eq!(tick.mid(), dec!(1.10010));
        assert_eq!(tick.spread(), dec!(0.00020));
        assert_eq!(tick.entry_price(Direction::Long), dec!(1.10020));
        assert_eq!(tick.exit_price(Direction::Long), dec!(1.10000));
        assert_eq!(tick.entry_price(Direction::Short), dec!(1.10000));
    }
}
