//! Instrument reference data.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Symbol;

/// Immutable reference data for a tradable instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// Ticker.
    pub symbol: Symbol,
    /// Number of decimals prices are quoted with (5 for `EURUSD`, 3 for `USDJPY`).
    pub pip_scale: u32,
    /// Account-currency value of one price point per lot.
    pub pip_value: Decimal,
    /// Units per lot, used to turn a currency allocation into a lot size.
    pub contract_size: Decimal,
}

impl Instrument {
    /// Create an instrument with a contract size of one.
    #[must_use]
    pub fn new(symbol: impl Into<Symbol>, pip_scale: u32, pip_value: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            pip_scale,
            pip_value,
            contract_size: Decimal::ONE,
        }
    }

    /// Override the contract size.
    #[must_use]
    pub const fn with_contract_size(mut self, contract_size: Decimal) -> Self {
        self.contract_size = contract_size;
        self
    }

    /// Smallest quoted price increment, `10^-pip_scale`.
    #[must_use]
    pub fn point(&self) -> Decimal {
        Decimal::new(1, self.pip_scale)
    }

    /// Convert a distance in points into a price distance.
    #[must_use]
    pub fn points_to_price(&self, points: Decimal) -> Decimal {
        points * self.point()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn point_follows_pip_scale() {
        let eurusd = Instrument::new("EURUSD", 5, dec!(1));
        assert_eq!(eurusd.point(), dec!(0.00001));

        let usdjpy = Instrument::new("USDJPY", 3, dec!(1));
        assert_eq!(usdjpy.points_to_price(dec!(150)), dec!(0.150));
    }

    #[test]
    fn contract_size_defaults_to_one() {
        let instrument = Instrument::new("EURUSD", 5, dec!(1));
        assert_eq!(instrument.contract_size, Decimal::ONE);
        let lots = instrument.with_contract_size(dec!(100000));
        assert_eq!(lots.contract_size, dec!(100000));
    }
}
