//! Fixed per-symbol volatility readings.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::application::ports::{VolatilityError, VolatilityPort};
use crate::domain::shared::Symbol;

/// `VolatilityPort` answering with a configured constant per symbol.
///
/// Symbols without a reading report insufficient data.
#[derive(Debug, Clone, Default)]
pub struct StaticVolatility {
    readings: HashMap<Symbol, Decimal>,
}

impl StaticVolatility {
    /// Create from `(symbol, reading)` pairs.
    #[must_use]
    pub fn new<I, S>(readings: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: Into<Symbol>,
    {
        Self {
            readings: readings
                .into_iter()
                .map(|(symbol, reading)| (symbol.into(), reading))
                .collect(),
        }
    }
}

#[async_trait]
impl VolatilityPort for StaticVolatility {
    async fn volatility(
        &self,
        symbol: &Symbol,
        _period: &str,
        _lookback: u32,
    ) -> Result<Option<Decimal>, VolatilityError> {
        Ok(self.readings.get(symbol).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn unknown_symbol_has_no_reading() {
        let source = StaticVolatility::new([("EURUSD", dec!(0.0012))]);

        assert_eq!(
            source.volatility(&Symbol::new("EURUSD"), "H1", 14).await.unwrap(),
            Some(dec!(0.0012))
        );
        assert_eq!(
            source.volatility(&Symbol::new("USDJPY"), "H1", 14).await.unwrap(),
            None
        );
    }
}
