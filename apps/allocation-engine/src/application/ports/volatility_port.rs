//! Volatility Port (Driven Port)
//!
//! Average-true-range style indicator used to place protective levels.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::shared::Symbol;

/// Volatility port error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VolatilityError {
    /// The indicator source could not be queried.
    #[error("Volatility source unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },
}

/// Port for volatility readings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VolatilityPort: Send + Sync {
    /// Latest reading for `symbol` on bars of `period` over `lookback` bars.
    ///
    /// `Ok(None)` means the indicator has not accumulated enough history.
    async fn volatility(
        &self,
        symbol: &Symbol,
        period: &str,
        lookback: u32,
    ) -> Result<Option<Decimal>, VolatilityError>;
}
