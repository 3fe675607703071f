//! Error types for position sizing calculations.

use rust_decimal::Decimal;
use thiserror::Error;

/// Error during position sizing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizingError {
    /// The volatility provider has no usable value yet.
    #[error("Insufficient volatility data for {symbol}")]
    InsufficientData {
        /// Instrument that could not be sized.
        symbol: String,
    },
    /// Invalid input (non-positive equity, negative fraction, ...).
    #[error("Invalid sizing input: {0}")]
    InvalidInput(String),
    /// The computed size rounds to nothing.
    #[error("Calculated size {calculated} is below the minimum tradable size")]
    BelowMinimum {
        /// Size after rounding.
        calculated: Decimal,
    },
}
