//! Rounding rules for amounts, sizes and prices.
//!
//! Every rule rounds half-up (midpoint away from zero).

use rust_decimal::{Decimal, RoundingStrategy};

const CURRENCY_DP: u32 = 2;
const SIZE_DP: u32 = 3;

/// Round a currency amount to cents.
#[must_use]
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a position size to three decimals.
#[must_use]
pub fn round_size(size: Decimal) -> Decimal {
    size.round_dp_with_strategy(SIZE_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a price to the instrument's quoted decimals.
#[must_use]
pub fn round_price(price: Decimal, pip_scale: u32) -> Decimal {
    price.round_dp_with_strategy(pip_scale, RoundingStrategy::MidpointAwayFromZero)
}
