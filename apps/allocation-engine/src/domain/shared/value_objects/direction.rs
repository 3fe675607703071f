//! Trade direction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of a real or simulated position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Profits when the price rises.
    Long,
    /// Profits when the price falls.
    Short,
}

impl Direction {
    /// The opposite side.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Long => Self::Short,
            Self::Short => Self::Long,
        }
    }

    /// `+1` for long, `-1` for short.
    #[must_use]
    pub const fn sign(self) -> Decimal {
        match self {
            Self::Long => Decimal::ONE,
            Self::Short => Decimal::NEGATIVE_ONE,
        }
    }

    /// Whether a move from `from` to `to` is in this direction's favour.
    #[must_use]
    pub fn favours(self, from: Decimal, to: Decimal) -> bool {
        match self {
            Self::Long => to > from,
            Self::Short => to < from,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "LONG"),
            Self::Short => write!(f, "SHORT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn flipped_is_an_involution() {
        assert_eq!(Direction::Long.flipped(), Direction::Short);
        assert_eq!(Direction::Long.flipped().flipped(), Direction::Long);
    }

    #[test]
    fn favours_matches_sign_of_move() {
        assert!(Direction::Long.favours(dec!(1.1000), dec!(1.1010)));
        assert!(!Direction::Long.favours(dec!(1.1000), dec!(1.0990)));
        assert!(Direction::Short.favours(dec!(1.1000), dec!(1.0990)));
        assert!(!Direction::Short.favours(dec!(1.1000), dec!(1.1000)));
    }
}
