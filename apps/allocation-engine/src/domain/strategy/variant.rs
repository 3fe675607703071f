//! Strategy variants and the direction-flip rule.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::{Direction, Instrument, VariantId};

/// Directional bias applied by a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasRule {
    /// Keep the side while it wins, flip after a loss.
    TrendFollow,
    /// Fade the level: flip after a win, keep the side after a loss.
    RangeFade,
    /// Always long.
    FixedBuy,
    /// Always short.
    FixedSell,
}

impl BiasRule {
    /// All rules, in enumeration order.
    pub const ALL: [Self; 4] = [
        Self::TrendFollow,
        Self::RangeFade,
        Self::FixedBuy,
        Self::FixedSell,
    ];

    /// Direction of the first virtual position.
    #[must_use]
    pub const fn initial_direction(self) -> Direction {
        match self {
            Self::FixedSell => Direction::Short,
            Self::TrendFollow | Self::RangeFade | Self::FixedBuy => Direction::Long,
        }
    }

    /// Short code used in order labels.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::TrendFollow => "TF",
            Self::RangeFade => "RF",
            Self::FixedBuy => "BUY",
            Self::FixedSell => "SELL",
        }
    }
}

impl fmt::Display for BiasRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TrendFollow => write!(f, "trend_follow"),
            Self::RangeFade => write!(f, "range_fade"),
            Self::FixedBuy => write!(f, "fixed_buy"),
            Self::FixedSell => write!(f, "fixed_sell"),
        }
    }
}

/// Result of a closed trade, real or simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeOutcome {
    /// The move favoured the held side.
    Win,
    /// Anything else.
    Loss,
}

impl TradeOutcome {
    /// `Win` when `won` is true.
    #[must_use]
    pub const fn from_win(won: bool) -> Self {
        if won { Self::Win } else { Self::Loss }
    }

    /// Whether this outcome is a win.
    #[must_use]
    pub const fn is_win(self) -> bool {
        matches!(self, Self::Win)
    }
}

/// Direction to hold after a virtual trade closes with `outcome`.
#[must_use]
pub const fn next_direction(outcome: TradeOutcome, rule: BiasRule, held: Direction) -> Direction {
    match (rule, outcome) {
        (BiasRule::TrendFollow, TradeOutcome::Loss) | (BiasRule::RangeFade, TradeOutcome::Win) => {
            held.flipped()
        }
        (BiasRule::FixedBuy, _) => Direction::Long,
        (BiasRule::FixedSell, _) => Direction::Short,
        _ => held,
    }
}

/// One configured (instrument, bias rule, target distance) combination.
///
/// Created once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyVariant {
    /// Creation-order index.
    pub id: VariantId,
    /// Instrument traded by the variant.
    pub instrument: Instrument,
    /// Directional bias.
    pub rule: BiasRule,
    /// Price distance at which a virtual trade is closed.
    pub target_distance: Decimal,
}

impl StrategyVariant {
    /// Create a variant.
    #[must_use]
    pub const fn new(
        id: VariantId,
        instrument: Instrument,
        rule: BiasRule,
        target_distance: Decimal,
    ) -> Self {
        Self {
            id,
            instrument,
            rule,
            target_distance,
        }
    }

    /// Human-readable name, e.g. `EURUSD_TF_0.00100`.
    #[must_use]
    pub fn name(&self) -> String {
        format!(
            "{}_{}_{}",
            self.instrument.symbol,
            self.rule.code(),
            self.target_distance
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(BiasRule::TrendFollow, TradeOutcome::Win, Direction::Long, Direction::Long ; "trend keeps winner")]
    #[test_case(BiasRule::TrendFollow, TradeOutcome::Loss, Direction::Long, Direction::Short ; "trend flips after loss")]
    #[test_case(BiasRule::RangeFade, TradeOutcome::Win, Direction::Short, Direction::Long ; "fade flips after win")]
    #[test_case(BiasRule::RangeFade, TradeOutcome::Loss, Direction::Short, Direction::Short ; "fade keeps loser")]
    #[test_case(BiasRule::FixedBuy, TradeOutcome::Loss, Direction::Long, Direction::Long ; "fixed buy never flips")]
    #[test_case(BiasRule::FixedSell, TradeOutcome::Win, Direction::Short, Direction::Short ; "fixed sell never flips")]
    fn flip_rule(rule: BiasRule, outcome: TradeOutcome, held: Direction, expected: Direction) {
        assert_eq!(next_direction(outcome, rule, held), expected);
    }

    #[test]
    fn initial_directions() {
        assert_eq!(BiasRule::FixedSell.initial_direction(), Direction::Short);
        assert_eq!(BiasRule::RangeFade.initial_direction(), Direction::Long);
    }

    #[test]
    fn variant_name_includes_rule_code() {
        let variant = StrategyVariant::new(
            VariantId::new(0),
            Instrument::new("EURUSD", 5, Decimal::ONE),
            BiasRule::RangeFade,
            Decimal::new(100, 5),
        );
        assert_eq!(variant.name(), "EURUSD_RF_0.00100");
    }
}
