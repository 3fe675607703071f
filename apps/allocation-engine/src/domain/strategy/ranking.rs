//! Win-rate signal and candidate ranking.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::rolling_window::RollingWindow;
use crate::domain::shared::VariantId;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Percentage of wins over a full outcome window.
///
/// Zero until the window holds `capacity` samples.
#[must_use]
pub fn win_rate(outcomes: &RollingWindow<bool>) -> Decimal {
    if !outcomes.is_full() {
        return Decimal::ZERO;
    }
    let wins = outcomes.iter().filter(|won| **won).count();
    Decimal::from(wins) * HUNDRED / Decimal::from(outcomes.capacity())
}

/// A variant that passed the win-rate threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// Variant index.
    pub variant: VariantId,
    /// Win rate in percent.
    pub win_rate: Decimal,
}

/// Filters and orders variants by win rate.
///
/// Equal win rates keep ascending variant creation order.
#[derive(Debug, Clone, Copy)]
pub struct StrategyRanker {
    threshold: Decimal,
}

impl StrategyRanker {
    /// Ranker admitting variants with a win rate of at least `threshold` percent.
    #[must_use]
    pub const fn new(threshold: Decimal) -> Self {
        Self { threshold }
    }

    /// Minimum win rate for eligibility.
    #[must_use]
    pub const fn threshold(&self) -> Decimal {
        self.threshold
    }

    /// Eligible candidates, best first.
    #[must_use]
    pub fn rank<I>(&self, win_rates: I) -> Vec<RankedCandidate>
    where
        I: IntoIterator<Item = (VariantId, Decimal)>,
    {
        let mut eligible: Vec<RankedCandidate> = win_rates
            .into_iter()
            .filter(|(_, rate)| *rate >= self.threshold)
            .map(|(variant, win_rate)| RankedCandidate { variant, win_rate })
            .collect();
        eligible.sort_by(|a, b| {
            b.win_rate
                .cmp(&a.win_rate)
                .then_with(|| a.variant.cmp(&b.variant))
        });
        eligible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn window_of(outcomes: &[bool], capacity: usize) -> RollingWindow<bool> {
        let mut window = RollingWindow::new(capacity);
        for outcome in outcomes {
            window.push(*outcome);
        }
        window
    }

    #[test]
    fn zero_until_window_full() {
        let window = window_of(&[true; 19], 20);
        assert_eq!(win_rate(&window), Decimal::ZERO);
    }

    #[test]
    fn eviction_moves_win_rate() {
        // 18 wins then 2 losses: the oldest sample is a win.
        let mut outcomes = vec![true; 18];
        outcomes.extend([false, false]);
        let mut window = window_of(&outcomes, 20);
        assert_eq!(win_rate(&window), dec!(90));

        let ranker = StrategyRanker::new(dec!(80));
        assert_eq!(ranker.rank([(VariantId::new(0), win_rate(&window))]).len(), 1);

        window.push(false);
        assert_eq!(win_rate(&window), dec!(85));
        assert_eq!(ranker.rank([(VariantId::new(0), win_rate(&window))]).len(), 1);
    }

    #[test]
    fn ranks_descending_and_breaks_ties_by_creation_order() {
        let ranker = StrategyRanker::new(dec!(80));
        let ranked = ranker.rank([
            (VariantId::new(0), dec!(85)),
            (VariantId::new(1), dec!(95)),
            (VariantId::new(2), dec!(70)),
            (VariantId::new(3), dec!(85)),
            (VariantId::new(4), dec!(80)),
        ]);
        let order: Vec<usize> = ranked.iter().map(|c| c.variant.index()).collect();
        assert_eq!(order, vec![1, 0, 3, 4]);
    }

    proptest! {
        #[test]
        fn win_rate_is_a_percentage(capacity in 1usize..50, outcomes in proptest::collection::vec(any::<bool>(), 0..120)) {
            let window = window_of(&outcomes, capacity);
            let rate = win_rate(&window);
            prop_assert!(rate >= Decimal::ZERO && rate <= dec!(100));
            if outcomes.len() < capacity {
                prop_assert_eq!(rate, Decimal::ZERO);
            }
        }
    }
}
