//! Shadow simulation of virtual trades.
//!
//! Every variant always holds exactly one virtual position once it has seen a
//! price. The position is closed when the price has travelled further than the
//! variant's target distance and is immediately reopened at the closing price,
//! possibly on the other side. Nothing here talks to the execution port.

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;

use super::rolling_window::RollingWindow;
use super::variant::{StrategyVariant, TradeOutcome, next_direction};
use crate::domain::shared::Direction;

/// An open virtual position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualPosition {
    /// Side held.
    pub direction: Direction,
    /// Price at which the position was opened.
    pub entry_price: Decimal,
    /// Time at which the position was opened.
    pub entry_time: DateTime<Utc>,
}

/// A virtual trade that just closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualClose {
    /// Side that was held.
    pub direction: Direction,
    /// Win or loss.
    pub outcome: TradeOutcome,
    /// Entry price.
    pub entry_price: Decimal,
    /// Exit price (also the entry of the reopened position).
    pub exit_price: Decimal,
    /// Time the position was held.
    pub duration: TimeDelta,
    /// Side of the reopened position.
    pub next_direction: Direction,
}

/// Simulated trading state of one variant.
#[derive(Debug, Clone)]
pub struct VirtualTradeState {
    direction: Direction,
    position: Option<VirtualPosition>,
    outcomes: RollingWindow<bool>,
    durations: RollingWindow<TimeDelta>,
}

impl VirtualTradeState {
    /// Fresh state with no position and empty windows of size `window`.
    #[must_use]
    pub fn new(initial_direction: Direction, window: usize) -> Self {
        Self {
            direction: initial_direction,
            position: None,
            outcomes: RollingWindow::new(window),
            durations: RollingWindow::new(window),
        }
    }

    /// Side the variant currently holds (or will open next).
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Open virtual position, if any.
    #[must_use]
    pub const fn position(&self) -> Option<&VirtualPosition> {
        self.position.as_ref()
    }

    /// Rolling win/loss outcomes, oldest first.
    #[must_use]
    pub const fn outcomes(&self) -> &RollingWindow<bool> {
        &self.outcomes
    }

    /// Rolling holding durations, oldest first.
    #[must_use]
    pub const fn durations(&self) -> &RollingWindow<TimeDelta> {
        &self.durations
    }

    /// Record a closed outcome directly.
    pub fn record(&mut self, outcome: TradeOutcome, duration: TimeDelta) {
        self.outcomes.push(outcome.is_win());
        self.durations.push(duration);
    }

    /// Advance the simulation with a new reference price.
    ///
    /// Returns the closed virtual trade when the target distance was exceeded.
    pub fn on_price(
        &mut self,
        variant: &StrategyVariant,
        price: Decimal,
        time: DateTime<Utc>,
    ) -> Option<VirtualClose> {
        let Some(open) = self.position else {
            self.open(price, time);
            return None;
        };

        if (price - open.entry_price).abs() <= variant.target_distance {
            return None;
        }

        let outcome = TradeOutcome::from_win(open.direction.favours(open.entry_price, price));
        let duration = time - open.entry_time;
        self.record(outcome, duration);
        self.direction = next_direction(outcome, variant.rule, open.direction);
        self.open(price, time);

        Some(VirtualClose {
            direction: open.direction,
            outcome,
            entry_price: open.entry_price,
            exit_price: price,
            duration,
            next_direction: self.direction,
        })
    }

    /// Mean holding time of the windowed virtual trades, in days.
    #[must_use]
    pub fn average_days_open(&self) -> f64 {
        if self.durations.is_empty() {
            return 0.0;
        }
        let total: i64 = self.durations.iter().map(TimeDelta::num_seconds).sum();
        total as f64 / self.durations.len() as f64 / 86_400.0
    }

    fn open(&mut self, price: Decimal, time: DateTime<Utc>) {
        self.position = Some(VirtualPosition {
            direction: self.direction,
            entry_price: price,
            entry_time: time,
        });
    }
}
