//! Realized trade statistics.

use chrono::TimeDelta;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::risk::ProfitLockState;
use crate::domain::shared::{OrderId, round_currency};
use crate::domain::strategy::TradeOutcome;

/// Reference from a variant to its single live order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "order_id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LiveOrderRef {
    /// A placement was decided and is in flight; the slot is consumed.
    Reserved,
    /// The execution collaborator accepted the order.
    Open(OrderId),
}

/// Statistics of the real trades placed for one variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveTradeStats {
    /// Winning closed trades.
    pub wins: u32,
    /// Losing closed trades.
    pub losses: u32,
    /// Sum of net results.
    pub cumulative_profit: Decimal,
    /// Sum of holding times in seconds.
    pub cumulative_duration_secs: i64,
    /// Current run of losing trades (martingale input).
    pub consecutive_losses: u32,
    /// Realized profit and its high-water mark.
    pub profit_lock: ProfitLockState,
    /// The variant's live order, if any.
    pub live_order: Option<LiveOrderRef>,
}

impl LiveTradeStats {
    /// Whether the variant currently holds a slot.
    #[must_use]
    pub const fn has_live_order(&self) -> bool {
        self.live_order.is_some()
    }

    /// Id of the open order, if it has been acknowledged.
    #[must_use]
    pub fn open_order(&self) -> Option<&OrderId> {
        match &self.live_order {
            Some(LiveOrderRef::Open(id)) => Some(id),
            _ => None,
        }
    }

    /// Take the slot for an in-flight placement. Returns false if already taken.
    pub fn reserve(&mut self) -> bool {
        if self.live_order.is_some() {
            return false;
        }
        self.live_order = Some(LiveOrderRef::Reserved);
        true
    }

    /// Bind the reserved slot to the acknowledged order.
    pub fn attach(&mut self, order_id: OrderId) {
        self.live_order = Some(LiveOrderRef::Open(order_id));
    }

    /// Free the slot.
    pub fn release(&mut self) {
        self.live_order = None;
    }

    /// Record a closed trade and return its outcome.
    pub fn record_close(&mut self, net_profit: Decimal, duration: TimeDelta) -> TradeOutcome {
        let outcome = TradeOutcome::from_win(net_profit > Decimal::ZERO);
        match outcome {
            TradeOutcome::Win => {
                self.wins += 1;
                self.consecutive_losses = 0;
            }
            TradeOutcome::Loss => {
                self.losses += 1;
                self.consecutive_losses += 1;
            }
        }
        self.cumulative_profit = round_currency(self.cumulative_profit + net_profit);
        self.cumulative_duration_secs += duration.num_seconds();
        self.profit_lock.record(net_profit);
        outcome
    }

    /// Closed trades.
    #[must_use]
    pub const fn trades(&self) -> u32 {
        self.wins + self.losses
    }

    /// Mean holding time of closed trades, in days.
    #[must_use]
    pub fn average_days_open(&self) -> f64 {
        match self.trades() {
            0 => 0.0,
            n => self.cumulative_duration_secs as f64 / f64::from(n) / 86_400.0,
        }
    }
}

/// Portfolio-wide realized statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatePortfolioStats {
    /// Winning closed trades.
    pub wins: u32,
    /// Losing closed trades.
    pub losses: u32,
    /// Sum of net results.
    pub total_profit: Decimal,
    /// Highest total profit observed.
    pub high_water_mark: Decimal,
    /// Largest distance below the high-water mark observed.
    pub max_drawdown: Decimal,
    /// Current run of losing trades.
    pub consecutive_losses: u32,
    /// Longest run of losing trades.
    pub max_consecutive_losses: u32,
}

impl AggregatePortfolioStats {
    /// Fold a closed trade into the totals.
    pub fn record_close(&mut self, net_profit: Decimal) {
        if net_profit > Decimal::ZERO {
            self.wins += 1;
            self.consecutive_losses = 0;
        } else {
            self.losses += 1;
            self.consecutive_losses += 1;
            self.max_consecutive_losses = self.max_consecutive_losses.max(self.consecutive_losses);
        }

        self.total_profit = round_currency(self.total_profit + net_profit);
        self.high_water_mark = self.high_water_mark.max(self.total_profit);
        self.max_drawdown = self.max_drawdown.max(self.drawdown());
    }

    /// Current distance below the high-water mark.
    #[must_use]
    pub fn drawdown(&self) -> Decimal {
        self.high_water_mark - self.total_profit
    }
}
