//! Read-only engine snapshot for reporting collaborators.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::stats::{AggregatePortfolioStats, LiveTradeStats};
use crate::domain::risk::ProfitLockState;
use crate::domain::shared::{Direction, Symbol, VariantId};
use crate::domain::strategy::BiasRule;

/// Point-in-time copy of one variant's state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantSnapshot {
    /// Variant index.
    pub id: VariantId,
    /// Display name.
    pub name: String,
    /// Instrument ticker.
    pub symbol: Symbol,
    /// Bias rule.
    pub rule: BiasRule,
    /// Virtual close distance.
    pub target_distance: Decimal,
    /// Side the shadow simulation holds.
    pub direction: Direction,
    /// Shadow win rate in percent.
    pub win_rate: Decimal,
    /// Outcomes currently in the window.
    pub samples: usize,
    /// Mean virtual holding time, in days.
    pub shadow_average_days_open: f64,
    /// Mean live holding time, in days.
    pub live_average_days_open: f64,
    /// Realized statistics.
    pub stats: LiveTradeStats,
}

/// Point-in-time copy of the whole engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSnapshot {
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
    /// Portfolio totals.
    pub aggregate: AggregatePortfolioStats,
    /// Portfolio profit lock.
    pub portfolio_lock: ProfitLockState,
    /// Slots currently consumed.
    pub live_orders: usize,
    /// Slot limit.
    pub max_concurrent: usize,
    /// Per-variant state in creation order.
    pub variants: Vec<VariantSnapshot>,
}

impl EngineSnapshot {
    /// Variants whose shadow win rate is at least `threshold`.
    #[must_use]
    pub fn eligible(&self, threshold: Decimal) -> Vec<&VariantSnapshot> {
        self.variants
            .iter()
            .filter(|v| v.win_rate >= threshold)
            .collect()
    }
}
