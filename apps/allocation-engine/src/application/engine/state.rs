//! Engine state.
//!
//! Everything the engine mutates lives in [`EngineState`], which the
//! [`AllocationEngine`](super::AllocationEngine) keeps behind one mutex.
//! Methods here are synchronous so that no lock is ever held across an
//! `.await`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::error::EngineError;
use crate::domain::order_lifecycle::{
    OrderEvent, OrderEventKind, OrderLifecycleError, OrderStateMachine, OrderStatus,
    SafetyNetScope,
};
use crate::domain::portfolio::{
    AggregatePortfolioStats, EngineSnapshot, LiveOrderRef, LiveTradeStats, VariantSnapshot,
};
use crate::domain::risk::{
    ProfitLockState, ProtectiveOffsets, ProtectivePrices, SafetyNetReset, SizingInput,
};
use crate::domain::shared::{
    Direction, Instrument, OrderId, Symbol, Tick, VariantId, round_currency,
};
use crate::domain::strategy::{
    RankedCandidate, StrategyVariant, TradeOutcome, VirtualClose, VirtualTradeState, win_rate,
};

/// Per-variant record: immutable definition plus its mutable state.
#[derive(Debug, Clone)]
pub struct VariantRecord {
    /// Variant definition.
    pub variant: StrategyVariant,
    /// Shadow simulation.
    pub shadow: VirtualTradeState,
    /// Realized statistics and the live-order slot.
    pub stats: LiveTradeStats,
}

/// An order the engine placed and still tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedOrder {
    /// Owning variant.
    pub variant: VariantId,
    /// Instrument.
    pub symbol: Symbol,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Side.
    pub direction: Direction,
    /// Protective offsets computed at admission.
    pub offsets: ProtectiveOffsets,
    /// When the placement was acknowledged.
    pub submitted_at: DateTime<Utc>,
    /// When the order was filled.
    pub filled_at: Option<DateTime<Utc>>,
    /// The venue reported the order closed before its close notification
    /// arrived.
    pub close_reported: bool,
}

/// A slot taken for an in-flight placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    /// Variant to place for.
    pub variant: VariantId,
    /// Instrument.
    pub instrument: Instrument,
    /// Side, taken from the shadow simulation.
    pub direction: Direction,
    /// Expected entry price from the latest quote.
    pub entry_price: Decimal,
    /// Win rate the variant was admitted with.
    pub win_rate: Decimal,
    /// Order label.
    pub label: String,
}

/// Effect of an order event on the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// The order filled; protective prices are anchored on the fill.
    Filled {
        /// Variant.
        variant: VariantId,
        /// Protective prices to attach.
        prices: ProtectivePrices,
    },
    /// The trade closed and was recorded.
    Closed {
        /// Variant.
        variant: VariantId,
        /// Net result.
        net_profit: Decimal,
        /// Win or loss.
        outcome: TradeOutcome,
        /// Safety-net resets applied after the close.
        resets: Vec<(SafetyNetScope, SafetyNetReset)>,
    },
    /// The order was cancelled and its slot freed.
    Cancelled {
        /// Variant.
        variant: VariantId,
    },
    /// The event arrived while a placement was in flight and is held until
    /// the venue acknowledges that placement.
    Buffered,
    /// The event referred to an order the engine does not track.
    Untracked,
}

/// All mutable engine state.
#[derive(Debug)]
pub struct EngineState {
    records: Vec<VariantRecord>,
    by_symbol: HashMap<Symbol, Vec<VariantId>>,
    orders: HashMap<OrderId, TrackedOrder>,
    early_events: HashMap<OrderId, Vec<OrderEvent>>,
    last_ticks: HashMap<Symbol, Tick>,
    aggregate: AggregatePortfolioStats,
    portfolio_lock: ProfitLockState,
    label_sequence: u64,
}

impl EngineState {
    /// Build the state for `variants`, each with a window of `window_size`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSetup`] if a variant's id does not match
    /// its position.
    pub fn new(variants: Vec<StrategyVariant>, window_size: usize) -> Result<Self, EngineError> {
        let mut by_symbol: HashMap<Symbol, Vec<VariantId>> = HashMap::new();
        let mut records = Vec::with_capacity(variants.len());

        for (index, variant) in variants.into_iter().enumerate() {
            if variant.id.index() != index {
                return Err(EngineError::InvalidSetup(format!(
                    "variant {} registered at position {index}",
                    variant.id
                )));
            }
            by_symbol
                .entry(variant.instrument.symbol.clone())
                .or_default()
                .push(variant.id);
            records.push(VariantRecord {
                shadow: VirtualTradeState::new(variant.rule.initial_direction(), window_size),
                stats: LiveTradeStats::default(),
                variant,
            });
        }

        Ok(Self {
            records,
            by_symbol,
            orders: HashMap::new(),
            early_events: HashMap::new(),
            last_ticks: HashMap::new(),
            aggregate: AggregatePortfolioStats::default(),
            portfolio_lock: ProfitLockState::default(),
            label_sequence: 0,
        })
    }

    /// Variant record by id.
    #[must_use]
    pub fn record(&self, id: VariantId) -> Option<&VariantRecord> {
        self.records.get(id.index())
    }

    /// All variant records in creation order.
    #[must_use]
    pub fn records(&self) -> &[VariantRecord] {
        &self.records
    }

    /// Tracked order by id.
    #[must_use]
    pub fn order(&self, order_id: &OrderId) -> Option<&TrackedOrder> {
        self.orders.get(order_id)
    }

    /// Slots currently consumed, reserved ones included.
    #[must_use]
    pub fn live_order_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.stats.has_live_order())
            .count()
    }

    /// Placements reserved but not yet acknowledged by the venue.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.stats.live_order, Some(LiveOrderRef::Reserved)))
            .count()
    }

    /// Current win rate of every variant.
    pub fn win_rates(&self) -> impl Iterator<Item = (VariantId, Decimal)> + '_ {
        self.records
            .iter()
            .map(|r| (r.variant.id, win_rate(r.shadow.outcomes())))
    }

    /// Feed a tick to the shadow simulation of every variant on its symbol.
    pub fn apply_tick(&mut self, tick: &Tick) -> Vec<(VariantId, VirtualClose)> {
        self.last_ticks.insert(tick.symbol.clone(), tick.clone());

        let Some(ids) = self.by_symbol.get(&tick.symbol) else {
            return Vec::new();
        };

        let price = tick.mid();
        let mut closes = Vec::new();
        for id in ids {
            let record = &mut self.records[id.index()];
            if let Some(close) = record.shadow.on_price(&record.variant, price, tick.time) {
                closes.push((*id, close));
            }
        }
        closes
    }

    /// Reserve a slot for each ranked candidate while slots remain.
    ///
    /// Candidates that already hold a slot, or whose symbol has not been
    /// quoted yet, are skipped.
    pub fn reserve(
        &mut self,
        ranked: &[RankedCandidate],
        max_concurrent: usize,
    ) -> Vec<Reservation> {
        let mut free_slots = max_concurrent.saturating_sub(self.live_order_count());
        let mut reservations = Vec::new();

        for candidate in ranked {
            if free_slots == 0 {
                break;
            }
            let record = &self.records[candidate.variant.index()];
            if record.stats.has_live_order() {
                continue;
            }
            let Some(tick) = self.last_ticks.get(&record.variant.instrument.symbol) else {
                continue;
            };

            let direction = record.shadow.direction();
            let entry_price = tick.entry_price(direction);
            let instrument = record.variant.instrument.clone();
            let name = record.variant.name();

            if !self.records[candidate.variant.index()].stats.reserve() {
                continue;
            }
            self.label_sequence += 1;
            free_slots -= 1;
            reservations.push(Reservation {
                variant: candidate.variant,
                instrument,
                direction,
                entry_price,
                win_rate: candidate.win_rate,
                label: format!("{name}_{}", self.label_sequence),
            });
        }
        reservations
    }

    /// Free a variant's slot.
    pub fn release(&mut self, variant: VariantId) {
        if let Some(record) = self.records.get_mut(variant.index()) {
            record.stats.release();
        }
        self.drop_stray_events();
    }

    /// Buffered events can only belong to an in-flight placement; once none
    /// is left they belong to no order of ours.
    fn drop_stray_events(&mut self) {
        if self.in_flight_count() == 0 {
            self.early_events.clear();
        }
    }

    /// Sizing inputs for a variant at the given equity.
    #[must_use]
    pub fn sizing_input(&self, variant: VariantId, equity: Decimal) -> Option<SizingInput> {
        let record = self.record(variant)?;
        Some(SizingInput {
            equity,
            contract_size: record.variant.instrument.contract_size,
            realized_profit: record.stats.profit_lock.profit(),
            locked_profit: record.stats.profit_lock.locked_profit(),
            consecutive_losses: record.stats.consecutive_losses,
        })
    }

    /// Restart the martingale streak of a variant.
    pub fn reset_streak(&mut self, variant: VariantId) {
        if let Some(record) = self.records.get_mut(variant.index()) {
            record.stats.consecutive_losses = 0;
        }
    }

    /// Bind a reservation to the order the venue acknowledged.
    ///
    /// Returns the events for that order that arrived before the
    /// acknowledgement, in arrival order. The caller must apply them.
    pub fn confirm(
        &mut self,
        reservation: &Reservation,
        order_id: OrderId,
        offsets: ProtectiveOffsets,
        at: DateTime<Utc>,
    ) -> Vec<OrderEvent> {
        self.records[reservation.variant.index()]
            .stats
            .attach(order_id.clone());
        let early = self.early_events.remove(&order_id).unwrap_or_default();
        self.orders.insert(
            order_id,
            TrackedOrder {
                variant: reservation.variant,
                symbol: reservation.instrument.symbol.clone(),
                status: OrderStatus::Pending,
                direction: reservation.direction,
                offsets,
                submitted_at: at,
                filled_at: None,
                close_reported: false,
            },
        );
        self.drop_stray_events();
        early
    }

    /// Apply an order notification.
    ///
    /// `drawdown_limit` is the safety-net threshold for a close; `None` skips
    /// the safety net. Events for unknown orders are buffered while a
    /// placement is in flight, since the venue may report on an order before
    /// acknowledging it. A close of a pending order implies its fill.
    ///
    /// # Errors
    ///
    /// Returns [`OrderLifecycleError::InvalidStateTransition`] when the event
    /// does not follow the lifecycle. The state is left untouched.
    pub fn apply_order_event(
        &mut self,
        event: &OrderEvent,
        drawdown_limit: Option<Decimal>,
    ) -> Result<LifecycleOutcome, OrderLifecycleError> {
        let in_flight = self.in_flight_count() > 0;
        let Some(tracked) = self.orders.get_mut(&event.order_id) else {
            if in_flight {
                self.early_events
                    .entry(event.order_id.clone())
                    .or_default()
                    .push(event.clone());
                return Ok(LifecycleOutcome::Buffered);
            }
            return Ok(LifecycleOutcome::Untracked);
        };
        let target = event.kind.target_status();
        let implied_fill = tracked.status == OrderStatus::Pending && target == OrderStatus::Closed;
        if !implied_fill {
            OrderStateMachine::validate_transition(tracked.status, target)?;
        }
        let variant = tracked.variant;

        match &event.kind {
            OrderEventKind::Filled { fill_price } => {
                tracked.status = OrderStatus::Filled;
                tracked.filled_at = Some(event.occurred_at);
                Ok(LifecycleOutcome::Filled {
                    variant,
                    prices: tracked.offsets.prices(*fill_price, tracked.direction),
                })
            }
            OrderEventKind::Closed {
                gross_profit,
                commission,
                ..
            } => {
                let opened_at = tracked.filled_at.unwrap_or(tracked.submitted_at);
                self.orders.remove(&event.order_id);

                let net_profit = round_currency(gross_profit - commission);
                let record = &mut self.records[variant.index()];
                let outcome = record
                    .stats
                    .record_close(net_profit, event.occurred_at - opened_at);
                record.stats.release();
                self.aggregate.record_close(net_profit);
                self.portfolio_lock.record(net_profit);

                let mut resets = Vec::new();
                if let Some(limit) = drawdown_limit {
                    if let Some(reset) = record.stats.profit_lock.apply_safety_net(limit) {
                        resets.push((SafetyNetScope::Variant(variant), reset));
                    }
                    if let Some(reset) = self.portfolio_lock.apply_safety_net(limit) {
                        resets.push((SafetyNetScope::Portfolio, reset));
                    }
                }

                Ok(LifecycleOutcome::Closed {
                    variant,
                    net_profit,
                    outcome,
                    resets,
                })
            }
            OrderEventKind::Cancelled { .. } => {
                self.orders.remove(&event.order_id);
                self.release(variant);
                Ok(LifecycleOutcome::Cancelled { variant })
            }
        }
    }

    /// Acknowledged order of a variant.
    ///
    /// # Errors
    ///
    /// Returns an error if the variant is unknown or holds no open order.
    pub fn open_order(&self, variant: VariantId) -> Result<OrderId, EngineError> {
        let record = self
            .record(variant)
            .ok_or(EngineError::UnknownVariant(variant))?;
        record
            .stats
            .open_order()
            .cloned()
            .ok_or(EngineError::NoOpenOrder(variant))
    }

    /// Tracked orders on `symbol` that are absent from `live`.
    ///
    /// Orders acknowledged at or after `since` are left out, since the venue
    /// may not list them yet.
    #[must_use]
    pub fn missing_orders(
        &self,
        symbol: &Symbol,
        live: &[OrderId],
        since: DateTime<Utc>,
    ) -> Vec<(VariantId, OrderId)> {
        let mut missing: Vec<(VariantId, OrderId)> = self
            .orders
            .iter()
            .filter(|(id, order)| {
                &order.symbol == symbol && order.submitted_at < since && !live.contains(*id)
            })
            .map(|(id, order)| (order.variant, id.clone()))
            .collect();
        missing.sort();
        missing
    }

    /// Note that the venue reports an order closed.
    ///
    /// Returns whether this had already been noted, or `None` if the order
    /// is not tracked.
    pub fn mark_close_reported(&mut self, order_id: &OrderId) -> Option<bool> {
        let order = self.orders.get_mut(order_id)?;
        Some(std::mem::replace(&mut order.close_reported, true))
    }

    /// Stop tracking an order and free its variant's slot.
    ///
    /// Returns the owning variant, or `None` if the order is not tracked.
    pub fn release_order(&mut self, order_id: &OrderId) -> Option<VariantId> {
        let order = self.orders.remove(order_id)?;
        self.release(order.variant);
        Some(order.variant)
    }

    /// Point-in-time copy for reporting.
    #[must_use]
    pub fn snapshot(&self, max_concurrent: usize) -> EngineSnapshot {
        EngineSnapshot {
            taken_at: Utc::now(),
            aggregate: self.aggregate.clone(),
            portfolio_lock: self.portfolio_lock,
            live_orders: self.live_order_count(),
            max_concurrent,
            variants: self
                .records
                .iter()
                .map(|r| VariantSnapshot {
                    id: r.variant.id,
                    name: r.variant.name(),
                    symbol: r.variant.instrument.symbol.clone(),
                    rule: r.variant.rule,
                    target_distance: r.variant.target_distance,
                    direction: r.shadow.direction(),
                    win_rate: win_rate(r.shadow.outcomes()),
                    samples: r.shadow.outcomes().len(),
                    shadow_average_days_open: r.shadow.average_days_open(),
                    live_average_days_open: r.stats.average_days_open(),
                    stats: r.stats.clone(),
                })
                .collect(),
        }
    }
}
