//! Allocation Engine Service
//!
//! Drives the shadow simulation from ticks, ranks variants by their rolling
//! win rate, admits the best of them into the free order slots, sizes and
//! protects the resulting orders, and folds order notifications back into
//! the statistics.
//!
//! All mutable state sits in one [`EngineState`] behind a mutex that is
//! released before every call to a port. Admission reserves slots inside
//! the same critical section that counts them, so concurrent passes and
//! closes can never push the live order count above `max_concurrent`.

mod error;
mod settings;
mod state;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

pub use error::EngineError;
pub use settings::EngineSettings;
pub use state::{EngineState, LifecycleOutcome, Reservation, TrackedOrder, VariantRecord};

use crate::application::ports::{
    AccountPort, EventPublisherPort, ExecutionPort, PlacementRequest, VolatilityPort,
};
use crate::domain::order_lifecycle::{EngineEvent, OrderEvent, OrderEventKind, OrderStatus};
use crate::domain::portfolio::EngineSnapshot;
use crate::domain::risk::{PositionSizer, SizingError};
use crate::domain::shared::{Bar, OrderId, Symbol, Tick, VariantId};
use crate::domain::strategy::{RankedCandidate, StrategyRanker, StrategyVariant, VirtualClose};
use crate::observability;

/// Collaborators the engine talks to.
#[derive(Clone)]
pub struct EnginePorts {
    /// Order placement and management.
    pub execution: Arc<dyn ExecutionPort>,
    /// Account equity.
    pub account: Arc<dyn AccountPort>,
    /// Volatility indicator.
    pub volatility: Arc<dyn VolatilityPort>,
    /// Event subscribers.
    pub publisher: Arc<dyn EventPublisherPort>,
}

/// Result of one admission pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdmissionReport {
    /// Slots free when the pass started.
    pub free_slots: usize,
    /// Variants whose placement was accepted, with the order handle.
    pub placed: Vec<(VariantId, OrderId)>,
    /// Variants whose placement the venue refused.
    pub rejected: Vec<VariantId>,
    /// Variants that could not be sized this pass.
    pub deferred: Vec<VariantId>,
}

enum Placement {
    Placed(OrderId, Vec<OrderEvent>),
    Rejected,
    Deferred,
}

/// The adaptive allocation engine.
pub struct AllocationEngine {
    settings: EngineSettings,
    ranker: StrategyRanker,
    sizer: PositionSizer,
    state: Mutex<EngineState>,
    ports: EnginePorts,
}

impl std::fmt::Debug for AllocationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllocationEngine")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl AllocationEngine {
    /// Create an engine for `variants`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSetup`] if the variant ids are not their
    /// positions in `variants`.
    pub fn new(
        settings: EngineSettings,
        variants: Vec<StrategyVariant>,
        ports: EnginePorts,
    ) -> Result<Self, EngineError> {
        let state = EngineState::new(variants, settings.window_size)?;
        info!(
            variants = state.records().len(),
            max_concurrent = settings.max_concurrent,
            threshold = %settings.win_rate_threshold,
            "Allocation engine created"
        );
        Ok(Self {
            ranker: StrategyRanker::new(settings.win_rate_threshold),
            sizer: PositionSizer::new(settings.sizing.clone()),
            state: Mutex::new(state),
            settings,
            ports,
        })
    }

    /// Engine settings.
    #[must_use]
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Slots currently consumed.
    #[must_use]
    pub fn live_order_count(&self) -> usize {
        self.lock_state().live_order_count()
    }

    /// Eligible variants, best first.
    #[must_use]
    pub fn ranking(&self) -> Vec<RankedCandidate> {
        self.ranker.rank(self.lock_state().win_rates())
    }

    /// Read-only copy of the engine state.
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        self.lock_state().snapshot(self.settings.max_concurrent)
    }

    /// Advance the shadow simulation of every variant on the tick's symbol.
    ///
    /// Returns the virtual trades the tick closed.
    pub fn on_tick(&self, tick: &Tick) -> Vec<(VariantId, VirtualClose)> {
        let closes = self.lock_state().apply_tick(tick);
        for (variant, close) in &closes {
            debug!(
                variant = %variant,
                symbol = %tick.symbol,
                outcome = ?close.outcome,
                entry = %close.entry_price,
                exit = %close.exit_price,
                next = %close.next_direction,
                "Virtual trade closed"
            );
            observability::record_virtual_close(tick.symbol.as_str());
        }
        closes
    }

    /// Handle a completed bar. A bar of the admission period runs a pass.
    ///
    /// # Errors
    ///
    /// Propagates [`AllocationEngine::admission_pass`] errors.
    pub async fn on_bar(&self, bar: &Bar) -> Result<Option<AdmissionReport>, EngineError> {
        if bar.period != self.settings.admission_period {
            return Ok(None);
        }
        debug!(symbol = %bar.symbol, period = %bar.period, "Admission bar");
        self.admission_pass().await.map(Some)
    }

    /// Fill free slots with the best-ranked variants that have no live order.
    ///
    /// Notifications that reached the engine before a placement was
    /// acknowledged are applied once it is, and a slot they free is refilled
    /// within the same pass.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Equity`] if the account cannot be queried; no
    /// slot is reserved in that case.
    pub async fn admission_pass(&self) -> Result<AdmissionReport, EngineError> {
        let mut report = AdmissionReport::default();
        let mut first_round = true;
        loop {
            let (round, closed) = self.admission_round().await?;
            if first_round {
                report.free_slots = round.free_slots;
                first_round = false;
            }
            report.placed.extend(round.placed);
            report.rejected.extend(round.rejected);
            report.deferred.extend(round.deferred);
            // A replayed close freed a slot that this pass must refill.
            if !closed {
                return Ok(report);
            }
        }
    }

    async fn admission_round(&self) -> Result<(AdmissionReport, bool), EngineError> {
        let equity = self
            .ports
            .account
            .current_equity()
            .await
            .inspect_err(|e| error!(error = %e, "Admission pass aborted"))?;

        let (free_slots, reservations) = {
            let mut state = self.lock_state();
            let ranked = self.ranker.rank(state.win_rates());
            let free_slots = self
                .settings
                .max_concurrent
                .saturating_sub(state.live_order_count());
            let reservations = state.reserve(&ranked, self.settings.max_concurrent);
            (free_slots, reservations)
        };

        let mut report = AdmissionReport {
            free_slots,
            ..AdmissionReport::default()
        };
        if reservations.is_empty() {
            debug!(free_slots, %equity, "No admissions this pass");
            return Ok((report, false));
        }

        info!(
            free_slots,
            candidates = reservations.len(),
            %equity,
            "Admission pass"
        );

        let mut events = Vec::new();
        let mut early = Vec::new();
        for reservation in &reservations {
            match self.place(reservation, equity, &mut events).await {
                Placement::Placed(order_id, replay) => {
                    report.placed.push((reservation.variant, order_id));
                    early.extend(replay);
                }
                Placement::Rejected => report.rejected.push(reservation.variant),
                Placement::Deferred => report.deferred.push(reservation.variant),
            }
        }
        self.publish(events).await;

        let mut closed = false;
        for event in early {
            let order_id = event.order_id.clone();
            debug!(order_id = %order_id, "Replaying notification received before acknowledgement");
            match self.settle(event).await {
                Ok(settled) => closed |= settled,
                Err(e) => error!(order_id = %order_id, error = %e, "Replayed notification failed"),
            }
        }

        observability::update_live_orders(self.live_order_count());
        Ok((report, closed))
    }

    async fn place(
        &self,
        reservation: &Reservation,
        equity: Decimal,
        events: &mut Vec<EngineEvent>,
    ) -> Placement {
        let symbol = &reservation.instrument.symbol;

        let reading = match self
            .ports
            .volatility
            .volatility(
                symbol,
                &self.settings.volatility_period,
                self.settings.volatility_lookback,
            )
            .await
        {
            Ok(reading) => reading,
            Err(e) => return self.defer(reservation, "volatility_error", &e.to_string(), events),
        };
        let offsets = match self
            .settings
            .protection
            .offsets(&reservation.instrument, reading)
        {
            Ok(offsets) => offsets,
            Err(e) => return self.defer(reservation, "insufficient_data", &e.to_string(), events),
        };

        let sizing = {
            let state = self.lock_state();
            state
                .sizing_input(reservation.variant, equity)
                .ok_or_else(|| SizingError::InvalidInput(format!("unknown variant {}", reservation.variant)))
                .and_then(|input| self.sizer.calculate(&input))
        };
        let sizing = match sizing {
            Ok(sizing) => sizing,
            Err(e) => return self.defer(reservation, "sizing_error", &e.to_string(), events),
        };

        let prices = offsets.prices(reservation.entry_price, reservation.direction);
        let request = PlacementRequest {
            label: reservation.label.clone(),
            symbol: symbol.clone(),
            direction: reservation.direction,
            size: sizing.size,
            take_profit: prices.take_profit,
            stop_loss: prices.stop_loss,
        };

        let started = Instant::now();
        match self.ports.execution.submit_order(request).await {
            Ok(order_id) => {
                let early = {
                    let mut state = self.lock_state();
                    if sizing.streak_reset {
                        state.reset_streak(reservation.variant);
                    }
                    state.confirm(reservation, order_id.clone(), offsets, Utc::now())
                };
                if sizing.streak_reset {
                    info!(variant = %reservation.variant, "Martingale streak reset");
                }
                info!(
                    variant = %reservation.variant,
                    order_id = %order_id,
                    label = %reservation.label,
                    direction = %reservation.direction,
                    size = %sizing.size,
                    win_rate = %reservation.win_rate,
                    capped = sizing.was_capped,
                    "Order placed"
                );
                observability::record_placement(symbol.as_str(), started.elapsed().as_secs_f64());
                events.push(EngineEvent::OrderPlaced {
                    variant: reservation.variant,
                    order_id: order_id.clone(),
                    label: reservation.label.clone(),
                    symbol: symbol.clone(),
                    direction: reservation.direction,
                    size: sizing.size,
                    take_profit: prices.take_profit,
                    stop_loss: prices.stop_loss,
                });
                Placement::Placed(order_id, early)
            }
            Err(e) => {
                self.lock_state().release(reservation.variant);
                warn!(
                    variant = %reservation.variant,
                    label = %reservation.label,
                    error = %e,
                    "Placement rejected"
                );
                observability::record_placement_rejection(symbol.as_str());
                events.push(EngineEvent::PlacementRejected {
                    variant: reservation.variant,
                    label: reservation.label.clone(),
                    reason: e.to_string(),
                });
                Placement::Rejected
            }
        }
    }

    fn defer(
        &self,
        reservation: &Reservation,
        code: &str,
        reason: &str,
        events: &mut Vec<EngineEvent>,
    ) -> Placement {
        self.lock_state().release(reservation.variant);
        warn!(
            variant = %reservation.variant,
            symbol = %reservation.instrument.symbol,
            reason,
            "Admission deferred"
        );
        observability::record_admission_deferral(reservation.instrument.symbol.as_str(), code);
        events.push(EngineEvent::AdmissionDeferred {
            variant: reservation.variant,
            reason: reason.to_string(),
        });
        Placement::Deferred
    }

    /// Apply an order notification from the execution venue.
    ///
    /// A fill attaches protective prices anchored on the fill price. A close
    /// updates the statistics, runs the safety net and then an admission
    /// pass, whose report is returned. A close that arrives before any fill
    /// counts as filled and closed. Cancellations free the slot. Events that
    /// arrive while a placement awaits its order id are held and replayed once
    /// the venue acknowledges it. Other untracked or invalid events are logged
    /// and ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if attaching protective prices fails, or if the
    /// admission pass after a close fails.
    pub async fn on_order_event(
        &self,
        event: OrderEvent,
    ) -> Result<Option<AdmissionReport>, EngineError> {
        if self.settle(event).await? {
            return self.admission_pass().await.map(Some);
        }
        Ok(None)
    }

    /// Apply one notification. Returns true when it closed a trade.
    async fn settle(&self, event: OrderEvent) -> Result<bool, EngineError> {
        let drawdown_limit = if matches!(event.kind, OrderEventKind::Closed { .. }) {
            match self.ports.account.current_equity().await {
                Ok(equity) => Some(self.sizer.drawdown_limit(equity)),
                Err(e) => {
                    warn!(order_id = %event.order_id, error = %e, "Equity unavailable, safety net skipped");
                    None
                }
            }
        } else {
            None
        };

        let applied = {
            let mut state = self.lock_state();
            let symbol = state.order(&event.order_id).map(|o| o.symbol.clone());
            state
                .apply_order_event(&event, drawdown_limit)
                .map(|outcome| (outcome, symbol))
        };
        let (outcome, symbol) = match applied {
            Ok(applied) => applied,
            Err(e) => {
                warn!(order_id = %event.order_id, error = %e, "Ignoring order event");
                return Ok(false);
            }
        };

        let order_id = event.order_id;
        match outcome {
            LifecycleOutcome::Buffered => {
                debug!(order_id = %order_id, "Holding event until placement is acknowledged");
                Ok(false)
            }
            LifecycleOutcome::Untracked => {
                warn!(order_id = %order_id, "Ignoring event for untracked order");
                Ok(false)
            }
            LifecycleOutcome::Filled { variant, prices } => {
                self.ports
                    .execution
                    .set_protective_prices(&order_id, prices)
                    .await
                    .inspect_err(|e| {
                        error!(order_id = %order_id, error = %e, "Failed to attach protective prices");
                    })?;
                info!(
                    variant = %variant,
                    order_id = %order_id,
                    take_profit = %prices.take_profit,
                    stop_loss = %prices.stop_loss,
                    "Protection attached"
                );
                self.publish(vec![EngineEvent::ProtectionAttached {
                    variant,
                    order_id,
                    take_profit: prices.take_profit,
                    stop_loss: prices.stop_loss,
                }])
                .await;
                Ok(false)
            }
            LifecycleOutcome::Cancelled { variant } => {
                let reason = match &event.kind {
                    OrderEventKind::Cancelled {
                        reason: Some(reason),
                    } => format!("cancelled: {reason}"),
                    _ => "cancelled".to_string(),
                };
                info!(variant = %variant, order_id = %order_id, %reason, "Order released");
                self.publish(vec![EngineEvent::OrderReleased {
                    variant,
                    order_id,
                    reason,
                }])
                .await;
                observability::update_live_orders(self.live_order_count());
                Ok(false)
            }
            LifecycleOutcome::Closed {
                variant,
                net_profit,
                outcome,
                resets,
            } => {
                info!(
                    variant = %variant,
                    order_id = %order_id,
                    net_profit = %net_profit,
                    outcome = ?outcome,
                    "Trade closed"
                );
                if let Some(symbol) = &symbol {
                    observability::record_trade_close(symbol.as_str(), outcome);
                }

                let mut events = vec![EngineEvent::TradeClosed {
                    variant,
                    order_id,
                    net_profit,
                    outcome,
                }];
                for (scope, reset) in resets {
                    warn!(
                        scope = ?scope,
                        previous_locked = %reset.previous_locked,
                        profit = %reset.profit,
                        drawdown = %reset.drawdown,
                        limit = %reset.limit,
                        "Safety net triggered, profit lock reset"
                    );
                    observability::record_safety_net_reset(scope);
                    events.push(EngineEvent::SafetyNetTriggered { scope, reset });
                }
                self.publish(events).await;
                Ok(true)
            }
        }
    }

    /// Ask the venue to close a variant's live order.
    ///
    /// The close itself is reported later through
    /// [`AllocationEngine::on_order_event`].
    ///
    /// # Errors
    ///
    /// Returns an error if the variant holds no acknowledged order, the venue
    /// fails the request, or the request exceeds the close timeout.
    pub async fn close_variant(&self, variant: VariantId) -> Result<(), EngineError> {
        let order_id = self.lock_state().open_order(variant)?;
        let timeout = self.settings.close_timeout;

        match tokio::time::timeout(timeout, self.ports.execution.close(&order_id)).await {
            Ok(Ok(())) => {
                info!(variant = %variant, order_id = %order_id, "Close requested");
                Ok(())
            }
            Ok(Err(e)) => {
                error!(variant = %variant, order_id = %order_id, error = %e, "Close failed");
                Err(e.into())
            }
            Err(_) => {
                error!(variant = %variant, order_id = %order_id, "Close timed out");
                Err(EngineError::CloseTimeout {
                    order_id,
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                })
            }
        }
    }

    /// Release tracked orders on `symbol` that the venue no longer lists.
    ///
    /// Released orders are treated like cancellations: the slot is freed and
    /// no statistic changes. An order the venue reports closed stays tracked
    /// until its close notification arrives, and is released only when a later
    /// pass still finds it missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the venue cannot list its live orders.
    pub async fn reconcile(&self, symbol: &Symbol) -> Result<Vec<(VariantId, OrderId)>, EngineError> {
        let since = Utc::now();
        let live = self.ports.execution.live_orders(symbol).await?;
        let missing = self.lock_state().missing_orders(symbol, &live, since);

        let mut released = Vec::with_capacity(missing.len());
        let mut events = Vec::with_capacity(missing.len());
        for (variant, order_id) in missing {
            let status = match self.ports.execution.order_state(&order_id).await {
                Ok(OrderStatus::Closed) => match self.lock_state().mark_close_reported(&order_id) {
                    None => continue,
                    Some(false) => {
                        info!(
                            variant = %variant,
                            order_id = %order_id,
                            "Order closed at venue, awaiting close notification"
                        );
                        continue;
                    }
                    Some(true) => {
                        warn!(order_id = %order_id, "Close notification never arrived");
                        OrderStatus::Closed.to_string()
                    }
                },
                Ok(status @ (OrderStatus::Pending | OrderStatus::Filled)) => {
                    debug!(order_id = %order_id, venue_status = %status, "Order still open at venue");
                    continue;
                }
                Ok(status) => status.to_string(),
                Err(e) => {
                    debug!(order_id = %order_id, error = %e, "Order state unavailable");
                    "unknown".to_string()
                }
            };
            if self.lock_state().release_order(&order_id).is_none() {
                continue;
            }
            warn!(
                variant = %variant,
                order_id = %order_id,
                venue_status = %status,
                "Order missing from venue, slot released"
            );
            events.push(EngineEvent::OrderReleased {
                variant,
                order_id: order_id.clone(),
                reason: format!("missing from venue (status {status})"),
            });
            released.push((variant, order_id));
        }

        if !events.is_empty() {
            self.publish(events).await;
            observability::update_live_orders(self.live_order_count());
        }
        Ok(released)
    }

    async fn publish(&self, events: Vec<EngineEvent>) {
        if events.is_empty() {
            return;
        }
        if let Err(e) = self.ports.publisher.publish_events(events).await {
            warn!(error = %e, "Failed to publish engine events");
        }
    }
}
