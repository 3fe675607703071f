//! Order notifications and engine events.
//!
//! [`OrderEvent`]s flow in from the execution collaborator; [`EngineEvent`]s
//! flow out to whoever subscribes through the event publisher port.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::status::OrderStatus;
use crate::domain::risk::SafetyNetReset;
use crate::domain::shared::{Direction, OrderId, Symbol, VariantId};
use crate::domain::strategy::TradeOutcome;

/// Notification about an order, sent by the execution collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Order handle.
    pub order_id: OrderId,
    /// What happened.
    pub kind: OrderEventKind,
    /// When it happened.
    pub occurred_at: DateTime<Utc>,
}

/// Kinds of order notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventKind {
    /// The order was filled.
    Filled {
        /// Execution price.
        fill_price: Decimal,
    },
    /// The position was closed.
    Closed {
        /// Exit price.
        close_price: Decimal,
        /// Profit or loss before commission.
        gross_profit: Decimal,
        /// Commission charged for the round trip.
        commission: Decimal,
    },
    /// The order was cancelled.
    Cancelled {
        /// Collaborator-supplied reason, if any.
        reason: Option<String>,
    },
}

impl OrderEventKind {
    /// Status the order moves to.
    #[must_use]
    pub const fn target_status(&self) -> OrderStatus {
        match self {
            Self::Filled { .. } => OrderStatus::Filled,
            Self::Closed { .. } => OrderStatus::Closed,
            Self::Cancelled { .. } => OrderStatus::Cancelled,
        }
    }
}

impl OrderEvent {
    /// Fill notification.
    #[must_use]
    pub fn filled(order_id: OrderId, fill_price: Decimal, occurred_at: DateTime<Utc>) -> Self {
        Self {
            order_id,
            kind: OrderEventKind::Filled { fill_price },
            occurred_at,
        }
    }

    /// Close notification.
    #[must_use]
    pub fn closed(
        order_id: OrderId,
        close_price: Decimal,
        gross_profit: Decimal,
        commission: Decimal,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id,
            kind: OrderEventKind::Closed {
                close_price,
                gross_profit,
                commission,
            },
            occurred_at,
        }
    }

    /// Cancel notification.
    #[must_use]
    pub fn cancelled(order_id: OrderId, reason: Option<String>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            order_id,
            kind: OrderEventKind::Cancelled { reason },
            occurred_at,
        }
    }
}

/// Where a safety-net reset was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "variant", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyNetScope {
    /// A single variant's profit lock.
    Variant(VariantId),
    /// The portfolio profit lock.
    Portfolio,
}

/// Events emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineEvent {
    /// A placement request was accepted by the execution collaborator.
    OrderPlaced {
        /// Variant the order trades for.
        variant: VariantId,
        /// Handle returned by the collaborator.
        order_id: OrderId,
        /// Order label.
        label: String,
        /// Instrument.
        symbol: Symbol,
        /// Side.
        direction: Direction,
        /// Size.
        size: Decimal,
        /// Take-profit level sent with the order.
        take_profit: Decimal,
        /// Stop-loss level sent with the order.
        stop_loss: Decimal,
    },
    /// The collaborator refused a placement; the slot stays open.
    PlacementRejected {
        /// Variant.
        variant: VariantId,
        /// Order label.
        label: String,
        /// Rejection message.
        reason: String,
    },
    /// A candidate could not be sized and waits for the next pass.
    AdmissionDeferred {
        /// Variant.
        variant: VariantId,
        /// Why sizing failed.
        reason: String,
    },
    /// Protective prices were attached after a fill.
    ProtectionAttached {
        /// Variant.
        variant: VariantId,
        /// Order.
        order_id: OrderId,
        /// Take-profit level.
        take_profit: Decimal,
        /// Stop-loss level.
        stop_loss: Decimal,
    },
    /// A live trade closed and was folded into the statistics.
    TradeClosed {
        /// Variant.
        variant: VariantId,
        /// Order.
        order_id: OrderId,
        /// Net result after commission.
        net_profit: Decimal,
        /// Win or loss.
        outcome: TradeOutcome,
    },
    /// A live order was cancelled or vanished from the collaborator's books.
    OrderReleased {
        /// Variant.
        variant: VariantId,
        /// Order.
        order_id: OrderId,
        /// Why the slot was freed.
        reason: String,
    },
    /// The drawdown exceeded its limit and the profit lock was reset.
    SafetyNetTriggered {
        /// Lock that was reset.
        scope: SafetyNetScope,
        /// Reset details.
        reset: SafetyNetReset,
    },
}

impl EngineEvent {
    /// Get the event type name.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::OrderPlaced { .. } => "ORDER_PLACED",
            Self::PlacementRejected { .. } => "PLACEMENT_REJECTED",
            Self::AdmissionDeferred { .. } => "ADMISSION_DEFERRED",
            Self::ProtectionAttached { .. } => "PROTECTION_ATTACHED",
            Self::TradeClosed { .. } => "TRADE_CLOSED",
            Self::OrderReleased { .. } => "ORDER_RELEASED",
            Self::SafetyNetTriggered { .. } => "SAFETY_NET_TRIGGERED",
        }
    }
}
