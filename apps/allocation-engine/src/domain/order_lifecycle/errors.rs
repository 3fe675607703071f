//! Order lifecycle errors.

use thiserror::Error;

use super::status::OrderStatus;

/// Errors raised while applying an order notification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderLifecycleError {
    /// The notification does not fit the order's current status.
    #[error("Invalid order transition from {from} to {to}: {reason}")]
    InvalidStateTransition {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
        /// Human-readable reason.
        reason: String,
    },
}
