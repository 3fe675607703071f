//! Engine errors.

use crate::application::ports::{AccountError, ExecutionError};
use crate::domain::shared::{OrderId, VariantId};

/// Errors surfaced by the allocation engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Equity could not be read; the admission pass was abandoned.
    #[error("Equity unavailable: {0}")]
    Equity(#[from] AccountError),

    /// The execution venue failed a request.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// Closing an order did not complete in time.
    #[error("Close of order {order_id} timed out after {timeout_ms}ms")]
    CloseTimeout {
        /// Order being closed.
        order_id: OrderId,
        /// Configured timeout.
        timeout_ms: u64,
    },

    /// The variant has no acknowledged order to act on.
    #[error("Variant {0} has no open order")]
    NoOpenOrder(VariantId),

    /// The variant index is out of range.
    #[error("Unknown variant {0}")]
    UnknownVariant(VariantId),

    /// The engine was constructed with inconsistent inputs.
    #[error("Invalid engine setup: {0}")]
    InvalidSetup(String),
}
