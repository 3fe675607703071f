//! Execution Port (Driven Port)
//!
//! Interface to the venue that places, protects and closes real orders.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_lifecycle::OrderStatus;
use crate::domain::risk::ProtectivePrices;
use crate::domain::shared::{Direction, OrderId, Symbol};

/// Request to place a market order with protective levels attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRequest {
    /// Human-readable order label.
    pub label: String,
    /// Symbol to trade.
    pub symbol: Symbol,
    /// Side.
    pub direction: Direction,
    /// Size in lots.
    pub size: Decimal,
    /// Take-profit level.
    pub take_profit: Decimal,
    /// Stop-loss level.
    pub stop_loss: Decimal,
}

/// Execution port error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    /// Connection error.
    #[error("Execution connection error: {message}")]
    ConnectionError {
        /// Error details.
        message: String,
    },

    /// Order rejected by the venue.
    #[error("Order rejected: {reason}")]
    OrderRejected {
        /// Rejection reason.
        reason: String,
    },

    /// Order not found.
    #[error("Order not found: {order_id}")]
    OrderNotFound {
        /// The missing order ID.
        order_id: String,
    },

    /// Unknown error.
    #[error("Execution error: {message}")]
    Unknown {
        /// Error details.
        message: String,
    },
}

/// Port for order execution.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExecutionPort: Send + Sync {
    /// Place an order. Returns the handle that later order events refer to.
    async fn submit_order(&self, request: PlacementRequest) -> Result<OrderId, ExecutionError>;

    /// Handles of the orders the venue still considers live for `symbol`.
    async fn live_orders(&self, symbol: &Symbol) -> Result<Vec<OrderId>, ExecutionError>;

    /// Replace the protective levels of an order.
    async fn set_protective_prices(
        &self,
        order_id: &OrderId,
        prices: ProtectivePrices,
    ) -> Result<(), ExecutionError>;

    /// Close the position behind an order (or cancel it if still pending).
    async fn close(&self, order_id: &OrderId) -> Result<(), ExecutionError>;

    /// Current status of an order.
    async fn order_state(&self, order_id: &OrderId) -> Result<OrderStatus, ExecutionError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn placement_request_serializes_direction() {
        let request = PlacementRequest {
            label: "EURUSD_TF_0.0010_1".to_string(),
            symbol: Symbol::new("EURUSD"),
            direction: Direction::Long,
            size: dec!(0.5),
            take_profit: dec!(1.1050),
            stop_loss: dec!(1.0950),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"label\":\"EURUSD_TF_0.0010_1\""));
    }

    #[tokio::test]
    async fn mock_reports_rejection() {
        let mut mock = MockExecutionPort::new();
        mock.expect_submit_order().returning(|_| {
            Err(ExecutionError::OrderRejected {
                reason: "market closed".to_string(),
            })
        });

        let request = PlacementRequest {
            label: "x".to_string(),
            symbol: Symbol::new("EURUSD"),
            direction: Direction::Short,
            size: dec!(1),
            take_profit: dec!(1),
            stop_loss: dec!(1),
        };
        let err = mock.submit_order(request).await.unwrap_err();
        assert_eq!(err.to_string(), "Order rejected: market closed");
    }
}
