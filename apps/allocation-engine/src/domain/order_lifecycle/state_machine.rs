//! Order State Machine Service
//!
//! `Pending -> Filled -> Closed`, or `Pending | Filled -> Cancelled`.
//! `Closed` and `Cancelled` are terminal.

use super::errors::OrderLifecycleError;
use super::status::OrderStatus;

/// Order State Machine for validating transitions.
pub struct OrderStateMachine;

impl OrderStateMachine {
    /// Check if a state transition is valid.
    #[must_use]
    pub const fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        matches!(
            (from, to),
            (OrderStatus::Pending, OrderStatus::Filled)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Filled, OrderStatus::Closed)
                | (OrderStatus::Filled, OrderStatus::Cancelled)
        )
    }

    /// Validate a state transition.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is invalid.
    pub fn validate_transition(
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), OrderLifecycleError> {
        if Self::is_valid_transition(from, to) {
            Ok(())
        } else {
            Err(OrderLifecycleError::InvalidStateTransition {
                from,
                to,
                reason: Self::transition_error_reason(from, to),
            })
        }
    }

    /// Get a human-readable reason for an invalid transition.
    #[must_use]
    pub fn transition_error_reason(from: OrderStatus, to: OrderStatus) -> String {
        match from {
            OrderStatus::Closed => format!("Order is already closed, cannot transition to {to}"),
            OrderStatus::Cancelled => format!("Order is cancelled, cannot transition to {to}"),
            OrderStatus::Pending if to == OrderStatus::Closed => {
                "Order was never filled, nothing to close".to_string()
            }
            _ => format!("Invalid transition from {from} to {to}"),
        }
    }

    /// Get all valid next states from a given state.
    #[must_use]
    pub fn valid_next_states(from: OrderStatus) -> Vec<OrderStatus> {
        match from {
            OrderStatus::Pending => vec![OrderStatus::Filled, OrderStatus::Cancelled],
            OrderStatus::Filled => vec![OrderStatus::Closed, OrderStatus::Cancelled],
            OrderStatus::Closed | OrderStatus::Cancelled => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions() {
        assert!(OrderStateMachine::is_valid_transition(
            OrderStatus::Pending,
            OrderStatus::Filled
        ));
        assert!(OrderStateMachine::is_valid_transition(
            OrderStatus::Filled,
            OrderStatus::Closed
        ));
    }

    #[test]
    fn cancel_from_pending_or_filled() {
        assert!(OrderStateMachine::is_valid_transition(
            OrderStatus::Pending,
            OrderStatus::Cancelled
        ));
        assert!(OrderStateMachine::is_valid_transition(
            OrderStatus::Filled,
            OrderStatus::Cancelled
        ));
    }

    #[test]
    fn pending_cannot_close() {
        let err = OrderStateMachine::validate_transition(OrderStatus::Pending, OrderStatus::Closed)
            .unwrap_err();
        assert!(err.to_string().contains("never filled"));
    }

    #[test]
    fn no_transitions_from_terminal_states() {
        for terminal in [OrderStatus::Closed, OrderStatus::Cancelled] {
            assert!(OrderStateMachine::valid_next_states(terminal).is_empty());
            for to in [
                OrderStatus::Pending,
                OrderStatus::Filled,
                OrderStatus::Closed,
                OrderStatus::Cancelled,
            ] {
                assert!(!OrderStateMachine::is_valid_transition(terminal, to));
            }
        }
    }

    #[test]
    fn transition_error_reason_terminal_states() {
        let reason =
            OrderStateMachine::transition_error_reason(OrderStatus::Closed, OrderStatus::Filled);
        assert!(reason.contains("already closed"));
    }
}
