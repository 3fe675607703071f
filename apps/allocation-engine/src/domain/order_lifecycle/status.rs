//! Order status in the lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of an order owned by the execution collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Submitted, not yet filled.
    Pending,
    /// Position open.
    Filled,
    /// Position closed; profit realized.
    Closed,
    /// Withdrawn before or after filling without realizing a trade.
    Cancelled,
}

impl OrderStatus {
    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Cancelled)
    }

    /// Returns true if the order consumes a live slot.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Pending | Self::Filled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Filled => write!(f, "FILLED"),
            Self::Closed => write!(f, "CLOSED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_and_live_are_complements() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Filled,
            OrderStatus::Closed,
            OrderStatus::Cancelled,
        ] {
            assert_ne!(status.is_terminal(), status.is_live(), "{status}");
        }
    }

    #[test]
    fn serde_uses_screaming_case() {
        let json = serde_json::to_string(&OrderStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
    }
}
