//! Portfolio Bounded Context
//!
//! Realized statistics per variant and for the whole portfolio, and the
//! read-only snapshot handed to reporting collaborators.

mod snapshot;
mod stats;

pub use snapshot::{EngineSnapshot, VariantSnapshot};
pub use stats::{AggregatePortfolioStats, LiveOrderRef, LiveTradeStats};
