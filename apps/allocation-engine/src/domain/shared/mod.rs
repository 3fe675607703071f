//! Shared Domain Types
//!
//! Value objects shared across the strategy, risk, portfolio and order
//! lifecycle contexts.

pub mod value_objects;

pub use value_objects::{
    Bar, Direction, Instrument, OrderId, Symbol, Tick, VariantId, round_currency, round_price,
    round_size,
};
