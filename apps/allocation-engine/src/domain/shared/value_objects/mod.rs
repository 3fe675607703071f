//! Shared Value Objects
//!
//! Immutable domain types used across bounded contexts.
//! Value objects are compared by value, not identity.

mod direction;
mod identifiers;
mod instrument;
mod market;
mod rounding;

pub use direction::Direction;
pub use identifiers::{OrderId, Symbol, VariantId};
pub use instrument::Instrument;
pub use market::{Bar, Tick};
pub use rounding::{round_currency, round_price, round_size};
