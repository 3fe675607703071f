//! Domain Layer
//!
//! The innermost layer containing business logic with zero infrastructure dependencies.
//! Nothing in here performs I/O, awaits, or locks.
//!
//! # Bounded Contexts
//!
//! - [`strategy`]: Strategy variants, shadow simulation, win-rate ranking
//! - [`risk`]: Position sizing, protective prices, profit-lock safety net
//! - [`portfolio`]: Realized per-variant and portfolio statistics, snapshots
//! - [`order_lifecycle`]: Order status transitions, inbound and outbound events

pub mod order_lifecycle;
pub mod portfolio;
pub mod risk;
pub mod shared;
pub mod strategy;
