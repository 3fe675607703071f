//! Infrastructure Layer
//!
//! Adapters implementing the ports defined in the application layer.
//!
//! - `paper/`: In-memory execution venue, account and volatility source
//!   for simulated runs

pub mod paper;
