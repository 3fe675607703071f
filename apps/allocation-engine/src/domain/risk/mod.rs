//! Risk Bounded Context
//!
//! Position sizing (equity-fraction and martingale), protective price
//! distances and the profit-lock safety net.
//!
//! # Example
//!
//! ```rust,ignore
//! use allocation_engine::domain::risk::{PositionSizer, PositionSizerConfig, SizingInput, SizingPolicy};
//! use rust_decimal_macros::dec;
//!
//! let sizer = PositionSizer::new(PositionSizerConfig {
//!     policy: SizingPolicy::EquityFraction { trade_fraction: dec!(0.01) },
//!     max_fraction: dec!(0.05),
//! });
//! let result = sizer.calculate(&SizingInput::new(dec!(10000)))?;
//! assert_eq!(result.size, dec!(100));
//! ```

mod error;
mod profit_lock;
mod protection;
mod sizer;

pub use error::SizingError;
pub use profit_lock::{ProfitLockState, SafetyNetReset};
pub use protection::{ProtectionPolicy, ProtectiveOffsets, ProtectivePrices};
pub use sizer::{PositionSizer, PositionSizerConfig, SizingInput, SizingPolicy, SizingResult};
