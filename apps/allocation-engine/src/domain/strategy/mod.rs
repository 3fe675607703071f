//! Strategy Bounded Context
//!
//! Strategy variants, their cost-free shadow simulation and the win-rate
//! ranking used to pick which variant gets real capital next.

mod ranking;
mod rolling_window;
mod shadow;
mod variant;

pub use ranking::{RankedCandidate, StrategyRanker, win_rate};
pub use rolling_window::RollingWindow;
pub use shadow::{VirtualClose, VirtualPosition, VirtualTradeState};
pub use variant::{BiasRule, StrategyVariant, TradeOutcome, next_direction};
