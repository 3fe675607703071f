//! Paper trading adapters.
//!
//! In-memory implementations of the execution, account and volatility
//! ports, used by the `paper-run` binary and by integration tests.

mod account;
mod execution;
mod volatility;

pub use account::PaperAccount;
pub use execution::PaperExecution;
pub use volatility::StaticVolatility;
