//! Account Port (Driven Port)
//!
//! Source of the account equity used for sizing and the safety net.

use async_trait::async_trait;
use rust_decimal::Decimal;

/// Account port error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountError {
    /// The account could not be queried.
    #[error("Account unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },
}

/// Port for account queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountPort: Send + Sync {
    /// Current account equity.
    async fn current_equity(&self) -> Result<Decimal, AccountError>;
}
