//! Paper account: starting equity plus realized net results.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::application::ports::{AccountError, AccountPort};
use crate::domain::shared::round_currency;

/// In-memory implementation of `AccountPort`.
#[derive(Debug)]
pub struct PaperAccount {
    starting_equity: Decimal,
    realized: Mutex<Decimal>,
}

impl PaperAccount {
    /// Create an account holding `starting_equity`.
    #[must_use]
    pub const fn new(starting_equity: Decimal) -> Self {
        Self {
            starting_equity,
            realized: Mutex::new(Decimal::ZERO),
        }
    }

    /// Book a realized net result.
    pub fn credit(&self, net: Decimal) {
        let mut realized = self.realized.lock().unwrap_or_else(PoisonError::into_inner);
        *realized = round_currency(*realized + net);
    }

    /// Sum of booked results.
    #[must_use]
    pub fn realized(&self) -> Decimal {
        *self.realized.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Equity right now.
    #[must_use]
    pub fn equity(&self) -> Decimal {
        self.starting_equity + self.realized()
    }
}

#[async_trait]
impl AccountPort for PaperAccount {
    async fn current_equity(&self) -> Result<Decimal, AccountError> {
        Ok(self.equity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn equity_tracks_credits() {
        let account = PaperAccount::new(dec!(10000));
        account.credit(dec!(12.345));
        account.credit(dec!(-2.00));

        assert_eq!(account.realized(), dec!(10.35));
        assert_eq!(account.current_equity().await.unwrap(), dec!(10010.35));
    }
}
