//! Paper execution venue.
//!
//! Orders fill on the first tick after submission at the touch price. A
//! filled position closes when the touch crosses its take-profit or
//! stop-loss, or on the tick after a close request. Every state change is
//! reported as an [`OrderEvent`] from [`PaperExecution::on_tick`].

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::debug;

use super::account::PaperAccount;
use crate::application::ports::{ExecutionError, ExecutionPort, PlacementRequest};
use crate::domain::order_lifecycle::{OrderEvent, OrderStatus};
use crate::domain::risk::ProtectivePrices;
use crate::domain::shared::{Direction, Instrument, OrderId, Symbol, Tick, round_currency};

#[derive(Debug, Clone)]
struct PaperOrder {
    symbol: Symbol,
    direction: Direction,
    size: Decimal,
    take_profit: Decimal,
    stop_loss: Decimal,
    status: OrderStatus,
    fill_price: Option<Decimal>,
    close_requested: bool,
}

#[derive(Debug, Default)]
struct PaperBook {
    orders: BTreeMap<OrderId, PaperOrder>,
    queued: Vec<OrderEvent>,
    sequence: u64,
}

/// In-memory implementation of `ExecutionPort`.
#[derive(Debug)]
pub struct PaperExecution {
    instruments: HashMap<Symbol, Instrument>,
    commission: Decimal,
    account: Arc<PaperAccount>,
    book: Mutex<PaperBook>,
}

impl PaperExecution {
    /// Create a venue trading `instruments` and booking results on `account`.
    #[must_use]
    pub fn new(
        instruments: impl IntoIterator<Item = Instrument>,
        commission: Decimal,
        account: Arc<PaperAccount>,
    ) -> Self {
        Self {
            instruments: instruments
                .into_iter()
                .map(|i| (i.symbol.clone(), i))
                .collect(),
            commission,
            account,
            book: Mutex::new(PaperBook::default()),
        }
    }

    fn book(&self) -> MutexGuard<'_, PaperBook> {
        self.book.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of orders that are pending or filled.
    #[must_use]
    pub fn open_order_count(&self) -> usize {
        self.book()
            .orders
            .values()
            .filter(|o| o.status.is_live())
            .count()
    }

    /// Match open orders against a tick and return the resulting events.
    pub fn on_tick(&self, tick: &Tick) -> Vec<OrderEvent> {
        let mut book = self.book();
        let mut events = std::mem::take(&mut book.queued);
        let Some(instrument) = self.instruments.get(&tick.symbol) else {
            return events;
        };

        for (order_id, order) in book.orders.iter_mut() {
            if order.symbol != tick.symbol {
                continue;
            }
            match order.status {
                OrderStatus::Pending => {
                    let price = tick.entry_price(order.direction);
                    order.status = OrderStatus::Filled;
                    order.fill_price = Some(price);
                    debug!(order_id = %order_id, %price, "Paper fill");
                    events.push(OrderEvent::filled(order_id.clone(), price, tick.time));
                }
                OrderStatus::Filled => {
                    let exit = tick.exit_price(order.direction);
                    if !(order.close_requested || Self::protection_hit(order, exit)) {
                        continue;
                    }
                    let entry = order.fill_price.unwrap_or(exit);
                    let points = (exit - entry) * order.direction.sign() / instrument.point();
                    let gross = round_currency(points * instrument.pip_value * order.size);
                    order.status = OrderStatus::Closed;
                    self.account.credit(gross - self.commission);
                    debug!(order_id = %order_id, %exit, %gross, "Paper close");
                    events.push(OrderEvent::closed(
                        order_id.clone(),
                        exit,
                        gross,
                        self.commission,
                        tick.time,
                    ));
                }
                OrderStatus::Closed | OrderStatus::Cancelled => {}
            }
        }
        events
    }

    fn protection_hit(order: &PaperOrder, exit: Decimal) -> bool {
        match order.direction {
            Direction::Long => exit >= order.take_profit || exit <= order.stop_loss,
            Direction::Short => exit <= order.take_profit || exit >= order.stop_loss,
        }
    }

    fn not_found(order_id: &OrderId) -> ExecutionError {
        ExecutionError::OrderNotFound {
            order_id: order_id.to_string(),
        }
    }
}

#[async_trait]
impl ExecutionPort for PaperExecution {
    async fn submit_order(&self, request: PlacementRequest) -> Result<OrderId, ExecutionError> {
        if !self.instruments.contains_key(&request.symbol) {
            return Err(ExecutionError::OrderRejected {
                reason: format!("unknown symbol {}", request.symbol),
            });
        }
        if request.size <= Decimal::ZERO {
            return Err(ExecutionError::OrderRejected {
                reason: format!("invalid size {}", request.size),
            });
        }

        let mut book = self.book();
        book.sequence += 1;
        let order_id = OrderId::new(format!("paper-{:06}", book.sequence));
        book.orders.insert(
            order_id.clone(),
            PaperOrder {
                symbol: request.symbol,
                direction: request.direction,
                size: request.size,
                take_profit: request.take_profit,
                stop_loss: request.stop_loss,
                status: OrderStatus::Pending,
                fill_price: None,
                close_requested: false,
            },
        );
        Ok(order_id)
    }

    async fn live_orders(&self, symbol: &Symbol) -> Result<Vec<OrderId>, ExecutionError> {
        Ok(self
            .book()
            .orders
            .iter()
            .filter(|(_, o)| &o.symbol == symbol && o.status.is_live())
            .map(|(id, _)| id.clone())
            .collect())
    }

    async fn set_protective_prices(
        &self,
        order_id: &OrderId,
        prices: ProtectivePrices,
    ) -> Result<(), ExecutionError> {
        let mut book = self.book();
        let order = book
            .orders
            .get_mut(order_id)
            .filter(|o| o.status.is_live())
            .ok_or_else(|| Self::not_found(order_id))?;
        order.take_profit = prices.take_profit;
        order.stop_loss = prices.stop_loss;
        Ok(())
    }

    async fn close(&self, order_id: &OrderId) -> Result<(), ExecutionError> {
        let mut book = self.book();
        let order = book
            .orders
            .get_mut(order_id)
            .ok_or_else(|| Self::not_found(order_id))?;
        match order.status {
            OrderStatus::Pending => {
                order.status = OrderStatus::Cancelled;
                book.queued.push(OrderEvent::cancelled(
                    order_id.clone(),
                    Some("closed before fill".to_string()),
                    Utc::now(),
                ));
            }
            OrderStatus::Filled => order.close_requested = true,
            OrderStatus::Closed | OrderStatus::Cancelled => return Err(Self::not_found(order_id)),
        }
        Ok(())
    }

    async fn order_state(&self, order_id: &OrderId) -> Result<OrderStatus, ExecutionError> {
        self.book()
            .orders
            .get(order_id)
            .map(|o| o.status)
            .ok_or_else(|| Self::not_found(order_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_lifecycle::OrderEventKind;
    use rust_decimal_macros::dec;

    fn venue() -> (PaperExecution, Arc<PaperAccount>) {
        let account = Arc::new(PaperAccount::new(dec!(1000)));
        let execution = PaperExecution::new(
            [Instrument::new("EURUSD", 4, dec!(1))],
            dec!(0.50),
            account.clone(),
        );
        (execution, account)
    }

    fn request(direction: Direction) -> PlacementRequest {
        PlacementRequest {
            label: "EURUSD_TF_0.0010_1".to_string(),
            symbol: Symbol::new("EURUSD"),
            direction,
            size: dec!(2),
            take_profit: dec!(1.1020),
            stop_loss: dec!(1.0980),
        }
    }

    fn tick(bid: Decimal, ask: Decimal) -> Tick {
        Tick::new("EURUSD", bid, ask, Utc::now())
    }

    #[tokio::test]
    async fn long_fills_at_ask_and_takes_profit_at_bid() {
        let (execution, account) = venue();
        let id = execution.submit_order(request(Direction::Long)).await.unwrap();
        assert_eq!(execution.order_state(&id).await.unwrap(), OrderStatus::Pending);

        let fills = execution.on_tick(&tick(dec!(1.0999), dec!(1.1000)));
        assert_eq!(fills.len(), 1);
        assert_eq!(
            fills[0].kind,
            OrderEventKind::Filled {
                fill_price: dec!(1.1000)
            }
        );
        assert!(execution.on_tick(&tick(dec!(1.1010), dec!(1.1011))).is_empty());

        let closes = execution.on_tick(&tick(dec!(1.1020), dec!(1.1021)));
        assert_eq!(
            closes[0].kind,
            OrderEventKind::Closed {
                close_price: dec!(1.1020),
                gross_profit: dec!(40.00),
                commission: dec!(0.50),
            }
        );
        assert_eq!(account.realized(), dec!(39.50));
        assert_eq!(execution.open_order_count(), 0);
    }

    #[tokio::test]
    async fn short_stops_out() {
        let (execution, account) = venue();
        let mut short = request(Direction::Short);
        short.take_profit = dec!(1.0980);
        short.stop_loss = dec!(1.1020);
        execution.submit_order(short).await.unwrap();

        execution.on_tick(&tick(dec!(1.1000), dec!(1.1001)));
        let closes = execution.on_tick(&tick(dec!(1.1019), dec!(1.1020)));

        assert!(matches!(
            closes[0].kind,
            OrderEventKind::Closed { gross_profit, .. } if gross_profit == dec!(-40.00)
        ));
        assert_eq!(account.realized(), dec!(-40.50));
    }

    #[tokio::test]
    async fn close_before_fill_cancels() {
        let (execution, _) = venue();
        let id = execution.submit_order(request(Direction::Long)).await.unwrap();

        execution.close(&id).await.unwrap();
        let events = execution.on_tick(&tick(dec!(1.1), dec!(1.1)));

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0].kind, OrderEventKind::Cancelled { .. }));
        assert!(execution.close(&id).await.is_err());
    }

    #[tokio::test]
    async fn close_request_exits_on_next_tick() {
        let (execution, _) = venue();
        let id = execution.submit_order(request(Direction::Long)).await.unwrap();
        execution.on_tick(&tick(dec!(1.1000), dec!(1.1001)));

        execution.close(&id).await.unwrap();
        let events = execution.on_tick(&tick(dec!(1.1005), dec!(1.1006)));

        assert!(matches!(events[0].kind, OrderEventKind::Closed { .. }));
        assert!(
            execution
                .live_orders(&Symbol::new("EURUSD"))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn protective_prices_can_be_moved() {
        let (execution, _) = venue();
        let id = execution.submit_order(request(Direction::Long)).await.unwrap();
        execution.on_tick(&tick(dec!(1.1000), dec!(1.1001)));

        execution
            .set_protective_prices(
                &id,
                ProtectivePrices {
                    take_profit: dec!(1.1005),
                    stop_loss: dec!(1.0990),
                },
            )
            .await
            .unwrap();

        let events = execution.on_tick(&tick(dec!(1.1005), dec!(1.1006)));
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn unknown_symbol_is_rejected() {
        let (execution, _) = venue();
        let mut other = request(Direction::Long);
        other.symbol = Symbol::new("GBPUSD");

        let err = execution.submit_order(other).await.unwrap_err();
        assert!(matches!(err, ExecutionError::OrderRejected { .. }));
    }

    #[tokio::test]
    async fn missing_order_is_not_found() {
        let (execution, _) = venue();
        let id = OrderId::new("nope");
        assert!(matches!(
            execution.order_state(&id).await,
            Err(ExecutionError::OrderNotFound { .. })
        ));
    }
}
