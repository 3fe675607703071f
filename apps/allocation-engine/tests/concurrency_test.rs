//! Concurrency Tests
//!
//! Admission passes, venue notifications and manual closes race on a
//! multi-threaded runtime. The live order count must never exceed
//! `max_concurrent`, and no variant may hold two orders.

// Allow unwrap in tests - tests should panic on unexpected errors
#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::task::JoinSet;

use allocation_engine::application::{
    AllocationEngine, EnginePorts, EngineSettings, ExecutionError, ExecutionPort,
    NoOpEventPublisher, PlacementRequest,
};
use allocation_engine::domain::order_lifecycle::OrderStatus;
use allocation_engine::domain::risk::ProtectivePrices;
use allocation_engine::domain::shared::{Instrument, OrderId, Symbol, Tick, VariantId};
use allocation_engine::domain::strategy::{BiasRule, StrategyVariant};
use allocation_engine::infrastructure::paper::{PaperAccount, PaperExecution, StaticVolatility};

const MAX_CONCURRENT: usize = 4;

/// Paper venue that yields before every request, widening race windows.
struct SlowVenue {
    inner: Arc<PaperExecution>,
    delay: Duration,
}

#[async_trait]
impl ExecutionPort for SlowVenue {
    async fn submit_order(&self, request: PlacementRequest) -> Result<OrderId, ExecutionError> {
        tokio::time::sleep(self.delay).await;
        self.inner.submit_order(request).await
    }

    async fn live_orders(&self, symbol: &Symbol) -> Result<Vec<OrderId>, ExecutionError> {
        self.inner.live_orders(symbol).await
    }

    async fn set_protective_prices(
        &self,
        order_id: &OrderId,
        prices: ProtectivePrices,
    ) -> Result<(), ExecutionError> {
        tokio::time::sleep(self.delay).await;
        self.inner.set_protective_prices(order_id, prices).await
    }

    async fn close(&self, order_id: &OrderId) -> Result<(), ExecutionError> {
        tokio::time::sleep(self.delay).await;
        self.inner.close(order_id).await
    }

    async fn order_state(&self, order_id: &OrderId) -> Result<OrderStatus, ExecutionError> {
        self.inner.order_state(order_id).await
    }
}

fn build(variant_count: usize) -> (Arc<AllocationEngine>, Arc<PaperExecution>) {
    let instrument = Instrument::new("EURUSD", 5, dec!(0.01));
    let variants = (0..variant_count)
        .map(|i| {
            StrategyVariant::new(
                VariantId::new(i),
                instrument.clone(),
                BiasRule::FixedBuy,
                dec!(0.0010),
            )
        })
        .collect();
    let account = Arc::new(PaperAccount::new(dec!(10000)));
    let venue = Arc::new(PaperExecution::new([instrument], dec!(1), account.clone()));
    let settings = EngineSettings {
        window_size: 2,
        win_rate_threshold: dec!(80),
        max_concurrent: MAX_CONCURRENT,
        close_timeout: Duration::from_secs(1),
        ..EngineSettings::default()
    };
    let engine = AllocationEngine::new(
        settings,
        variants,
        EnginePorts {
            execution: Arc::new(SlowVenue {
                inner: venue.clone(),
                delay: Duration::from_millis(1),
            }),
            account,
            volatility: Arc::new(StaticVolatility::new([("EURUSD", dec!(0.0010))])),
            publisher: Arc::new(NoOpEventPublisher),
        },
    )
    .unwrap();
    (Arc::new(engine), venue)
}

fn tick(mid: Decimal, step: i64) -> Tick {
    Tick::new("EURUSD", mid, mid, Utc::now() + TimeDelta::minutes(step))
}

/// Rising quotes: every long variant wins its shadow trades.
fn warm_up(engine: &AllocationEngine) -> Decimal {
    let mut mid = dec!(1.10000);
    for step in 0..3 {
        engine.on_tick(&tick(mid, step));
        mid += dec!(0.00200);
    }
    mid - dec!(0.00200)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_passes_never_oversubscribe_slots() {
    let (engine, venue) = build(12);
    warm_up(&engine);

    let mut passes = JoinSet::new();
    for _ in 0..8 {
        let engine = engine.clone();
        passes.spawn(async move { engine.admission_pass().await.unwrap() });
    }

    let mut placed = Vec::new();
    while let Some(report) = passes.join_next().await {
        placed.extend(report.unwrap().placed);
    }

    assert_eq!(placed.len(), MAX_CONCURRENT);
    let variants: HashSet<VariantId> = placed.iter().map(|(v, _)| *v).collect();
    assert_eq!(variants.len(), MAX_CONCURRENT);
    assert_eq!(engine.live_order_count(), MAX_CONCURRENT);
    assert_eq!(venue.open_order_count(), MAX_CONCURRENT);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn churn_keeps_live_orders_within_limit() {
    let (engine, venue) = build(10);
    let mut mid = warm_up(&engine);
    let peak = Arc::new(AtomicUsize::new(0));

    let mut tasks = JoinSet::new();

    // Admission passes on every worker.
    for _ in 0..4 {
        let engine = engine.clone();
        let peak = peak.clone();
        tasks.spawn(async move {
            for _ in 0..25 {
                let _ = engine.admission_pass().await;
                peak.fetch_max(engine.live_order_count(), Ordering::SeqCst);
                tokio::task::yield_now().await;
            }
        });
    }

    // Manual closes against whichever variants hold an order.
    {
        let engine = engine.clone();
        let peak = peak.clone();
        tasks.spawn(async move {
            for round in 0..40 {
                let _ = engine.close_variant(VariantId::new(round % 10)).await;
                peak.fetch_max(engine.live_order_count(), Ordering::SeqCst);
                tokio::task::yield_now().await;
            }
        });
    }

    // The market: fills on one quote, take-profit on the next.
    {
        let engine = engine.clone();
        let venue = venue.clone();
        let peak = peak.clone();
        tasks.spawn(async move {
            let symbol = Symbol::new("EURUSD");
            for step in 3..60 {
                let quote = tick(mid, step);
                engine.on_tick(&quote);
                for event in venue.on_tick(&quote) {
                    let _ = engine.on_order_event(event).await;
                    peak.fetch_max(engine.live_order_count(), Ordering::SeqCst);
                }
                assert!(venue.open_order_count() <= MAX_CONCURRENT);
                if step % 10 == 0 {
                    let _ = engine.reconcile(&symbol).await;
                }
                mid += dec!(0.00200);
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        });
    }

    while let Some(result) = tasks.join_next().await {
        result.unwrap();
    }

    assert!(peak.load(Ordering::SeqCst) <= MAX_CONCURRENT);
    assert!(engine.live_order_count() <= MAX_CONCURRENT);
    assert!(venue.open_order_count() <= MAX_CONCURRENT);

    let snapshot = engine.snapshot();
    let per_variant: u32 = snapshot.variants.iter().map(|v| v.stats.trades()).sum();
    assert_eq!(per_variant, snapshot.aggregate.wins + snapshot.aggregate.losses);
    assert!(snapshot.aggregate.wins > 0);
}
