//! Paper Run Binary
//!
//! Replays a seeded random-walk market through the allocation engine using
//! the paper adapters, then prints the final engine snapshot as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin paper-run -- config.yaml
//! ```
//!
//! # Environment Variables
//!
//! - `ALLOCATION_CONFIG`: Config path when no argument is given (default: config.yaml)
//! - `RUST_LOG`: Log level (default: info)

use std::collections::HashMap;
use std::sync::Arc;

use allocation_engine::application::{AllocationEngine, EnginePorts, NoOpEventPublisher};
use allocation_engine::config::{Config, load_config};
use allocation_engine::domain::shared::{Bar, Instrument, Symbol, Tick};
use allocation_engine::infrastructure::paper::{PaperAccount, PaperExecution, StaticVolatility};
use allocation_engine::telemetry;
use anyhow::Context;
use chrono::{DateTime, TimeDelta, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

/// Seeded random walk producing one tick per instrument per step.
struct RandomWalk {
    rng: StdRng,
    step_points: i64,
    spread_points: u32,
    prices: HashMap<Symbol, Decimal>,
}

impl RandomWalk {
    fn new(config: &Config, instruments: &[Instrument]) -> Self {
        let prices = instruments
            .iter()
            .map(|i| {
                let start = config
                    .paper
                    .initial_prices
                    .get(i.symbol.as_str())
                    .copied()
                    .unwrap_or(Decimal::ONE);
                (i.symbol.clone(), start)
            })
            .collect();
        Self {
            rng: StdRng::seed_from_u64(config.paper.seed),
            step_points: i64::from(config.paper.step_points),
            spread_points: config.paper.spread_points,
            prices,
        }
    }

    fn next_tick(&mut self, instrument: &Instrument, time: DateTime<Utc>) -> Tick {
        let point = instrument.point();
        let step = self.rng.random_range(-self.step_points..=self.step_points);
        let price = self
            .prices
            .entry(instrument.symbol.clone())
            .or_insert(Decimal::ONE);
        *price = (*price + Decimal::from(step) * point).max(point);

        let bid = *price;
        let ask = bid + instrument.points_to_price(Decimal::from(self.spread_points));
        Tick::new(instrument.symbol.clone(), bid, ask, time)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing()?;

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("ALLOCATION_CONFIG").ok())
        .unwrap_or_else(|| "config.yaml".to_string());
    let config = load_config(Some(path.as_str())).with_context(|| format!("loading {path}"))?;

    let instruments: Vec<Instrument> = config
        .instruments
        .iter()
        .map(|i| i.to_instrument())
        .collect();
    let account = Arc::new(PaperAccount::new(config.paper.starting_equity));
    let execution = Arc::new(PaperExecution::new(
        instruments.clone(),
        config.paper.commission,
        Arc::clone(&account),
    ));
    let volatility = StaticVolatility::new(
        config
            .paper
            .volatility
            .iter()
            .map(|(symbol, reading)| (symbol.clone(), *reading)),
    );

    let engine = AllocationEngine::new(
        config.engine_settings(),
        config.strategy_variants(),
        EnginePorts {
            execution: execution.clone(),
            account: account.clone(),
            volatility: Arc::new(volatility),
            publisher: Arc::new(NoOpEventPublisher),
        },
    )
    .context("building engine")?;

    tracing::info!(
        config = %path,
        instruments = instruments.len(),
        ticks = config.paper.ticks,
        seed = config.paper.seed,
        "Starting paper run"
    );

    let mut walk = RandomWalk::new(&config, &instruments);
    let ticks_per_bar = config.paper.ticks_per_bar.max(1);
    let admission_period = engine.settings().admission_period.clone();
    let mut bar_open: HashMap<Symbol, Decimal> = HashMap::new();
    let start = Utc::now();

    for step in 0..config.paper.ticks {
        let time = start + TimeDelta::minutes(i64::try_from(step).unwrap_or(i64::MAX));

        for instrument in &instruments {
            let tick = walk.next_tick(instrument, time);
            bar_open
                .entry(instrument.symbol.clone())
                .or_insert_with(|| tick.mid());

            engine.on_tick(&tick);
            for event in execution.on_tick(&tick) {
                if let Err(e) = engine.on_order_event(event).await {
                    tracing::warn!(error = %e, "Order event handling failed");
                }
            }

            if (step + 1) % ticks_per_bar == 0 {
                let bar = Bar {
                    symbol: instrument.symbol.clone(),
                    period: admission_period.clone(),
                    open: bar_open.remove(&instrument.symbol).unwrap_or_else(|| tick.mid()),
                    close: tick.mid(),
                    time,
                };
                if let Err(e) = engine.on_bar(&bar).await {
                    tracing::warn!(error = %e, "Admission pass failed");
                }
                if let Err(e) = engine.reconcile(&instrument.symbol).await {
                    tracing::warn!(error = %e, "Reconciliation failed");
                }
            }
        }
    }

    let snapshot = engine.snapshot();
    tracing::info!(
        live_orders = snapshot.live_orders,
        wins = snapshot.aggregate.wins,
        losses = snapshot.aggregate.losses,
        total_profit = %snapshot.aggregate.total_profit,
        equity = %account.equity(),
        "Paper run finished"
    );
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
