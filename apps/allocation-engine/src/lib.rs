// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Allocation Engine - Rust Core Library
//!
//! Adaptive multi-strategy trade allocation and risk engine.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic, no I/O
//!   - `strategy`: Variants, shadow simulation, rolling windows, ranking
//!   - `risk`: Position sizing, protective levels, profit lock and safety net
//!   - `portfolio`: Live trade statistics and snapshots
//!   - `order_lifecycle`: Order status machine, order and engine events
//!
//! - **Application**: Orchestration
//!   - `ports`: Interfaces for external systems (`ExecutionPort`, `AccountPort`,
//!     `VolatilityPort`, `EventPublisherPort`)
//!   - `engine`: The `AllocationEngine` service
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `paper`: In-memory venue, account and volatility source
//!
//! Cross-cutting: `config` (YAML loading), `observability` (metrics) and
//! `telemetry` (tracing subscriber).

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Engine service and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-cutting Modules
// =============================================================================

/// Configuration loading and validation.
pub mod config;

/// Metrics instrumentation.
pub mod observability;

/// Tracing subscriber setup.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

// Domain re-exports
pub use domain::order_lifecycle::{EngineEvent, OrderEvent, OrderEventKind, OrderStatus};
pub use domain::portfolio::{EngineSnapshot, VariantSnapshot};
pub use domain::risk::{PositionSizer, PositionSizerConfig, SizingPolicy};
pub use domain::shared::{Bar, Direction, Instrument, OrderId, Symbol, Tick, VariantId};
pub use domain::strategy::{BiasRule, StrategyVariant};

// Application re-exports
pub use application::engine::{AdmissionReport, AllocationEngine, EngineError, EnginePorts, EngineSettings};
pub use application::ports::{
    AccountError, AccountPort, EventPublisherPort, ExecutionError, ExecutionPort,
    NoOpEventPublisher, PlacementRequest, RecordingEventPublisher, VolatilityError, VolatilityPort,
};

// Infrastructure re-exports
pub use infrastructure::paper::{PaperAccount, PaperExecution, StaticVolatility};
