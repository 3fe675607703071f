//! Observability module for metrics.
//!
//! Counters and gauges describing admission, trade closes and the safety net.

mod metrics;

pub use metrics::{
    record_admission_deferral, record_placement, record_placement_rejection,
    record_safety_net_reset, record_trade_close, record_virtual_close, update_live_orders,
};
