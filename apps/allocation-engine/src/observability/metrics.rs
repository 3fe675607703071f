//! Metrics for the allocation engine.
//!
//! Recorded through the `metrics` facade. No exporter is installed here;
//! the embedding process decides where the values go.

use metrics::{counter, gauge, histogram};

use crate::domain::order_lifecycle::SafetyNetScope;
use crate::domain::strategy::TradeOutcome;

// ============================================================================
// Admission Metrics
// ============================================================================

/// Record an accepted placement.
///
/// # Arguments
///
/// * `symbol` - Instrument traded
/// * `latency_seconds` - Time from submit to acknowledgement in seconds
pub fn record_placement(symbol: &str, latency_seconds: f64) {
    counter!("allocation_placements_total", "symbol" => symbol.to_string()).increment(1);
    histogram!("allocation_placement_latency_seconds", "symbol" => symbol.to_string())
        .record(latency_seconds);
}

/// Record a placement the venue refused.
pub fn record_placement_rejection(symbol: &str) {
    counter!("allocation_placement_rejections_total", "symbol" => symbol.to_string()).increment(1);
}

/// Record a candidate deferred to the next pass.
///
/// # Arguments
///
/// * `symbol` - Instrument traded
/// * `reason` - Short reason code (e.g. `"insufficient_data"`, `"volatility_error"`)
pub fn record_admission_deferral(symbol: &str, reason: &str) {
    counter!(
        "allocation_admission_deferrals_total",
        "symbol" => symbol.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Update the live orders gauge.
pub fn update_live_orders(count: usize) {
    #[allow(clippy::cast_precision_loss)]
    gauge!("allocation_live_orders").set(count as f64);
}

// ============================================================================
// Trade Metrics
// ============================================================================

/// Record a closed live trade.
pub fn record_trade_close(symbol: &str, outcome: TradeOutcome) {
    let outcome = match outcome {
        TradeOutcome::Win => "win",
        TradeOutcome::Loss => "loss",
    };
    counter!(
        "allocation_trades_closed_total",
        "symbol" => symbol.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a closed virtual trade.
pub fn record_virtual_close(symbol: &str) {
    counter!("allocation_virtual_closes_total", "symbol" => symbol.to_string()).increment(1);
}

/// Record a safety-net reset.
pub fn record_safety_net_reset(scope: SafetyNetScope) {
    let scope = match scope {
        SafetyNetScope::Variant(_) => "variant",
        SafetyNetScope::Portfolio => "portfolio",
    };
    counter!("allocation_safety_net_resets_total", "scope" => scope).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::VariantId;

    // Without an installed recorder these are no-ops; they must not panic.
    #[test]
    fn recording_without_recorder_is_harmless() {
        record_placement("EURUSD", 0.01);
        record_placement_rejection("EURUSD");
        record_admission_deferral("EURUSD", "insufficient_data");
        update_live_orders(3);
        record_trade_close("EURUSD", TradeOutcome::Loss);
        record_virtual_close("EURUSD");
        record_safety_net_reset(SafetyNetScope::Variant(VariantId::new(0)));
        record_safety_net_reset(SafetyNetScope::Portfolio);
    }
}
