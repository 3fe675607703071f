//! Engine configuration: windows, threshold, slots and timeouts.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Core engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Outcomes kept per variant for the win rate.
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Minimum win rate in percent for admission.
    #[serde(default = "default_win_rate_threshold")]
    pub win_rate_threshold: Decimal,
    /// Maximum simultaneously live orders.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Bar period that triggers an admission pass.
    #[serde(default = "default_admission_period")]
    pub admission_period: String,
    /// Upper bound on a close request in milliseconds.
    #[serde(default = "default_close_timeout_ms")]
    pub close_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            win_rate_threshold: default_win_rate_threshold(),
            max_concurrent: default_max_concurrent(),
            admission_period: default_admission_period(),
            close_timeout_ms: default_close_timeout_ms(),
        }
    }
}

const fn default_window_size() -> usize {
    20
}

const fn default_win_rate_threshold() -> Decimal {
    dec!(80)
}

const fn default_max_concurrent() -> usize {
    5
}

fn default_admission_period() -> String {
    "M15".to_string()
}

const fn default_close_timeout_ms() -> u64 {
    5000
}
