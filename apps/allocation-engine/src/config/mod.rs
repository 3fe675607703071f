//! Configuration module for the allocation engine.
//!
//! Provides YAML configuration loading, validation, and environment
//! variable interpolation.
//!
//! # Usage
//!
//! ```rust,ignore
//! use allocation_engine::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("custom/config.yaml"))?;
//!
//! let settings = config.engine_settings();
//! let variants = config.strategy_variants();
//! ```

mod engine;
mod paper;
mod protection;
mod sizing;
mod universe;

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use engine::EngineConfig;
pub use paper::PaperConfig;
pub use protection::ProtectionConfig;
pub use sizing::SizingConfig;
pub use universe::{InstrumentConfig, VariantsConfig, build_variants};

use crate::application::engine::EngineSettings;
use crate::domain::strategy::StrategyVariant;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Engine configuration.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Sizing policy.
    #[serde(default)]
    pub sizing: SizingConfig,
    /// Protective levels.
    #[serde(default)]
    pub protection: ProtectionConfig,
    /// Traded instruments.
    pub instruments: Vec<InstrumentConfig>,
    /// Variant grid.
    #[serde(default)]
    pub variants: VariantsConfig,
    /// Paper trading settings.
    #[serde(default)]
    pub paper: PaperConfig,
}

impl Config {
    /// Resolve the engine's runtime settings.
    #[must_use]
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            window_size: self.engine.window_size,
            win_rate_threshold: self.engine.win_rate_threshold,
            max_concurrent: self.engine.max_concurrent,
            admission_period: self.engine.admission_period.clone(),
            volatility_period: self.protection.volatility_period.clone(),
            volatility_lookback: self.protection.lookback,
            close_timeout: Duration::from_millis(self.engine.close_timeout_ms),
            protection: self.protection.to_policy(),
            sizing: self.sizing.to_sizer_config(),
        }
    }

    /// Build the variant grid.
    #[must_use]
    pub fn strategy_variants(&self) -> Vec<StrategyVariant> {
        build_variants(&self.instruments, &self.variants)
    }
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is a compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

fn validation_error(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let engine = &config.engine;
    if engine.window_size == 0 {
        return Err(validation_error("engine.window_size must be positive"));
    }
    if engine.win_rate_threshold < Decimal::ZERO || engine.win_rate_threshold > Decimal::ONE_HUNDRED
    {
        return Err(validation_error(
            "engine.win_rate_threshold must be between 0 and 100",
        ));
    }
    if engine.max_concurrent == 0 {
        return Err(validation_error("engine.max_concurrent must be positive"));
    }
    if engine.admission_period.trim().is_empty() {
        return Err(validation_error("engine.admission_period must not be empty"));
    }

    let max_fraction = config.sizing.max_fraction();
    if max_fraction <= Decimal::ZERO || max_fraction > Decimal::ONE {
        return Err(validation_error(
            "sizing.max_fraction must be in (0, 1]",
        ));
    }
    match &config.sizing {
        SizingConfig::EquityFraction { trade_fraction, .. } => {
            if *trade_fraction <= Decimal::ZERO || *trade_fraction > Decimal::ONE {
                return Err(validation_error(
                    "sizing.trade_fraction must be in (0, 1]",
                ));
            }
        }
        SizingConfig::Martingale {
            base_size, factor, ..
        } => {
            if *base_size <= Decimal::ZERO {
                return Err(validation_error("sizing.base_size must be positive"));
            }
            if *factor < Decimal::ZERO {
                return Err(validation_error("sizing.factor must not be negative"));
            }
        }
    }

    let protection = &config.protection;
    if protection.lookback == 0 {
        return Err(validation_error("protection.lookback must be positive"));
    }
    if protection.take_profit_multiplier <= Decimal::ZERO
        || protection.stop_loss_multiplier <= Decimal::ZERO
    {
        return Err(validation_error(
            "protection multipliers must be positive",
        ));
    }

    if config.instruments.is_empty() {
        return Err(validation_error("at least one instrument is required"));
    }
    let mut symbols = std::collections::HashSet::new();
    for instrument in &config.instruments {
        if !symbols.insert(instrument.symbol.as_str()) {
            return Err(validation_error(format!(
                "instrument {} is listed twice",
                instrument.symbol
            )));
        }
        if instrument.contract_size <= Decimal::ZERO {
            return Err(validation_error(format!(
                "instrument {} needs a positive contract_size",
                instrument.symbol
            )));
        }
    }

    if config.variants.rules.is_empty() || config.variants.distances_points.is_empty() {
        return Err(validation_error(
            "variants.rules and variants.distances_points must not be empty",
        ));
    }
    if config.variants.distances_points.contains(&0) {
        return Err(validation_error("variants.distances_points must be positive"));
    }

    Ok(())
}
