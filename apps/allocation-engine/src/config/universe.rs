//! Instruments and the variant grid built over them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{Instrument, VariantId};
use crate::domain::strategy::{BiasRule, StrategyVariant};

/// One tradable instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    /// Ticker.
    pub symbol: String,
    /// Quoted decimals.
    #[serde(default = "default_pip_scale")]
    pub pip_scale: u32,
    /// Account-currency value of one point per lot.
    #[serde(default = "default_one")]
    pub pip_value: Decimal,
    /// Units per lot.
    #[serde(default = "default_one")]
    pub contract_size: Decimal,
}

impl InstrumentConfig {
    /// Convert to the domain instrument.
    #[must_use]
    pub fn to_instrument(&self) -> Instrument {
        Instrument::new(self.symbol.as_str(), self.pip_scale, self.pip_value)
            .with_contract_size(self.contract_size)
    }
}

/// Rules and distances combined with every instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantsConfig {
    /// Bias rules to simulate.
    #[serde(default = "default_rules")]
    pub rules: Vec<BiasRule>,
    /// Target distances in points.
    #[serde(default = "default_distances")]
    pub distances_points: Vec<u32>,
}

impl Default for VariantsConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            distances_points: default_distances(),
        }
    }
}

/// Expand instruments × rules × distances into variants.
///
/// Ids follow the iteration order, which is also the ranking tie-break.
#[must_use]
pub fn build_variants(
    instruments: &[InstrumentConfig],
    variants: &VariantsConfig,
) -> Vec<StrategyVariant> {
    let mut built = Vec::new();
    for instrument in instruments.iter().map(InstrumentConfig::to_instrument) {
        for rule in &variants.rules {
            for points in &variants.distances_points {
                let distance = instrument.points_to_price(Decimal::from(*points));
                built.push(StrategyVariant::new(
                    VariantId::new(built.len()),
                    instrument.clone(),
                    *rule,
                    distance,
                ));
            }
        }
    }
    built
}

const fn default_pip_scale() -> u32 {
    5
}

const fn default_one() -> Decimal {
    Decimal::ONE
}

fn default_rules() -> Vec<BiasRule> {
    BiasRule::ALL.to_vec()
}

fn default_distances() -> Vec<u32> {
    vec![100, 200, 500]
}
