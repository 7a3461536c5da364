//! Risk parameters

use crate::breaker::CircuitBreakerThresholds;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// How the spread acceptability check measures the book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadCheck {
    /// (best ask − best bid) / last price
    #[default]
    QuotedSpread,
    /// |Σ bid size − Σ ask size| against the same price-scaled limit.
    /// Dimensionally a size, not a price: kept as an approximation for
    /// compatibility with existing tuning.
    ImbalanceProxy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Base quantity before scaling
    pub base_size: Decimal,
    /// Volatility floor in the sizing denominator
    pub min_volatility: Decimal,
    /// Veto when volatility exceeds this fraction of last price
    pub max_volatility_pct: Decimal,
    /// Veto when the spread measure exceeds this fraction of last price
    pub max_spread_pct: Decimal,
    pub spread_check: SpreadCheck,
    /// Average level size that counts as fully liquid
    pub liquidity_reference_size: Decimal,
    /// Size multiplier for short entries
    pub short_size_reduction: Decimal,
    /// Minimum short-availability score
    pub short_availability_threshold: Decimal,
    /// Exposure cap applied after sizing
    pub max_position_quantity: Option<Decimal>,
    pub circuit_breaker: CircuitBreakerThresholds,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            base_size: dec!(1000),
            min_volatility: dec!(0.0001),
            max_volatility_pct: dec!(0.05),
            max_spread_pct: dec!(0.01),
            spread_check: SpreadCheck::default(),
            liquidity_reference_size: dec!(1000),
            short_size_reduction: dec!(0.8),
            short_availability_threshold: dec!(0.7),
            max_position_quantity: None,
            circuit_breaker: CircuitBreakerThresholds::default(),
        }
    }
}
