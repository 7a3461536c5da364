//! Analyzer parameters

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Trade prices in the volatility window
    pub volatility_window: usize,
    /// Non-zero trade sizes in the volume window
    pub volume_window: usize,
    /// Spike when current size > average × this
    pub volume_spike_multiplier: Decimal,
    /// Samples in the rolling VWAP window
    pub vwap_window: usize,
    /// Fractional buffer around VWAP (0.005 = 0.5%)
    pub vwap_buffer: Decimal,
    /// Fractional differential for sector out/under-performance
    pub sector_threshold: Decimal,
    /// Benchmark sector for relative strength
    pub benchmark_sector: Option<String>,
    /// Intervals per trading day for daily volume projection
    pub intervals_per_day: u32,
    /// Projected volume must exceed ADV × this
    pub daily_volume_multiple: Decimal,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            volatility_window: 20,
            volume_window: 20,
            volume_spike_multiplier: dec!(2.5),
            vwap_window: 50,
            vwap_buffer: dec!(0.005),
            sector_threshold: dec!(0.005),
            benchmark_sector: None,
            intervals_per_day: 390,
            daily_volume_multiple: dec!(2.0),
        }
    }
}
