//! Strategy parameters

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Opening-range breakout parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbConfig {
    /// Length of the opening window in minutes
    pub range_minutes: i64,
    /// Bars averaged for the breakout volume check
    pub volume_lookback: usize,
    /// Breakout bar volume must exceed the average by this multiple
    pub volume_multiplier: Decimal,
    /// Bid/ask size ratio beyond which the book opposes a direction
    pub imbalance_threshold: Decimal,
    /// Require the range to clear the previous day's high (long) / low (short)
    pub previous_day_filter: bool,
    /// Without previous-day data, block instead of skipping the filter
    pub previous_day_mandatory: bool,
    /// Bars before the breakout checked for consolidation
    pub consolidation_bars: usize,
    /// Maximum range of those bars, percent of price
    pub consolidation_max_pct: Decimal,
    /// Wait for price to revisit the broken level before entering
    pub retest_enabled: bool,
    /// Retest proximity band, percent of the level
    pub retest_proximity_pct: Decimal,
}

impl Default for OrbConfig {
    fn default() -> Self {
        Self {
            range_minutes: 15,
            volume_lookback: 5,
            volume_multiplier: dec!(1.5),
            imbalance_threshold: dec!(3.0),
            previous_day_filter: true,
            previous_day_mandatory: false,
            consolidation_bars: 3,
            consolidation_max_pct: dec!(1.0),
            retest_enabled: false,
            retest_proximity_pct: dec!(0.1),
        }
    }
}

/// Volatility-scaled exit bands, in multiples of volatility at entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitPolicy {
    pub long_take_profit: Decimal,
    pub long_stop_loss: Decimal,
    pub short_take_profit: Decimal,
    pub short_stop_loss: Decimal,
}

impl Default for ExitPolicy {
    fn default() -> Self {
        Self {
            long_take_profit: dec!(1.5),
            long_stop_loss: dec!(0.8),
            short_take_profit: dec!(1.2),
            short_stop_loss: dec!(0.6),
        }
    }
}
