//! Short-sale availability
//!
//! Borrow availability normally comes from a securities-lending feed. The
//! port lets one be plugged in; the default is a volume heuristic.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sentinel_market_data::MarketSnapshot;

/// Score in [0, 1]; higher means easier to borrow
pub trait ShortAvailability: Send + Sync {
    fn score(&self, snapshot: &MarketSnapshot) -> Decimal;
}

/// `1 − min(1, day volume / reference)`: heavily traded names score lower
#[derive(Debug, Clone)]
pub struct VolumeDecayAvailability {
    pub reference_volume: Decimal,
}

impl Default for VolumeDecayAvailability {
    fn default() -> Self {
        Self {
            reference_volume: dec!(10000000),
        }
    }
}

impl ShortAvailability for VolumeDecayAvailability {
    fn score(&self, snapshot: &MarketSnapshot) -> Decimal {
        if self.reference_volume <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        Decimal::ONE - (snapshot.day_volume / self.reference_volume).min(Decimal::ONE)
    }
}

/// Constant score
#[derive(Debug, Clone, Copy)]
pub struct FixedAvailability(pub Decimal);

impl ShortAvailability for FixedAvailability {
    fn score(&self, _snapshot: &MarketSnapshot) -> Decimal {
        self.0
    }
}
