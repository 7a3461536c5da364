//! Sector relative strength
//!
//! Shared across instruments: every instrument's intraday return feeds its
//! sector's damped average, `new = (old + sample) / 2`.

use dashmap::DashMap;
use rust_decimal::Decimal;

/// Relative performance of one sector against another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeStrength {
    Outperform,
    Underperform,
    Neutral,
}

#[derive(Debug)]
pub struct SectorStrength {
    averages: DashMap<String, Decimal>,
    threshold: Decimal,
}

impl SectorStrength {
    pub fn new(threshold: Decimal) -> Self {
        Self {
            averages: DashMap::new(),
            threshold,
        }
    }

    /// Fold a return sample into the sector average
    pub fn update(&self, sector: &str, sample: Decimal) {
        self.averages
            .entry(sector.to_string())
            .and_modify(|avg| *avg = (*avg + sample) / Decimal::TWO)
            .or_insert(sample);
    }

    pub fn strength(&self, sector: &str) -> Option<Decimal> {
        self.averages.get(sector).map(|avg| *avg)
    }

    /// Compare two sectors; `None` when either has no data yet
    pub fn relative(&self, sector: &str, benchmark: &str) -> Option<RelativeStrength> {
        let diff = self.strength(sector)? - self.strength(benchmark)?;
        Some(if diff > self.threshold {
            RelativeStrength::Outperform
        } else if diff < -self.threshold {
            RelativeStrength::Underperform
        } else {
            RelativeStrength::Neutral
        })
    }

    pub fn outperforms(&self, sector: &str, benchmark: &str) -> bool {
        self.relative(sector, benchmark) == Some(RelativeStrength::Outperform)
    }

    pub fn underperforms(&self, sector: &str, benchmark: &str) -> bool {
        self.relative(sector, benchmark) == Some(RelativeStrength::Underperform)
    }

    pub fn clear(&self) {
        self.averages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_damped_average() {
        let sectors = SectorStrength::new(dec!(0.005));
        sectors.update("tech", dec!(0.02));
        assert_eq!(sectors.strength("tech"), Some(dec!(0.02)));

        sectors.update("tech", dec!(0.04));
        assert_eq!(sectors.strength("tech"), Some(dec!(0.03)));

        sectors.update("tech", dec!(0.01));
        assert_eq!(sectors.strength("tech"), Some(dec!(0.02)));
    }

    #[test]
    fn test_relative_strength_needs_differential() {
        let sectors = SectorStrength::new(dec!(0.005));
        sectors.update("tech", dec!(0.012));
        sectors.update("market", dec!(0.004));
        sectors.update("energy", dec!(0.001));

        assert!(sectors.outperforms("tech", "market"));
        assert!(!sectors.outperforms("energy", "market"));
        assert!(!sectors.underperforms("energy", "market"));
        assert_eq!(sectors.relative("energy", "market"), Some(RelativeStrength::Neutral));
        assert!(sectors.underperforms("market", "tech"));
    }

    #[test]
    fn test_unknown_sector_is_neutral() {
        let sectors = SectorStrength::new(dec!(0.005));
        sectors.update("tech", dec!(0.05));

        assert_eq!(sectors.relative("tech", "market"), None);
        assert!(!sectors.outperforms("tech", "market"));
        assert!(!sectors.underperforms("utilities", "tech"));
    }
}
