//! Trade-size spike detection

use crate::window::RollingWindow;
use rust_decimal::Decimal;

/// Flags a trade whose size exceeds the moving average of recent sizes.
///
/// Direction-agnostic: the caller decides whether a spike confirms a
/// breakout or a breakdown.
#[derive(Debug, Clone)]
pub struct VolumeSpikeDetector {
    sizes: RollingWindow,
    multiplier: Decimal,
}

impl VolumeSpikeDetector {
    pub fn new(window: usize, multiplier: Decimal) -> Self {
        Self {
            sizes: RollingWindow::new(window),
            multiplier,
        }
    }

    /// Simple moving average of the non-zero sizes seen
    pub fn average(&self) -> Option<Decimal> {
        self.sizes.mean()
    }

    /// Whether `current` is a spike against the window as it stands
    pub fn is_spike(&self, current: Decimal) -> bool {
        match self.average() {
            Some(avg) => current > avg * self.multiplier,
            None => false,
        }
    }

    /// Record a trade size; zero and negative sizes are skipped
    pub fn observe(&mut self, size: Decimal) {
        if size > Decimal::ZERO {
            self.sizes.push(size);
        }
    }

    /// Check `size` against the window, then add it
    pub fn check_and_observe(&mut self, size: Decimal) -> bool {
        let spike = self.is_spike(size);
        self.observe(size);
        spike
    }

    pub fn clear(&mut self) {
        self.sizes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_spike_against_prior_window() {
        let mut detector = VolumeSpikeDetector::new(20, dec!(2.5));
        assert!(!detector.check_and_observe(dec!(10000)));

        for _ in 0..19 {
            detector.observe(dec!(100));
        }
        // Window: 10000 + 19×100 → average 595
        assert_eq!(detector.average(), Some(dec!(595)));
        assert!(!detector.is_spike(dec!(1400)));
        assert!(detector.is_spike(dec!(1500)));
    }

    #[test]
    fn test_zero_sizes_not_averaged() {
        let mut detector = VolumeSpikeDetector::new(5, dec!(2.5));
        detector.observe(dec!(100));
        detector.observe(dec!(0));
        detector.observe(dec!(100));
        assert_eq!(detector.average(), Some(dec!(100)));
        assert!(detector.is_spike(dec!(251)));
        assert!(!detector.is_spike(dec!(250)));
    }
}
