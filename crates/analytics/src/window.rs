//! Fixed-capacity sliding window with running aggregates

use rust_decimal::{Decimal, MathematicalOps};
use std::collections::VecDeque;

/// Sliding window of decimal samples.
///
/// Keeps `sum` and `sum_sq` up to date on every push/evict so mean and
/// standard deviation never rescan the window.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    values: VecDeque<Decimal>,
    capacity: usize,
    sum: Decimal,
    sum_sq: Decimal,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
            sum: Decimal::ZERO,
            sum_sq: Decimal::ZERO,
        }
    }

    /// Add a sample, returning the evicted one when the window was full
    #[inline]
    pub fn push(&mut self, value: Decimal) -> Option<Decimal> {
        let evicted = if self.values.len() >= self.capacity {
            let old = self.values.pop_front();
            if let Some(old) = old {
                self.sum -= old;
                self.sum_sq -= old * old;
            }
            old
        } else {
            None
        };

        self.values.push_back(value);
        self.sum += value;
        self.sum_sq += value * value;
        evicted
    }

    pub fn sum(&self) -> Decimal {
        self.sum
    }

    pub fn mean(&self) -> Option<Decimal> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.sum / Decimal::from(self.values.len()))
    }

    /// Population variance: E[x²] − E[x]², floored at zero
    pub fn variance(&self) -> Option<Decimal> {
        let n = Decimal::from(self.values.len());
        let mean = self.mean()?;
        let variance = self.sum_sq / n - mean * mean;
        Some(variance.max(Decimal::ZERO))
    }

    /// Population standard deviation
    pub fn std_dev(&self) -> Option<Decimal> {
        self.variance().and_then(|v| v.sqrt())
    }

    #[inline]
    pub fn last(&self) -> Option<Decimal> {
        self.values.back().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.values.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn values(&self) -> impl Iterator<Item = &Decimal> {
        self.values.iter()
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.sum = Decimal::ZERO;
        self.sum_sq = Decimal::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_mean_and_eviction() {
        let mut window = RollingWindow::new(5);
        for i in 1..=5 {
            assert_eq!(window.push(Decimal::from(i)), None);
        }
        assert!(window.is_full());
        assert_eq!(window.mean(), Some(dec!(3)));

        assert_eq!(window.push(dec!(6)), Some(dec!(1)));
        assert_eq!(window.len(), 5);
        assert_eq!(window.mean(), Some(dec!(4)));
        assert_eq!(window.sum(), dec!(20));
    }

    #[test]
    fn test_population_std_dev() {
        let mut window = RollingWindow::new(10);
        for v in [2, 4, 4, 4, 5, 5, 7, 9] {
            window.push(Decimal::from(v));
        }
        // Classic example: mean 5, population variance 4
        assert_eq!(window.variance(), Some(dec!(4)));
        assert_eq!(window.std_dev(), Some(dec!(2)));
    }

    #[test]
    fn test_constant_window_has_zero_std() {
        let mut window = RollingWindow::new(4);
        for _ in 0..4 {
            window.push(dec!(101.37));
        }
        assert_eq!(window.std_dev(), Some(Decimal::ZERO));
    }

    #[test]
    fn test_empty_and_clear() {
        let mut window = RollingWindow::new(3);
        assert!(window.mean().is_none());
        assert!(window.std_dev().is_none());

        window.push(dec!(1));
        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.sum(), Decimal::ZERO);
    }
}
