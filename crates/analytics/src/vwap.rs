//! Rolling VWAP weighted by cumulative-volume deltas

use crate::window::RollingWindow;
use rust_decimal::Decimal;

/// VWAP over the last N samples.
///
/// Each sample is weighted by how much the cumulative day volume grew since
/// the previous sample. The first observation only sets the baseline.
#[derive(Debug, Clone)]
pub struct RollingVwap {
    weighted: RollingWindow,
    weights: RollingWindow,
    last_cumulative: Option<Decimal>,
    buffer: Decimal,
}

impl RollingVwap {
    pub fn new(window: usize, buffer: Decimal) -> Self {
        Self {
            weighted: RollingWindow::new(window),
            weights: RollingWindow::new(window),
            last_cumulative: None,
            buffer,
        }
    }

    /// Record a price against the current cumulative day volume
    pub fn observe(&mut self, price: Decimal, cumulative_volume: Decimal) {
        let Some(previous) = self.last_cumulative.replace(cumulative_volume) else {
            return;
        };

        let delta = cumulative_volume - previous;
        if delta <= Decimal::ZERO || price <= Decimal::ZERO {
            return;
        }
        self.weighted.push(price * delta);
        self.weights.push(delta);
    }

    pub fn vwap(&self) -> Option<Decimal> {
        let volume = self.weights.sum();
        if self.weights.is_empty() || volume <= Decimal::ZERO {
            return None;
        }
        Some(self.weighted.sum() / volume)
    }

    /// Price more than the buffer above VWAP
    pub fn is_above(&self, price: Decimal) -> bool {
        self.vwap()
            .is_some_and(|vwap| price > vwap * (Decimal::ONE + self.buffer))
    }

    /// Price more than the buffer below VWAP
    pub fn is_below(&self, price: Decimal) -> bool {
        self.vwap()
            .is_some_and(|vwap| price < vwap * (Decimal::ONE - self.buffer))
    }

    pub fn samples(&self) -> usize {
        self.weights.len()
    }

    pub fn clear(&mut self) {
        self.weighted.clear();
        self.weights.clear();
        self.last_cumulative = None;
    }
}
