//! Trade-price volatility

use crate::window::RollingWindow;
use rust_decimal::Decimal;

/// Population standard deviation of the last N trade prices
#[derive(Debug, Clone)]
pub struct VolatilityAnalyzer {
    prices: RollingWindow,
}

impl VolatilityAnalyzer {
    pub fn new(window: usize) -> Self {
        Self {
            prices: RollingWindow::new(window),
        }
    }

    pub fn observe(&mut self, price: Decimal) {
        if price > Decimal::ZERO {
            self.prices.push(price);
        }
    }

    /// `None` until the first price arrives
    pub fn volatility(&self) -> Option<Decimal> {
        self.prices.std_dev()
    }

    pub fn samples(&self) -> usize {
        self.prices.len()
    }

    pub fn clear(&mut self) {
        self.prices.clear();
    }
}
