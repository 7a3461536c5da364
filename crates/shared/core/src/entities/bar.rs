use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::values::Timestamp;

/// A sealed one-minute OHLCV bar.
///
/// Immutable once produced by the bar builder; `start` is minute-aligned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub start: Timestamp,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    /// Volume-weighted average price over the window (close if no volume)
    pub vwap: Decimal,
}

impl Bar {
    /// High minus low
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    pub fn is_up(&self) -> bool {
        self.close > self.open
    }
}
