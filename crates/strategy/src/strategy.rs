//! Strategy trait and the context handed to it
//!
//! Strategies are synchronous and in-memory: they run on the feed path and
//! must finish in bounded time per bar.

use crate::signal::Signal;
use rust_decimal::Decimal;
use sentinel_core::{Bar, PreviousDay, Timestamp};

/// Context provided to a strategy on each sealed bar
pub struct BarContext<'a> {
    /// Sealed bars before the current one, oldest first
    pub recent: &'a [Bar],
    /// Σ bid / Σ ask over the published book levels, if a book exists
    pub imbalance_ratio: Option<Decimal>,
}

impl BarContext<'_> {
    /// The last `n` bars before the current one
    pub fn last_bars(&self, n: usize) -> &[Bar] {
        let start = self.recent.len().saturating_sub(n);
        &self.recent[start..]
    }
}

/// Everything a strategy needs at the session boundary
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub previous_day: PreviousDay,
    /// Start of the regular session; the first bar anchors it when absent
    pub session_open: Option<Timestamp>,
    pub session_open_price: Option<Decimal>,
}

/// Strategy trait - implement this for a bar-driven entry strategy
pub trait BarStrategy: Send {
    /// Strategy name for logging
    fn name(&self) -> &str;

    /// Called on every sealed bar
    fn on_bar(&mut self, bar: &Bar, ctx: &BarContext<'_>) -> Option<Signal>;

    /// Called when the opening-range window is declared over externally
    fn on_range_elapsed(&mut self) {}

    /// Called at the start of each trading day, before any bar
    fn reset_session(&mut self, session: &SessionContext);

    /// Whether the strategy has used its entry for today
    fn is_done(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn bar(minute: u32) -> Bar {
        Bar {
            start: Utc.with_ymd_and_hms(2024, 3, 1, 14, minute, 0).unwrap(),
            open: dec!(10),
            high: dec!(10),
            low: dec!(10),
            close: dec!(10),
            volume: dec!(1),
            vwap: dec!(10),
        }
    }

    #[test]
    fn test_last_bars() {
        let bars: Vec<Bar> = (30..35).map(bar).collect();
        let ctx = BarContext {
            recent: &bars,
            imbalance_ratio: None,
        };
        assert_eq!(ctx.last_bars(2).len(), 2);
        assert_eq!(ctx.last_bars(2)[0].start, bars[3].start);
        assert_eq!(ctx.last_bars(10).len(), 5);
    }
}
