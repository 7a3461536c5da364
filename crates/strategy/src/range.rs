//! Per-instrument opening-range state

use rust_decimal::Decimal;
use sentinel_core::{Bar, Side, Timestamp};

/// Daily lifecycle of the breakout strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangePhase {
    /// Accumulating the opening range
    #[default]
    AwaitingRange,
    /// Range frozen, watching for a breakout
    RangeFormed,
    /// Entry taken; terminal for the day
    Done,
}

impl RangePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingRange => "AWAITING_RANGE",
            Self::RangeFormed => "RANGE_FORMED",
            Self::Done => "DONE",
        }
    }
}

/// Opening range, daily latch and post-trigger water marks
#[derive(Debug, Clone, Default)]
pub struct OpeningRangeState {
    pub phase: RangePhase,
    pub range_high: Option<Decimal>,
    pub range_low: Option<Decimal>,
    /// Set on the day's entry and never cleared until the next session
    pub trade_taken_today: bool,
    pub triggered_side: Option<Side>,
    pub high_water: Option<Decimal>,
    pub low_water: Option<Decimal>,
    pub window_end: Option<Timestamp>,
    pub previous_high: Option<Decimal>,
    pub previous_low: Option<Decimal>,
    pub session_open_price: Option<Decimal>,
}

impl OpeningRangeState {
    /// Fold a bar into the range; the first bar's open seeds both ends
    pub fn extend(&mut self, bar: &Bar) {
        let high = self.range_high.unwrap_or(bar.open);
        let low = self.range_low.unwrap_or(bar.open);
        self.range_high = Some(high.max(bar.high));
        self.range_low = Some(low.min(bar.low));
    }

    pub fn has_range(&self) -> bool {
        self.range_high.is_some() && self.range_low.is_some()
    }

    /// Latch the day's entry
    pub fn trigger(&mut self, side: Side, price: Decimal) {
        self.trade_taken_today = true;
        self.phase = RangePhase::Done;
        self.triggered_side = Some(side);
        self.high_water = Some(price);
        self.low_water = Some(price);
    }

    /// Track extremes after the trigger
    pub fn update_water_marks(&mut self, bar: &Bar) {
        if !self.trade_taken_today {
            return;
        }
        self.high_water = Some(self.high_water.map_or(bar.high, |h| h.max(bar.high)));
        self.low_water = Some(self.low_water.map_or(bar.low, |l| l.min(bar.low)));
    }
}
