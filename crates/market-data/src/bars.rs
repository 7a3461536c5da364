//! Minute bar aggregation from sub-minute samples

use rust_decimal::Decimal;
use sentinel_core::{Bar, Timestamp, minute_floor};
use std::collections::VecDeque;

/// What a sample did to the bar in progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BarUpdate {
    /// First sample of the session opened a window
    Opened,
    /// Sample folded into the window in progress
    Updated,
    /// Sample belonged to a later minute: the previous window was sealed
    Sealed(Bar),
    /// Sample older than the window in progress, discarded
    OutOfOrder,
    /// Non-positive price or negative volume, discarded
    Malformed,
}

#[derive(Debug, Clone)]
struct FormingBar {
    start: Timestamp,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: Decimal,
    /// Σ(price × volume) over the window
    weighted: Decimal,
}

impl FormingBar {
    fn vwap(&self) -> Decimal {
        if self.volume.is_zero() {
            self.close
        } else {
            self.weighted / self.volume
        }
    }

    fn seal(&self) -> Bar {
        Bar {
            start: self.start,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            vwap: self.vwap(),
        }
    }
}

/// Builds one-minute bars and keeps a bounded history of sealed bars
#[derive(Debug, Clone)]
pub struct BarBuilder {
    forming: Option<FormingBar>,
    history: VecDeque<Bar>,
    capacity: usize,
}

impl BarBuilder {
    pub fn new(capacity: usize) -> Self {
        Self {
            forming: None,
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Fold one sample into the current minute.
    ///
    /// `wap` is the sample's own weighted average price; when it is not
    /// positive the close stands in for it.
    #[allow(clippy::too_many_arguments)]
    pub fn on_sample(
        &mut self,
        time: Timestamp,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
        wap: Decimal,
    ) -> BarUpdate {
        if open <= Decimal::ZERO || high <= Decimal::ZERO || low <= Decimal::ZERO || close <= Decimal::ZERO {
            return BarUpdate::Malformed;
        }
        if volume < Decimal::ZERO {
            return BarUpdate::Malformed;
        }

        let window = minute_floor(time);
        let price = if wap > Decimal::ZERO { wap } else { close };

        let Some(forming) = self.forming.as_mut() else {
            self.forming = Some(Self::open_window(window, open, high, low, close, volume, price));
            return BarUpdate::Opened;
        };

        if window < forming.start {
            return BarUpdate::OutOfOrder;
        }

        if window == forming.start {
            forming.high = forming.high.max(high);
            forming.low = forming.low.min(low);
            forming.close = close;
            forming.volume += volume;
            forming.weighted += price * volume;
            return BarUpdate::Updated;
        }

        let sealed = forming.seal();
        self.push_history(sealed.clone());
        self.forming = Some(Self::open_window(window, open, high, low, close, volume, price));
        BarUpdate::Sealed(sealed)
    }

    #[allow(clippy::too_many_arguments)]
    fn open_window(
        start: Timestamp,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
        price: Decimal,
    ) -> FormingBar {
        FormingBar {
            start,
            open,
            high: high.max(open),
            low: low.min(open),
            close,
            volume,
            weighted: price * volume,
        }
    }

    fn push_history(&mut self, bar: Bar) {
        if self.capacity == 0 {
            return;
        }
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(bar);
    }

    /// Sealed bars, oldest first
    pub fn history(&self) -> &VecDeque<Bar> {
        &self.history
    }

    pub fn last_sealed(&self) -> Option<&Bar> {
        self.history.back()
    }

    /// The window in progress as a provisional bar
    pub fn forming(&self) -> Option<Bar> {
        self.forming.as_ref().map(FormingBar::seal)
    }

    /// Locally computed VWAP of the minute in progress
    pub fn minute_vwap(&self) -> Option<Decimal> {
        self.forming.as_ref().map(FormingBar::vwap)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.forming = None;
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn at(h: u32, m: u32, s: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 1, h, m, s).unwrap()
    }

    #[test]
    fn test_zero_volume_bar_uses_close_for_vwap() {
        let mut builder = BarBuilder::new(25);
        builder.on_sample(at(9, 30, 5), dec!(10), dec!(10), dec!(10), dec!(10.2), dec!(0), dec!(0));
        let update = builder.on_sample(at(9, 31, 0), dec!(10), dec!(10), dec!(10), dec!(10), dec!(1), dec!(10));

        match update {
            BarUpdate::Sealed(bar) => {
                assert_eq!(bar.volume, Decimal::ZERO);
                assert_eq!(bar.vwap, dec!(10.2));
            }
            other => panic!("expected sealed bar, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_order_sample_discarded() {
        let mut builder = BarBuilder::new(25);
        builder.on_sample(at(9, 31, 5), dec!(10), dec!(10), dec!(10), dec!(10), dec!(1), dec!(10));
        let update = builder.on_sample(at(9, 30, 55), dec!(9), dec!(9), dec!(9), dec!(9), dec!(1), dec!(9));

        assert_eq!(update, BarUpdate::OutOfOrder);
        assert_eq!(builder.forming().unwrap().low, dec!(10));
    }

    #[test]
    fn test_malformed_sample_discarded() {
        let mut builder = BarBuilder::new(25);
        assert_eq!(
            builder.on_sample(at(9, 30, 0), dec!(10), dec!(10), dec!(0), dec!(10), dec!(1), dec!(10)),
            BarUpdate::Malformed
        );
        assert_eq!(
            builder.on_sample(at(9, 30, 0), dec!(10), dec!(10), dec!(10), dec!(10), dec!(-1), dec!(10)),
            BarUpdate::Malformed
        );
        assert!(builder.forming().is_none());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut builder = BarBuilder::new(3);
        for minute in 0..6 {
            builder.on_sample(at(9, 30 + minute, 0), dec!(10), dec!(10), dec!(10), dec!(10), dec!(1), dec!(10));
        }

        assert_eq!(builder.history().len(), 3);
        assert_eq!(builder.history().front().unwrap().start, at(9, 32, 0));
        assert_eq!(builder.last_sealed().unwrap().start, at(9, 34, 0));
    }
}
