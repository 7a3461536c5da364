//! Daily volume projection against historical average daily volume

use chrono::{DateTime, Utc};
use log::warn;
use rust_decimal::Decimal;
use sentinel_core::minute_floor;

/// Projects the active one-minute interval's volume to a full session.
///
/// Flags once per interval when `interval volume × intervals per day`
/// exceeds `ADV × multiple`; the flag re-arms when a new interval starts.
/// Without an average daily volume the check stays neutral.
#[derive(Debug, Clone)]
pub struct IntervalVolumeProjector {
    intervals_per_day: Decimal,
    multiple: Decimal,
    avg_daily_volume: Option<Decimal>,
    interval_start: Option<DateTime<Utc>>,
    interval_volume: Decimal,
    flagged: bool,
    warned: bool,
}

impl IntervalVolumeProjector {
    pub fn new(intervals_per_day: u32, multiple: Decimal) -> Self {
        Self {
            intervals_per_day: Decimal::from(intervals_per_day),
            multiple,
            avg_daily_volume: None,
            interval_start: None,
            interval_volume: Decimal::ZERO,
            flagged: false,
            warned: false,
        }
    }

    /// Set the reference average daily volume for this session
    pub fn set_avg_daily_volume(&mut self, adv: Option<Decimal>) {
        self.avg_daily_volume = adv.filter(|v| *v > Decimal::ZERO);
        self.warned = false;
    }

    /// Add traded size at `time`. Returns true when this trade raises the flag.
    pub fn observe(&mut self, symbol: &str, time: DateTime<Utc>, size: Decimal) -> bool {
        let interval = minute_floor(time);
        if self.interval_start != Some(interval) {
            self.interval_start = Some(interval);
            self.interval_volume = Decimal::ZERO;
            self.flagged = false;
        }
        if size > Decimal::ZERO {
            self.interval_volume += size;
        }

        let Some(adv) = self.avg_daily_volume else {
            if !self.warned {
                warn!(
                    "[ANALYTICS] {} has no average daily volume, volume projection disabled",
                    symbol
                );
                self.warned = true;
            }
            return false;
        };

        if !self.flagged && self.projected() > adv * self.multiple {
            self.flagged = true;
            return true;
        }
        false
    }

    /// Interval volume scaled to a full session
    pub fn projected(&self) -> Decimal {
        self.interval_volume * self.intervals_per_day
    }

    /// Spike flagged in the current interval
    pub fn is_spike(&self) -> bool {
        self.flagged
    }

    pub fn reset(&mut self) {
        self.interval_start = None;
        self.interval_volume = Decimal::ZERO;
        self.flagged = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at(m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 14, m, s).unwrap()
    }

    #[test]
    fn test_projection_flags_once_per_interval() {
        let mut projector = IntervalVolumeProjector::new(390, dec!(2.0));
        projector.set_avg_daily_volume(Some(dec!(3900000)));

        // Threshold: 7.8M projected → 20,000 shares in one minute
        assert!(!projector.observe("AAPL", at(31, 0), dec!(15000)));
        assert!(projector.observe("AAPL", at(31, 20), dec!(6000)));
        assert!(projector.is_spike());
        assert!(!projector.observe("AAPL", at(31, 40), dec!(6000)));

        // New interval re-arms
        assert!(!projector.observe("AAPL", at(32, 0), dec!(100)));
        assert!(!projector.is_spike());
        assert!(projector.observe("AAPL", at(32, 5), dec!(25000)));
    }

    #[test]
    fn test_missing_adv_is_neutral() {
        let mut projector = IntervalVolumeProjector::new(390, dec!(2.0));
        assert!(!projector.observe("AAPL", at(31, 0), dec!(1000000)));
        assert!(!projector.is_spike());
        assert_eq!(projector.projected(), dec!(390000000));
    }
}
