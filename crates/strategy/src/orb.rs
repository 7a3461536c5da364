//! Opening-Range Breakout Strategy
//!
//! Per-instrument daily state machine:
//! - Every bar inside the opening window widens the range
//! - The first bar at or past the window end freezes it (RANGE_FORMED) and
//!   is itself evaluated
//! - A close beyond the range that passes every gate is the day's single
//!   entry; the strategy then sits in DONE until the next session
//!
//! Gates on a breakout bar, all required:
//! - bar volume > average of the previous `volume_lookback` bars × multiplier
//! - book imbalance does not oppose the direction beyond the ratio threshold
//! - range clears the previous day's high (long) / low (short)
//! - the bars before the breakout stayed inside a tight band

use crate::config::OrbConfig;
use crate::range::{OpeningRangeState, RangePhase};
use crate::signal::Signal;
use crate::strategy::{BarContext, BarStrategy, SessionContext};
use chrono::Duration;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sentinel_core::{Bar, Side, Timestamp};
use sentinel_gateway::InstructionTag;

/// Breakout that passed the gates and waits for a retest of its level
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingRetest {
    side: Side,
    level: Decimal,
}

pub struct OpeningRangeBreakout {
    symbol: String,
    config: OrbConfig,
    state: OpeningRangeState,
    session_open: Option<Timestamp>,
    pending: Option<PendingRetest>,
    warned_previous_day: bool,
}

impl OpeningRangeBreakout {
    pub fn new(symbol: impl Into<String>, config: OrbConfig) -> Self {
        Self {
            symbol: symbol.into(),
            config,
            state: OpeningRangeState::default(),
            session_open: None,
            pending: None,
            warned_previous_day: false,
        }
    }

    pub fn state(&self) -> &OpeningRangeState {
        &self.state
    }

    pub fn phase(&self) -> RangePhase {
        self.state.phase
    }

    fn window_end(&mut self, bar: &Bar) -> Timestamp {
        if let Some(end) = self.state.window_end {
            return end;
        }
        let anchor = self.session_open.unwrap_or(bar.start);
        let end = anchor + Duration::minutes(self.config.range_minutes);
        self.state.window_end = Some(end);
        end
    }

    fn form_range(&mut self) {
        self.state.phase = RangePhase::RangeFormed;
        match (self.state.range_high, self.state.range_low) {
            (Some(high), Some(low)) => info!(
                "[ORB] {} range formed: high={} low={}",
                self.symbol, high, low
            ),
            _ => warn!(
                "[ORB] {} no bars in the opening window, no breakout possible today",
                self.symbol
            ),
        }
    }

    fn evaluate(&mut self, bar: &Bar, ctx: &BarContext<'_>) -> Option<Signal> {
        let (Some(high), Some(low)) = (self.state.range_high, self.state.range_low) else {
            return None;
        };

        let side = if bar.close > high {
            Side::Buy
        } else if bar.close < low {
            Side::Sell
        } else {
            if self.pending.take().is_some() {
                debug!("[ORB] {} back inside range, retest cancelled", self.symbol);
            }
            return None;
        };

        if let Some(pending) = self.pending {
            if pending.side != side {
                // Broke out the other way: the old setup is void
                self.pending = None;
            } else if self.is_retest(pending, bar) {
                self.pending = None;
                return Some(self.trigger(side, bar, "retest confirmed"));
            } else {
                return None;
            }
        }

        if let Err(reason) = self.check_gates(side, bar, ctx, high, low) {
            debug!(
                "[ORB] {} {} breakout at {} rejected: {}",
                self.symbol, side, bar.close, reason
            );
            return None;
        }

        if self.config.retest_enabled {
            let level = if side == Side::Buy { high } else { low };
            info!(
                "[ORB] {} {} breakout at {} armed, waiting for retest of {}",
                self.symbol, side, bar.close, level
            );
            self.pending = Some(PendingRetest { side, level });
            return None;
        }

        Some(self.trigger(side, bar, "breakout"))
    }

    fn is_retest(&self, pending: PendingRetest, bar: &Bar) -> bool {
        let band = pending.level * self.config.retest_proximity_pct / dec!(100);
        match pending.side {
            Side::Buy => bar.low <= pending.level + band && bar.close > pending.level,
            Side::Sell => bar.high >= pending.level - band && bar.close < pending.level,
        }
    }

    fn check_gates(
        &mut self,
        side: Side,
        bar: &Bar,
        ctx: &BarContext<'_>,
        high: Decimal,
        low: Decimal,
    ) -> Result<(), &'static str> {
        // Volume spike against the preceding bars
        let lookback = ctx.last_bars(self.config.volume_lookback);
        if lookback.is_empty() {
            return Err("no volume history");
        }
        let avg_volume =
            lookback.iter().map(|b| b.volume).sum::<Decimal>() / Decimal::from(lookback.len());
        if bar.volume <= avg_volume * self.config.volume_multiplier {
            return Err("volume below spike threshold");
        }

        // Book imbalance must not lean against the trade
        if let Some(ratio) = ctx.imbalance_ratio {
            let threshold = self.config.imbalance_threshold;
            let opposed = match side {
                Side::Buy => ratio * threshold < Decimal::ONE,
                Side::Sell => ratio > threshold,
            };
            if opposed {
                return Err("order book imbalance opposes direction");
            }
        }

        // Previous-day extremes
        if self.config.previous_day_filter {
            let reference = match side {
                Side::Buy => self.state.previous_high,
                Side::Sell => self.state.previous_low,
            };
            match reference {
                Some(prev_high) if side == Side::Buy && high <= prev_high => {
                    return Err("range high does not clear previous-day high");
                }
                Some(prev_low) if side == Side::Sell && low >= prev_low => {
                    return Err("range low does not clear previous-day low");
                }
                Some(_) => {}
                None => {
                    if !self.warned_previous_day {
                        warn!(
                            "[ORB] {} has no previous-day range, previous-day filter {}",
                            self.symbol,
                            if self.config.previous_day_mandatory { "blocks entries" } else { "skipped" }
                        );
                        self.warned_previous_day = true;
                    }
                    if self.config.previous_day_mandatory {
                        return Err("previous-day data missing");
                    }
                }
            }
        }

        // Consolidation before the breakout
        let base = ctx.last_bars(self.config.consolidation_bars);
        if !base.is_empty() && bar.close > Decimal::ZERO {
            let base_high = base.iter().map(|b| b.high).max().unwrap_or(bar.close);
            let base_low = base.iter().map(|b| b.low).min().unwrap_or(bar.close);
            let range_pct = (base_high - base_low) / bar.close * dec!(100);
            if range_pct > self.config.consolidation_max_pct {
                return Err("no consolidation before breakout");
            }
        }

        Ok(())
    }

    fn trigger(&mut self, side: Side, bar: &Bar, how: &str) -> Signal {
        self.state.trigger(side, bar.close);
        info!(
            "[ORB] {} {} {} at {} (range {:?}-{:?}), done for the day",
            self.symbol, side, how, bar.close, self.state.range_low, self.state.range_high
        );
        Signal::new(
            side,
            InstructionTag::OpeningRangeBreakout,
            format!("opening range {} {}", how, side),
        )
    }
}

impl BarStrategy for OpeningRangeBreakout {
    fn name(&self) -> &str {
        "OpeningRangeBreakout"
    }

    fn on_bar(&mut self, bar: &Bar, ctx: &BarContext<'_>) -> Option<Signal> {
        match self.state.phase {
            RangePhase::Done => {
                self.state.update_water_marks(bar);
                None
            }
            RangePhase::AwaitingRange => {
                if bar.start < self.window_end(bar) {
                    self.state.extend(bar);
                    return None;
                }
                self.form_range();
                self.evaluate(bar, ctx)
            }
            RangePhase::RangeFormed => self.evaluate(bar, ctx),
        }
    }

    fn on_range_elapsed(&mut self) {
        if self.state.phase == RangePhase::AwaitingRange {
            self.form_range();
        }
    }

    fn reset_session(&mut self, session: &SessionContext) {
        self.state = OpeningRangeState {
            previous_high: session.previous_day.high,
            previous_low: session.previous_day.low,
            session_open_price: session.session_open_price,
            ..Default::default()
        };
        self.session_open = session.session_open;
        self.pending = None;
        self.warned_previous_day = false;
    }

    fn is_done(&self) -> bool {
        self.state.trade_taken_today
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sentinel_core::PreviousDay;

    fn at(minute: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, 0).unwrap() + Duration::minutes(minute as i64)
    }

    fn bar(minute: u32, high: Decimal, low: Decimal, close: Decimal, volume: Decimal) -> Bar {
        Bar {
            start: at(minute),
            open: close,
            high,
            low,
            close,
            volume,
            vwap: close,
        }
    }

    fn strategy(config: OrbConfig) -> OpeningRangeBreakout {
        let mut orb = OpeningRangeBreakout::new("AAPL", config);
        orb.reset_session(&SessionContext {
            previous_day: PreviousDay::with_range(dec!(100.2), dec!(99.0), dec!(100.0)),
            session_open: Some(at(0)),
            session_open_price: Some(dec!(100)),
        });
        orb
    }

    /// Feed a flat 15-minute range of 99.5 - 100.5 and return the bar history
    fn form_range(orb: &mut OpeningRangeBreakout) -> Vec<Bar> {
        let mut history = Vec::new();
        for minute in 0..15 {
            let b = bar(minute, dec!(100.5), dec!(99.5), dec!(100), dec!(1000));
            let ctx = BarContext {
                recent: &history,
                imbalance_ratio: None,
            };
            assert!(orb.on_bar(&b, &ctx).is_none());
            history.push(b);
        }
        assert_eq!(orb.phase(), RangePhase::AwaitingRange);
        history
    }

    fn consolidating(minute: u32) -> Bar {
        bar(minute, dec!(100.4), dec!(100.0), dec!(100.3), dec!(1000))
    }

    #[test]
    fn test_breakout_long() {
        let mut orb = strategy(OrbConfig::default());
        let mut history = form_range(&mut orb);
        history.extend([consolidating(12), consolidating(13), consolidating(14)]);

        let breakout = bar(15, dec!(100.9), dec!(100.4), dec!(100.8), dec!(2000));
        let ctx = BarContext {
            recent: &history,
            imbalance_ratio: Some(dec!(1.2)),
        };
        let signal = orb.on_bar(&breakout, &ctx).unwrap();

        assert_eq!(signal.side, Side::Buy);
        assert_eq!(signal.tag, InstructionTag::OpeningRangeBreakout);
        assert_eq!(orb.phase(), RangePhase::Done);
        assert!(orb.is_done());
        assert_eq!(orb.state().range_high, Some(dec!(100.5)));
    }

    #[test]
    fn test_weak_volume_rejected() {
        let mut orb = strategy(OrbConfig::default());
        let history = form_range(&mut orb);

        // 1.5× of 1000 is the bar to beat
        let breakout = bar(15, dec!(100.9), dec!(100.4), dec!(100.8), dec!(1500));
        let ctx = BarContext {
            recent: &history,
            imbalance_ratio: None,
        };
        assert!(orb.on_bar(&breakout, &ctx).is_none());
        assert_eq!(orb.phase(), RangePhase::RangeFormed);
    }

    #[test]
    fn test_imbalance_opposing_short() {
        let config = OrbConfig {
            previous_day_filter: false,
            consolidation_max_pct: dec!(2.0),
            ..Default::default()
        };
        let mut orb = strategy(config);
        let history = form_range(&mut orb);

        let breakdown = bar(15, dec!(99.6), dec!(99.1), dec!(99.2), dec!(5000));
        let heavy_bids = BarContext {
            recent: &history,
            imbalance_ratio: Some(dec!(3.5)),
        };
        assert!(orb.on_bar(&breakdown, &heavy_bids).is_none());

        let balanced = BarContext {
            recent: &history,
            imbalance_ratio: Some(dec!(0.8)),
        };
        let signal = orb.on_bar(&bar(16, dec!(99.4), dec!(99.0), dec!(99.1), dec!(5000)), &balanced);
        assert_eq!(signal.map(|s| s.side), Some(Side::Sell));
    }

    #[test]
    fn test_previous_day_filter() {
        let mut orb = OpeningRangeBreakout::new("AAPL", OrbConfig::default());
        orb.reset_session(&SessionContext {
            previous_day: PreviousDay::with_range(dec!(101.0), dec!(98.0), dec!(100.0)),
            session_open: Some(at(0)),
            session_open_price: Some(dec!(100)),
        });
        let history = form_range(&mut orb);

        // Range high 100.5 does not clear previous high 101
        let breakout = bar(15, dec!(100.9), dec!(100.4), dec!(100.8), dec!(5000));
        let ctx = BarContext {
            recent: &history,
            imbalance_ratio: None,
        };
        assert!(orb.on_bar(&breakout, &ctx).is_none());
    }

    #[test]
    fn test_missing_previous_day_is_skipped_unless_mandatory() {
        for (mandatory, expect_entry) in [(false, true), (true, false)] {
            let mut orb = OpeningRangeBreakout::new(
                "AAPL",
                OrbConfig {
                    previous_day_mandatory: mandatory,
                    ..Default::default()
                },
            );
            orb.reset_session(&SessionContext {
                session_open: Some(at(0)),
                ..Default::default()
            });
            let history = form_range(&mut orb);

            let breakout = bar(15, dec!(100.9), dec!(100.4), dec!(100.8), dec!(5000));
            let ctx = BarContext {
                recent: &history,
                imbalance_ratio: None,
            };
            assert_eq!(orb.on_bar(&breakout, &ctx).is_some(), expect_entry);
        }
    }

    #[test]
    fn test_wide_base_fails_consolidation() {
        let mut orb = strategy(OrbConfig::default());
        let mut history = form_range(&mut orb);
        history.push(bar(14, dec!(100.5), dec!(99.0), dec!(100.4), dec!(1000)));

        let breakout = bar(15, dec!(100.9), dec!(100.4), dec!(100.8), dec!(5000));
        let ctx = BarContext {
            recent: &history,
            imbalance_ratio: None,
        };
        assert!(orb.on_bar(&breakout, &ctx).is_none());
    }

    #[test]
    fn test_retest_confirms_then_cancels() {
        let config = OrbConfig {
            retest_enabled: true,
            ..Default::default()
        };
        let mut orb = strategy(config);
        let history = form_range(&mut orb);
        let ctx = BarContext {
            recent: &history,
            imbalance_ratio: None,
        };

        // Arms, no entry yet
        assert!(orb.on_bar(&bar(15, dec!(101.2), dec!(100.6), dec!(101.0), dec!(5000)), &ctx).is_none());
        // Stays away from the level: still waiting
        assert!(orb.on_bar(&bar(16, dec!(101.4), dec!(100.9), dec!(101.2), dec!(800)), &ctx).is_none());
        // Dips to within 0.1% of 100.5 and closes above it
        let signal = orb.on_bar(&bar(17, dec!(100.9), dec!(100.55), dec!(100.7), dec!(800)), &ctx);
        assert_eq!(signal.map(|s| s.side), Some(Side::Buy));

        // A fresh day where price falls back inside the range cancels the setup
        let mut orb = strategy(OrbConfig {
            retest_enabled: true,
            ..Default::default()
        });
        let history = form_range(&mut orb);
        let ctx = BarContext {
            recent: &history,
            imbalance_ratio: None,
        };
        assert!(orb.on_bar(&bar(15, dec!(101.2), dec!(100.6), dec!(101.0), dec!(5000)), &ctx).is_none());
        assert!(orb.on_bar(&bar(16, dec!(100.6), dec!(100.0), dec!(100.2), dec!(800)), &ctx).is_none());
        assert!(orb.on_bar(&bar(17, dec!(100.9), dec!(100.55), dec!(100.7), dec!(800)), &ctx).is_none());
        assert!(!orb.is_done());
    }

    #[test]
    fn test_no_bars_in_window() {
        let mut orb = strategy(OrbConfig::default());
        let late = bar(20, dec!(102), dec!(101), dec!(101.5), dec!(9000));
        let ctx = BarContext {
            recent: &[],
            imbalance_ratio: None,
        };

        assert!(orb.on_bar(&late, &ctx).is_none());
        assert_eq!(orb.phase(), RangePhase::RangeFormed);
        assert!(!orb.state().has_range());
    }

    #[test]
    fn test_range_elapsed_event_freezes_range() {
        let mut orb = strategy(OrbConfig::default());
        let b = bar(0, dec!(100.5), dec!(99.5), dec!(100), dec!(1000));
        orb.on_bar(&b, &BarContext { recent: &[], imbalance_ratio: None });

        orb.on_range_elapsed();
        assert_eq!(orb.phase(), RangePhase::RangeFormed);
        assert_eq!(orb.state().range_high, Some(dec!(100.5)));
    }
}
