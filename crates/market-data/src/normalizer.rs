//! Per-instrument feed normalizer
//!
//! Single entry point [`InstrumentNormalizer::apply`] for every raw feed
//! event. Each call mutates only this instrument's state and reports what
//! changed so the caller can drive analyzers and the strategy.

use crate::bars::BarUpdate;
use crate::config::MarketDataConfig;
use crate::depth::DepthOutcome;
use crate::state::{InstrumentState, MarketSnapshot};
use log::debug;
use rust_decimal::Decimal;
use sentinel_core::{Bar, BookSide, InstrumentHandle, Richness, Symbol, Timestamp};
use sentinel_gateway::{DepthOp, FeedEvent, FieldCode};

/// A trade print extracted from the feed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradePrint {
    pub price: Decimal,
    pub size: Decimal,
    pub time: Option<Timestamp>,
}

/// What one feed event did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeOutcome {
    /// State changed
    pub applied: bool,
    /// Part or all of the event was malformed
    pub anomaly: bool,
    /// A trade happened (trade print, or last size after last price)
    pub trade: Option<TradePrint>,
    /// A minute bar was sealed
    pub sealed_bar: Option<Bar>,
}

impl NormalizeOutcome {
    fn applied() -> Self {
        Self {
            applied: true,
            ..Default::default()
        }
    }

    fn ignored() -> Self {
        Self::default()
    }

    fn discarded() -> Self {
        Self {
            anomaly: true,
            ..Default::default()
        }
    }
}

pub struct InstrumentNormalizer {
    state: InstrumentState,
    config: MarketDataConfig,
}

impl InstrumentNormalizer {
    pub fn new(symbol: impl Into<Symbol>, handle: InstrumentHandle, config: MarketDataConfig) -> Self {
        Self {
            state: InstrumentState::new(symbol, handle, &config),
            config,
        }
    }

    /// Apply one raw feed event
    pub fn apply(&mut self, event: &FeedEvent) -> NormalizeOutcome {
        match *event {
            FeedEvent::Field { code, value, .. } => self.apply_field(code, value),
            FeedEvent::Trade {
                price, size, time, ..
            } => self.apply_trade(price, size, time),
            FeedEvent::Depth {
                side,
                position,
                op,
                price,
                size,
                ..
            } => self.apply_depth(side, position, op, price, size),
            FeedEvent::BarSample {
                window_start,
                open,
                high,
                low,
                close,
                volume,
                wap,
                ..
            } => self.apply_bar_sample(window_start, open, high, low, close, volume, wap),
        }
    }

    /// Price or size field update. Unknown codes are ignored.
    pub fn apply_field(&mut self, code: u16, value: Decimal) -> NormalizeOutcome {
        let outcome = self.field(code, value);
        self.count(outcome)
    }

    fn field(&mut self, code: u16, value: Decimal) -> NormalizeOutcome {
        let Some(field) = FieldCode::from_code(code) else {
            return NormalizeOutcome::ignored();
        };

        let malformed = if field.is_size() {
            value < Decimal::ZERO
        } else {
            value <= Decimal::ZERO
        };
        if malformed {
            debug!(
                "[NORMALIZER] {} discarded {:?} = {}",
                self.state.symbol, field, value
            );
            return NormalizeOutcome::discarded();
        }

        let state = &mut self.state;
        let mut outcome = NormalizeOutcome::applied();
        match field {
            FieldCode::Bid => {
                state.bid = Some(value);
                state.advance_richness(Richness::Quote);
            }
            FieldCode::Ask => {
                state.ask = Some(value);
                state.advance_richness(Richness::Quote);
            }
            FieldCode::BidSize => {
                state.bid_size = Some(value);
                state.advance_richness(Richness::Quote);
            }
            FieldCode::AskSize => {
                state.ask_size = Some(value);
                state.advance_richness(Richness::Quote);
            }
            FieldCode::Last => {
                state.last_price = Some(value);
                state.first_trade.get_or_insert(value);
                state.extend_day_range(value);
                state.advance_richness(Richness::TradeOnly);
            }
            FieldCode::LastSize => {
                state.last_size = Some(value);
                match state.last_price {
                    Some(price) if value > Decimal::ZERO => {
                        if !state.day_volume_from_feed {
                            state.day_volume += value;
                        }
                        outcome.trade = Some(TradePrint {
                            price,
                            size: value,
                            time: state.last_time,
                        });
                    }
                    _ => {}
                }
            }
            FieldCode::DayHigh => {
                state.day_high = Some(state.day_high.map_or(value, |h| h.max(value)));
            }
            FieldCode::DayLow => {
                state.day_low = Some(state.day_low.map_or(value, |l| l.min(value)));
            }
            FieldCode::DayVolume => {
                state.day_volume = value;
                state.day_volume_from_feed = true;
            }
            FieldCode::PreviousClose => state.prev_close = Some(value),
            FieldCode::SessionOpen => state.open = Some(value),
            FieldCode::SessionVwap => state.session_vwap = Some(value),
        }
        outcome
    }

    /// Trade print. A bad size drops only the size; a bad price drops the print.
    pub fn apply_trade(&mut self, price: Decimal, size: Decimal, time: Timestamp) -> NormalizeOutcome {
        let outcome = self.trade(price, size, time);
        self.count(outcome)
    }

    fn trade(&mut self, price: Decimal, size: Decimal, time: Timestamp) -> NormalizeOutcome {
        if price <= Decimal::ZERO {
            debug!("[NORMALIZER] {} discarded trade at {}", self.state.symbol, price);
            return NormalizeOutcome::discarded();
        }

        let state = &mut self.state;
        state.last_price = Some(price);
        state.last_time = Some(time);
        state.first_trade.get_or_insert(price);
        state.extend_day_range(price);
        state.advance_richness(Richness::TradeOnly);

        let mut outcome = NormalizeOutcome::applied();
        if size <= Decimal::ZERO {
            debug!("[NORMALIZER] {} dropped trade size {}", state.symbol, size);
            outcome.anomaly = true;
            return outcome;
        }

        state.last_size = Some(size);
        if !state.day_volume_from_feed {
            state.day_volume += size;
        }
        outcome.trade = Some(TradePrint {
            price,
            size,
            time: Some(time),
        });
        outcome
    }

    /// Positional depth operation (`op` is the raw operation code)
    pub fn apply_depth(
        &mut self,
        side: BookSide,
        position: usize,
        op: u8,
        price: Decimal,
        size: Decimal,
    ) -> NormalizeOutcome {
        let outcome = self.depth(side, position, op, price, size);
        self.count(outcome)
    }

    fn depth(&mut self, side: BookSide, position: usize, op: u8, price: Decimal, size: Decimal) -> NormalizeOutcome {
        let Some(op) = DepthOp::from_code(op) else {
            debug!("[NORMALIZER] {} unknown depth op {}", self.state.symbol, op);
            return NormalizeOutcome::discarded();
        };

        let state = &mut self.state;
        let result = state.depth.apply(side, position, op, price, size);
        match result {
            DepthOutcome::Discarded(reason) => {
                debug!(
                    "[NORMALIZER] {} {} {} @{} discarded: {}",
                    state.symbol,
                    side.as_str(),
                    op.as_str(),
                    position,
                    reason
                );
                return NormalizeOutcome::discarded();
            }
            DepthOutcome::AppendedOutOfRange => {
                debug!(
                    "[NORMALIZER] {} {} {} @{} past end, appended",
                    state.symbol,
                    side.as_str(),
                    op.as_str(),
                    position
                );
            }
            DepthOutcome::Applied => {}
        }

        state.advance_richness(Richness::FullDepth);

        // Keep top of book in line with the ladder; an emptied side has no quote
        let best = match side {
            BookSide::Bid => state.depth.best_bid(),
            BookSide::Ask => state.depth.best_ask(),
        };
        let (price, size) = (best.map(|l| l.price), best.map(|l| l.size));
        match side {
            BookSide::Bid => {
                state.bid = price;
                state.bid_size = size;
            }
            BookSide::Ask => {
                state.ask = price;
                state.ask_size = size;
            }
        }

        NormalizeOutcome {
            applied: true,
            anomaly: result.is_anomaly(),
            ..Default::default()
        }
    }

    /// Sub-minute bar sample
    #[allow(clippy::too_many_arguments)]
    pub fn apply_bar_sample(
        &mut self,
        window_start: Timestamp,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
        wap: Decimal,
    ) -> NormalizeOutcome {
        let update = self
            .state
            .bars
            .on_sample(window_start, open, high, low, close, volume, wap);

        let outcome = match update {
            BarUpdate::Opened | BarUpdate::Updated => NormalizeOutcome::applied(),
            BarUpdate::Sealed(bar) => {
                debug!(
                    "[NORMALIZER] {} sealed bar {} O={} H={} L={} C={} V={}",
                    self.state.symbol, bar.start, bar.open, bar.high, bar.low, bar.close, bar.volume
                );
                NormalizeOutcome {
                    applied: true,
                    sealed_bar: Some(bar),
                    ..Default::default()
                }
            }
            BarUpdate::OutOfOrder => {
                debug!(
                    "[NORMALIZER] {} discarded out-of-order bar sample {}",
                    self.state.symbol, window_start
                );
                NormalizeOutcome::discarded()
            }
            BarUpdate::Malformed => {
                debug!(
                    "[NORMALIZER] {} discarded malformed bar sample {}",
                    self.state.symbol, window_start
                );
                NormalizeOutcome::discarded()
            }
        };
        self.count(outcome)
    }

    fn count(&mut self, outcome: NormalizeOutcome) -> NormalizeOutcome {
        self.state.updates += 1;
        if outcome.anomaly {
            self.state.anomalies += 1;
        }
        outcome
    }

    /// Seed the previous close from reference data (the feed may override it)
    pub fn seed_previous_close(&mut self, close: Decimal) {
        if close > Decimal::ZERO {
            self.state.prev_close = Some(close);
        }
    }

    /// Clear per-session state at the day boundary
    pub fn reset_session(&mut self) {
        self.state.reset_session();
    }

    pub fn state(&self) -> &InstrumentState {
        &self.state
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot::capture(&self.state, self.config.published_levels)
    }

    pub fn symbol(&self) -> &str {
        &self.state.symbol
    }

    pub fn handle(&self) -> InstrumentHandle {
        self.state.handle
    }
}
