//! Canonical per-instrument market state

use crate::bars::BarBuilder;
use crate::config::MarketDataConfig;
use crate::depth::DepthLadder;
use rust_decimal::Decimal;
use sentinel_core::{Bar, BookSide, InstrumentHandle, PriceLevel, Richness, Symbol, Timestamp};
use sentinel_gateway::TickRecord;

/// Mutable state of one instrument, owned by its normalizer
#[derive(Debug, Clone)]
pub struct InstrumentState {
    pub symbol: Symbol,
    pub handle: InstrumentHandle,

    pub last_price: Option<Decimal>,
    pub last_size: Option<Decimal>,
    pub last_time: Option<Timestamp>,

    pub bid: Option<Decimal>,
    pub bid_size: Option<Decimal>,
    pub ask: Option<Decimal>,
    pub ask_size: Option<Decimal>,

    /// Session open price
    pub open: Option<Decimal>,
    pub day_high: Option<Decimal>,
    pub day_low: Option<Decimal>,
    /// Previous session close
    pub prev_close: Option<Decimal>,
    /// First trade price seen this session
    pub first_trade: Option<Decimal>,
    pub day_volume: Decimal,
    /// Set once the feed reports cumulative volume itself
    pub day_volume_from_feed: bool,
    /// Authoritative session VWAP from the feed
    pub session_vwap: Option<Decimal>,

    pub richness: Richness,
    pub bars: BarBuilder,
    pub depth: DepthLadder,

    /// Events applied
    pub updates: u64,
    /// Malformed inputs discarded or repaired
    pub anomalies: u64,
}

impl InstrumentState {
    pub fn new(symbol: impl Into<Symbol>, handle: InstrumentHandle, config: &MarketDataConfig) -> Self {
        Self {
            symbol: symbol.into(),
            handle,
            last_price: None,
            last_size: None,
            last_time: None,
            bid: None,
            bid_size: None,
            ask: None,
            ask_size: None,
            open: None,
            day_high: None,
            day_low: None,
            prev_close: None,
            first_trade: None,
            day_volume: Decimal::ZERO,
            day_volume_from_feed: false,
            session_vwap: None,
            richness: Richness::None,
            bars: BarBuilder::new(config.bar_history),
            depth: DepthLadder::new(config.max_depth_levels),
            updates: 0,
            anomalies: 0,
        }
    }

    /// Richness only moves up within a session
    pub fn advance_richness(&mut self, level: Richness) {
        self.richness = self.richness.max(level);
    }

    /// Extend the day's high/low with a traded price
    pub fn extend_day_range(&mut self, price: Decimal) {
        self.day_high = Some(self.day_high.map_or(price, |h| h.max(price)));
        self.day_low = Some(self.day_low.map_or(price, |l| l.min(price)));
    }

    /// Session VWAP from the feed, else the locally computed minute VWAP
    pub fn vwap(&self) -> Option<Decimal> {
        self.session_vwap.or_else(|| self.bars.minute_vwap())
    }

    /// Clear everything that belongs to one session
    pub fn reset_session(&mut self) {
        let symbol = std::mem::take(&mut self.symbol);
        let handle = self.handle;
        let updates = self.updates;
        let anomalies = self.anomalies;
        let (bar_capacity, depth_levels) = (self.bars.capacity(), self.depth.max_levels());

        *self = Self::new(
            symbol,
            handle,
            &MarketDataConfig {
                max_depth_levels: depth_levels,
                bar_history: bar_capacity,
                ..MarketDataConfig::default()
            },
        );
        self.updates = updates;
        self.anomalies = anomalies;
    }
}

/// Externally visible copy of an instrument's state
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub symbol: Symbol,
    pub handle: InstrumentHandle,
    pub richness: Richness,
    pub last_price: Option<Decimal>,
    pub last_size: Option<Decimal>,
    pub last_time: Option<Timestamp>,
    pub bid: Option<Decimal>,
    pub bid_size: Option<Decimal>,
    pub ask: Option<Decimal>,
    pub ask_size: Option<Decimal>,
    pub open: Option<Decimal>,
    pub day_high: Option<Decimal>,
    pub day_low: Option<Decimal>,
    pub prev_close: Option<Decimal>,
    pub first_trade: Option<Decimal>,
    pub day_volume: Decimal,
    pub vwap: Option<Decimal>,
    /// Published bid levels, best first
    pub bids: Vec<PriceLevel>,
    /// Published ask levels, best first
    pub asks: Vec<PriceLevel>,
    pub last_bar: Option<Bar>,
}

impl MarketSnapshot {
    pub fn capture(state: &InstrumentState, published_levels: usize) -> Self {
        Self {
            symbol: state.symbol.clone(),
            handle: state.handle,
            richness: state.richness,
            last_price: state.last_price,
            last_size: state.last_size,
            last_time: state.last_time,
            bid: state.bid,
            bid_size: state.bid_size,
            ask: state.ask,
            ask_size: state.ask_size,
            open: state.open,
            day_high: state.day_high,
            day_low: state.day_low,
            prev_close: state.prev_close,
            first_trade: state.first_trade,
            day_volume: state.day_volume,
            vwap: state.vwap(),
            bids: state.depth.top(BookSide::Bid, published_levels),
            asks: state.depth.top(BookSide::Ask, published_levels),
            last_bar: state.bars.last_sealed().cloned(),
        }
    }

    /// Quoted spread, when both sides are known
    pub fn spread(&self) -> Option<Decimal> {
        match (self.bid, self.ask) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    pub fn total_bid_size(&self) -> Decimal {
        self.bids.iter().map(|l| l.size).sum()
    }

    pub fn total_ask_size(&self) -> Decimal {
        self.asks.iter().map(|l| l.size).sum()
    }

    /// Audit record of this snapshot
    pub fn to_tick_record(&self, timestamp: Timestamp) -> TickRecord {
        TickRecord {
            timestamp,
            instrument_id: self.symbol.clone(),
            richness: self.richness,
            last_price: self.last_price,
            last_size: self.last_size,
            bid: self.bid,
            bid_size: self.bid_size,
            ask: self.ask,
            ask_size: self.ask_size,
            open: self.open,
            high: self.day_high,
            low: self.day_low,
            prev_close: self.prev_close,
            day_volume: self.day_volume,
            vwap: self.vwap,
        }
    }
}
