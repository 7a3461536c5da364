//! Raw feed event types
//!
//! Every callback the broker feed can deliver is collapsed into one
//! [`FeedEvent`] enum consumed by a single normalization entry point.

use rust_decimal::Decimal;
use sentinel_core::{BookSide, InstrumentHandle, Timestamp};
use serde::{Deserialize, Serialize};

/// Tick field codes understood by the normalizer.
///
/// Numbering follows the broker tick-type convention. Codes outside this
/// set are accepted on the wire and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldCode {
    BidSize,
    Bid,
    Ask,
    AskSize,
    Last,
    LastSize,
    DayHigh,
    DayLow,
    DayVolume,
    PreviousClose,
    SessionOpen,
    SessionVwap,
}

impl FieldCode {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::BidSize),
            1 => Some(Self::Bid),
            2 => Some(Self::Ask),
            3 => Some(Self::AskSize),
            4 => Some(Self::Last),
            5 => Some(Self::LastSize),
            6 => Some(Self::DayHigh),
            7 => Some(Self::DayLow),
            8 => Some(Self::DayVolume),
            9 => Some(Self::PreviousClose),
            14 => Some(Self::SessionOpen),
            48 => Some(Self::SessionVwap),
            _ => None,
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            Self::BidSize => 0,
            Self::Bid => 1,
            Self::Ask => 2,
            Self::AskSize => 3,
            Self::Last => 4,
            Self::LastSize => 5,
            Self::DayHigh => 6,
            Self::DayLow => 7,
            Self::DayVolume => 8,
            Self::PreviousClose => 9,
            Self::SessionOpen => 14,
            Self::SessionVwap => 48,
        }
    }

    /// Whether the field carries a size rather than a price
    pub fn is_size(&self) -> bool {
        matches!(
            self,
            Self::BidSize | Self::AskSize | Self::LastSize | Self::DayVolume
        )
    }
}

/// Positional depth operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepthOp {
    /// Insert at position, shifting subsequent entries down
    Insert,
    /// Replace in place
    Update,
    /// Remove at position, shifting subsequent entries up
    Delete,
}

impl DepthOp {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Insert),
            1 => Some(Self::Update),
            2 => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// One raw event from the feed gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedEvent {
    /// Price or size field update keyed by tick field code
    Field {
        handle: InstrumentHandle,
        code: u16,
        value: Decimal,
    },
    /// Trade print
    Trade {
        handle: InstrumentHandle,
        price: Decimal,
        size: Decimal,
        time: Timestamp,
    },
    /// Incremental depth operation; `op` is the raw operation code
    Depth {
        handle: InstrumentHandle,
        side: BookSide,
        position: usize,
        op: u8,
        price: Decimal,
        size: Decimal,
    },
    /// Periodic sub-minute bar sample
    BarSample {
        handle: InstrumentHandle,
        window_start: Timestamp,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
        wap: Decimal,
        count: u32,
    },
}

impl FeedEvent {
    /// Subscription handle the event is keyed by
    pub fn handle(&self) -> InstrumentHandle {
        match self {
            Self::Field { handle, .. }
            | Self::Trade { handle, .. }
            | Self::Depth { handle, .. }
            | Self::BarSample { handle, .. } => *handle,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Field { .. } => "field",
            Self::Trade { .. } => "trade",
            Self::Depth { .. } => "depth",
            Self::BarSample { .. } => "bar_sample",
        }
    }
}
