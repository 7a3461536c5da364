//! Sentinel Market Data
//!
//! Turns the raw feed into one canonical state per instrument.
//!
//! ## Architecture
//!
//! ```text
//! FeedEvent (field / trade / depth / bar sample)
//!     │
//!     │ handle ──► InstrumentRegistry ──► symbol
//!     ▼
//! ┌──────────────────────────────────────┐
//! │ InstrumentNormalizer (one per symbol)│
//! │  ├─ top of book, last trade, day agg │
//! │  ├─ DepthLadder (positional, ≤20)    │
//! │  └─ BarBuilder  (minute bars)        │
//! └──────────────┬───────────────────────┘
//!                │ NormalizeOutcome (trade print, sealed bar)
//!                ▼
//!          MarketSnapshot (top 5 levels published)
//! ```
//!
//! Malformed input is discarded where it is found and counted; it never
//! turns into an error.

pub mod bars;
pub mod config;
pub mod depth;
pub mod normalizer;
pub mod registry;
pub mod state;

pub use bars::{BarBuilder, BarUpdate};
pub use config::MarketDataConfig;
pub use depth::{DepthLadder, DepthOutcome};
pub use normalizer::{InstrumentNormalizer, NormalizeOutcome, TradePrint};
pub use registry::InstrumentRegistry;
pub use state::{InstrumentState, MarketSnapshot};
