//! Sentinel Strategy Layer
//!
//! Bar-driven entry logic and position exit bands:
//! - Opening-range breakout state machine (at most one entry per day)
//! - Volatility-scaled take-profit / stop-loss exits
//! - Tick composite signal (VWAP side + volume spike) as the fallback entry
//!
//! ## Architecture
//!
//! ```text
//!  sealed Bar ──► OpeningRangeBreakout ──► Signal (entry, latched)
//!                  AWAITING_RANGE → RANGE_FORMED → DONE
//!
//!  last price ──► ExitPolicy(position) ──► Signal (exit, bypasses latch)
//!
//!  trade print ──► composite_candidate ──► Side (gated downstream)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sentinel_strategy::{OpeningRangeBreakout, OrbConfig, SessionContext};
//!
//! let mut orb = OpeningRangeBreakout::new("AAPL", OrbConfig::default());
//! orb.reset_session(&SessionContext { session_open: Some(open), ..Default::default() });
//! if let Some(signal) = orb.on_bar(&bar, &ctx) { /* forward to the cascade */ }
//! ```

pub mod composite;
pub mod config;
pub mod exit;
pub mod orb;
pub mod range;
pub mod signal;
pub mod strategy;

// Re-export main types
pub use composite::composite_candidate;
pub use config::{ExitPolicy, OrbConfig};
pub use exit::evaluate_exit;
pub use orb::OpeningRangeBreakout;
pub use range::{OpeningRangeState, RangePhase};
pub use signal::Signal;
pub use strategy::{BarContext, BarStrategy, SessionContext};
