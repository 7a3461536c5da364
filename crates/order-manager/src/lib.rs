//! Sentinel Order Manager
//!
//! Sits between the strategy/risk layers and the execution gateway:
//! - **Decision Cascade**: one decision per tick with fixed precedence
//! - **Position Book**: pending instructions and open positions, driven by
//!   execution reports
//!
//! ## Architecture
//!
//! ```text
//!  exit bands ─┐
//!  breaker ────┤
//!  breakout ───┼──► ┌──────────────────────┐
//!  composite ──┤    │   Decision Cascade   │──► TradeInstruction ──► Gateway
//!  sector ─────┘    │  validate + size     │            │
//!                   └──────────▲───────────┘            │ register
//!                              │ position               ▼
//!                   ┌──────────┴───────────┐      ┌──────────┐
//!                   │    Position Book     │◄─────│ Reports  │◄── Gateway
//!                   └──────────────────────┘      └──────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sentinel_order_manager::{CascadeInput, DecisionCascade, Decision};
//!
//! let cascade = DecisionCascade::new(risk_engine, ExitPolicy::default());
//! if let Decision::Trade(instruction) = cascade.decide(input) {
//!     book.register(&instruction, volatility);
//!     dispatch(instruction);
//! }
//! ```

pub mod cascade;
pub mod error;
pub mod position;

// Re-export main types
pub use cascade::{CascadeInput, Decision, DecisionCascade};
pub use error::{Error, Result};
pub use position::{PendingInstruction, PositionBook, PositionEvent};
