//! Sentinel Risk Manager
//!
//! Pre-trade risk for every entry candidate. Vetoes are values, not
//! errors: the decision cascade treats a `Reject` as terminal for the tick.
//!
//! - **Validation**: spread, volatility, short-sale eligibility
//! - **Sizing**: volatility-scaled base size, liquidity and breaker adjusted
//! - **Circuit Breaker**: staged restrictions on large intraday moves
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Risk Manager                          │
//! │                                                             │
//! │  Trade prints ───► RiskContext (σ window, size window)      │
//! │                                                             │
//! │  Snapshot ───────► CircuitBreaker  NORMAL→L1→L2→HALTED      │
//! │                                                             │
//! │  Candidate ──────► RiskEngine::validate ──► Accept/Reject   │
//! │                          │                                  │
//! │                          └──► max_position_size             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod availability;
pub mod breaker;
pub mod config;
pub mod context;
pub mod engine;

// Re-export main types
pub use availability::{FixedAvailability, ShortAvailability, VolumeDecayAvailability};
pub use breaker::{CircuitBreaker, CircuitBreakerStatus, CircuitBreakerThresholds};
pub use config::{RiskConfig, SpreadCheck};
pub use context::{RiskContext, intraday_change_pct};
pub use engine::{RejectReason, RiskEngine, RiskVerdict};
