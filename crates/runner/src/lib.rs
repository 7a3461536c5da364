//! Sentinel Runner
//!
//! Wires the pipeline crates into one engine:
//!
//! - **Config**: JSON engine configuration with embedded defaults
//! - **Worker**: all mutable state of one instrument behind one mutex
//! - **Engine**: ordered input loop, session barrier, async dispatch of
//!   instructions and audit records
//!
//! ## Architecture
//!
//! ```text
//!        feed gateway                       execution gateway
//!             │ FeedEvent / SessionEvent              ▲  │
//!             ▼                                       │  │ ExecutionReport
//! ┌────────────────────────────────────────────────┐  │  │
//! │                 TradingEngine                  │  │  │
//! │                                                │  │  │
//! │  InstrumentRegistry     SectorStrength         │  │  │
//! │        │ handle                ▲               │  │  │
//! │        ▼                       │ returns       │  │  │
//! │  ┌──────────────┐  ┌──────────────┐            │  │  │
//! │  │ worker AAPL  │  │ worker MSFT  │  ...       │  │  │
//! │  │  normalizer  │  │  normalizer  │            │  │  │
//! │  │  risk / ORB  │  │  risk / ORB  │            │  │  │
//! │  │  positions   │  │  positions   │            │  │  │
//! │  └──────┬───────┘  └──────┬───────┘            │  │  │
//! │         └──── DecisionCascade ──► instruction ─┼──┘  │
//! │                                                │◄────┘
//! └───────────────────────┬────────────────────────┘
//!                         │ TickRecord
//!                         ▼
//!                     AuditSink
//! ```

pub mod config;
pub mod engine;
pub mod worker;

// Re-export main types
pub use config::{
    ConfigError, EngineConfig, load_config, load_config_from_str, load_default_config,
};
pub use engine::{EngineError, EngineInput, EngineStats, TradingEngine};
pub use worker::{FeedOutcome, InstrumentWorker, WorkerContext};
