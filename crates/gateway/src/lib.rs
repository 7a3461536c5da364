//! Sentinel Gateway
//!
//! Boundary layer between the decision core and its external collaborators.
//! Provides:
//! - Wire message types (feed events, session events, trade instructions, execution reports)
//! - Request/reply transport to the execution side (tokio channels)
//! - `ExecutionGateway` port with channel-backed and paper implementations
//! - Audit records and the fire-and-forget `AuditSink` port
//!
//! ## Architecture
//!
//! ```text
//!   Broker feed                     Broker execution
//!       │                                  ▲
//!  FeedEvent / SessionEvent        TradeInstruction
//!       │                                  │
//!  ┌────▼──────────────────────────────────┴────┐
//!  │                 Core engine                │
//!  └────┬──────────────────────────────────▲────┘
//!       │ TickRecord                       │ ExecutionReport
//!  ┌────▼────┐                             │
//!  │ Audit   │                     fills / acks
//!  │ sink    │
//!  └─────────┘
//! ```
//!
//! ## Transport
//!
//! Uses tokio channels for single-process operation. The `Requester`
//! trait is where a networked execution link would plug in.

pub mod audit;
pub mod error;
pub mod execution;
pub mod messages;
pub mod transport;

// Re-export commonly used types
pub use audit::{AuditSink, FileAuditSink, MemoryAuditSink, TickRecord};
pub use error::{GatewayError, TransportError};
pub use execution::{
    ChannelExecutionGateway, ExecutionGateway, PaperExecutionGateway, execute_with_timeout,
};
pub use messages::{
    execution::{ExecutionReport, ExecutionStatus, FillNotification, InstructionTag, TradeInstruction},
    feed::{DepthOp, FeedEvent, FieldCode},
    session::SessionEvent,
};
pub use transport::{ChannelRequester, ChannelResponder, Requester};
