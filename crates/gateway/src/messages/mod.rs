//! Wire message types for gateway communication
//!
//! These types are the normalized boundary format. They derive serde so the
//! runner can replay them from JSON lines.

pub mod execution;
pub mod feed;
pub mod session;

pub use execution::{ExecutionReport, ExecutionStatus, FillNotification, InstructionTag, TradeInstruction};
pub use feed::{DepthOp, FeedEvent, FieldCode};
pub use session::SessionEvent;
