//! Strategy output

use sentinel_core::Side;
use sentinel_gateway::InstructionTag;

/// A directional candidate. Absence of a signal means HOLD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub side: Side,
    pub tag: InstructionTag,
    /// Human-readable reason for logs and audit
    pub reason: String,
}

impl Signal {
    pub fn new(side: Side, tag: InstructionTag, reason: impl Into<String>) -> Self {
        Self {
            side,
            tag,
            reason: reason.into(),
        }
    }

    pub fn is_exit(&self) -> bool {
        self.tag.is_exit()
    }
}
