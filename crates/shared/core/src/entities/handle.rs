use serde::{Deserialize, Serialize};

/// Opaque per-session subscription handle assigned by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstrumentHandle(pub u64);

impl InstrumentHandle {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for InstrumentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
