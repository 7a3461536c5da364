use chrono::{Duration, Utc};
use sentinel_core::Timestamp;

use crate::Clock;

/// Wall-clock time, optionally shifted onto another time line.
///
/// A replay of a recorded session anchors the clock at the session's start
/// so instruction and audit stamps line up with the feed's own timestamps
/// while still advancing in real time.
pub struct SystemClock {
    offset: Duration,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            offset: Duration::zero(),
        }
    }

    /// Clock whose `now()` reads `anchor` at construction and advances from there
    pub fn anchored_at(anchor: Timestamp) -> Self {
        Self {
            offset: anchor - Utc::now(),
        }
    }

    pub fn offset(&self) -> Duration {
        self.offset
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now() + self.offset
    }

    fn name(&self) -> &str {
        if self.offset.is_zero() {
            "SystemClock"
        } else {
            "SystemClock(anchored)"
        }
    }
}
